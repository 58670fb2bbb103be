//! Per-frame update and draw driver.
//!
//! The loop is a two-state machine, `Idle -> Running -> Idle`. While running,
//! every [`RenderLoop::tick`] advances the rotation, copies it into the scene,
//! spins the starfield and issues exactly one draw. Ticks delivered while idle
//! do nothing, so a frame callback that arrives after [`RenderLoop::stop`]
//! cannot reach freed resources.

use std::fmt;

use crate::rotation::RotationState;
use crate::scene::{SceneGraph, STARFIELD_YAW_PER_FRAME};

/// Scheduling state of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Running,
}

/// Opaque token for one running loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(u64);

impl AnimationHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "animation#{}", self.0)
    }
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The frame was drawn; schedule the next one.
    Drawn,
    /// The loop is idle; nothing was touched.
    Idle,
    /// A required scene node is missing. The loop went idle and will not restart
    /// on its own.
    Halted,
    /// The draw call failed. The loop keeps running; the caller decides how to
    /// recover.
    Failed(wgpu::SurfaceError),
}

impl FrameOutcome {
    /// Whether another frame should be requested.
    pub fn wants_next_frame(&self) -> bool {
        matches!(self, FrameOutcome::Drawn | FrameOutcome::Failed(_))
    }
}

#[derive(Debug, Default)]
pub struct RenderLoop {
    state: LoopState,
    handle: Option<AnimationHandle>,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// The live animation handle, if any.
    pub fn handle(&self) -> Option<AnimationHandle> {
        self.handle
    }

    /// Number of draw calls issued so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Transition `Idle -> Running`.
    ///
    /// Starting an already running loop returns the existing handle; there is
    /// never more than one live handle.
    pub fn start(&mut self, id: u64) -> AnimationHandle {
        if let Some(handle) = self.handle {
            return handle;
        }
        let handle = AnimationHandle::new(id);
        self.state = LoopState::Running;
        self.handle = Some(handle);
        log::debug!("{} started", handle);
        handle
    }

    /// Transition `Running -> Idle` and return the cancelled handle.
    ///
    /// No draw is issued after this returns until the loop is started again.
    pub fn stop(&mut self) -> Option<AnimationHandle> {
        self.state = LoopState::Idle;
        let handle = self.handle.take();
        if let Some(handle) = handle {
            log::debug!("{} stopped after {} frames", handle, self.frames);
        }
        handle
    }

    /// Run one frame callback.
    pub fn tick<F>(&mut self, scene: &mut SceneGraph, rotation: &mut RotationState, draw: F) -> FrameOutcome
    where
        F: FnOnce(&SceneGraph) -> Result<(), wgpu::SurfaceError>,
    {
        if !self.is_running() {
            return FrameOutcome::Idle;
        }

        if let Some(node) = scene.missing_node() {
            log::warn!("Scene is missing its {} node, halting the render loop", node);
            self.stop();
            return FrameOutcome::Halted;
        }

        rotation.advance(scene.mode());
        scene.set_globe_rotation(rotation.current_x, rotation.current_y);
        scene.spin_starfield(STARFIELD_YAW_PER_FRAME);

        self.frames += 1;
        match draw(scene) {
            Ok(()) => FrameOutcome::Drawn,
            Err(e) => FrameOutcome::Failed(e),
        }
    }
}
