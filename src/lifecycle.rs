//! Scene lifecycle management.
//!
//! A [`Mount`] is the place a globe is shown: one drawable region plus a
//! [`SurfaceFactory`] able to attach a render surface to it. At most one
//! [`SceneHandle`] is live per mount. Activating a new scene first tears the
//! previous one down in full, so two surfaces never share a container.
//!
//! # Quick Start
//!
//! ```ignore
//! let mut mount = Mount::new(WgpuFactory::new(window.clone()), window.inner_size().into());
//! mount.activate(
//!     SceneOptions::new()
//!         .with_mode(ViewMode::Interactive)
//!         .with_category(Some(Category::Cryosphere)),
//!     &dataset,
//! )?;
//!
//! // On every redraw:
//! if mount.frame().wants_next_frame() {
//!     window.request_redraw();
//! }
//! ```
//!
//! # Teardown order
//!
//! | Step | What is released |
//! |------|------------------|
//! | 1 | Animation handle is cancelled; later frame callbacks are no-ops |
//! | 2 | Any drag in progress is dropped |
//! | 3 | Resize and pointer listeners are detached |
//! | 4 | Scene nodes (geometry, materials) are cleared |
//! | 5 | The render surface and its GPU resources are dropped |

use crate::dataset::{Category, Dataset};
use crate::error::GpuError;
use crate::gpu::camera::Camera;
use crate::input::{DragController, PointerEvent};
use crate::render_loop::{AnimationHandle, FrameOutcome, RenderLoop};
use crate::rotation::{RotationState, ViewMode};
use crate::scene::SceneGraph;
use crate::starfield::StarfieldConfig;
use crate::viewport::Viewport;
use crate::visuals::{map_index_to_visuals, VisualParams};

/// Everything a render surface needs to draw one frame.
pub struct FrameData<'a> {
    pub scene: &'a SceneGraph,
    pub camera: &'a Camera,
}

/// A drawable surface attached to a container.
///
/// Dropping the surface must release every GPU resource it owns.
pub trait RenderSurface {
    /// Resize to a drawable viewport. Never called with a zero dimension.
    fn resize(&mut self, viewport: Viewport);

    /// Draw one frame.
    fn draw(&mut self, frame: &FrameData<'_>) -> Result<(), wgpu::SurfaceError>;
}

/// Creates render surfaces for a container.
pub trait SurfaceFactory {
    type Surface: RenderSurface;

    /// Create a surface sized to `viewport` and upload the scene's geometry.
    ///
    /// On error nothing is left attached to the container.
    fn create_surface(&mut self, viewport: Viewport, scene: &SceneGraph) -> Result<Self::Surface, GpuError>;
}

/// What to show when a scene is activated.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneOptions {
    pub mode: ViewMode,
    pub category: Option<Category>,
    pub index: usize,
    pub starfield: StarfieldConfig,
}

impl SceneOptions {
    pub fn new() -> Self {
        Self {
            mode: ViewMode::default(),
            category: None,
            index: 0,
            starfield: StarfieldConfig::default(),
        }
    }

    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_starfield(mut self, starfield: StarfieldConfig) -> Self {
        self.starfield = starfield;
        self
    }
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Event sources a scene handle subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Resize,
    PointerDown,
    PointerMove,
    PointerUp,
}

impl ListenerKind {
    fn for_pointer(event: &PointerEvent) -> Self {
        match event {
            PointerEvent::Down { .. } => ListenerKind::PointerDown,
            PointerEvent::Move { .. } => ListenerKind::PointerMove,
            PointerEvent::Up => ListenerKind::PointerUp,
        }
    }

    fn for_mode(mode: ViewMode) -> Vec<ListenerKind> {
        match mode {
            ViewMode::Ambient => vec![ListenerKind::Resize],
            ViewMode::Interactive => vec![
                ListenerKind::Resize,
                ListenerKind::PointerDown,
                ListenerKind::PointerMove,
                ListenerKind::PointerUp,
            ],
        }
    }
}

/// The owned bundle of scene graph, camera, rotation, render loop and surface
/// for one active view.
pub struct SceneHandle<S: RenderSurface> {
    id: u64,
    options: SceneOptions,
    scene: SceneGraph,
    camera: Camera,
    rotation: RotationState,
    drag: DragController,
    render_loop: RenderLoop,
    visuals: VisualParams,
    listeners: Vec<ListenerKind>,
    surface: Option<S>,
}

impl<S: RenderSurface> SceneHandle<S> {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    pub fn mode(&self) -> ViewMode {
        self.options.mode
    }

    pub fn index(&self) -> usize {
        self.options.index
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Mutable scene access, for hosts that edit nodes between frames.
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    /// The visual parameter set last applied to the scene.
    pub fn visuals(&self) -> &VisualParams {
        &self.visuals
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn animation(&self) -> Option<AnimationHandle> {
        self.render_loop.handle()
    }

    pub fn listeners(&self) -> &[ListenerKind] {
        &self.listeners
    }

    pub fn listens(&self, kind: ListenerKind) -> bool {
        self.listeners.contains(&kind)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Whether the handle still owns a render surface.
    pub fn is_active(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Run one frame callback: rotate, then draw.
    pub fn frame(&mut self) -> FrameOutcome {
        let Self {
            scene,
            camera,
            rotation,
            render_loop,
            surface,
            ..
        } = self;
        let Some(surface) = surface.as_mut() else {
            return FrameOutcome::Idle;
        };
        render_loop.tick(scene, rotation, |scene| surface.draw(&FrameData { scene, camera }))
    }

    /// Match the camera and surface to a new container size.
    ///
    /// Returns `false`, touching nothing, for a zero-sized viewport or a
    /// deactivated handle.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        let Some(aspect) = viewport.aspect() else {
            log::debug!("Ignoring resize to {}x{}", viewport.width, viewport.height);
            return false;
        };
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        self.camera.set_aspect(aspect);
        surface.resize(viewport);
        true
    }

    /// Feed a pointer event to the drag controller.
    ///
    /// Returns `true` if the rotation targets changed.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        if !self.listens(ListenerKind::for_pointer(&event)) {
            return false;
        }
        self.drag.handle(event, &mut self.rotation)
    }

    /// Select a new dataset index and recompute the visuals from scratch.
    pub fn set_index(&mut self, dataset: &Dataset, index: usize) {
        let index = dataset.clamp_index(index);
        self.options.index = index;
        self.visuals = map_index_to_visuals(dataset, self.options.category, index);
        self.scene.apply_visuals(&self.visuals);
    }

    /// Release everything the handle owns.
    ///
    /// The animation handle is cancelled before the surface is dropped. Safe to
    /// call more than once; returns `true` only on the call that released.
    pub fn deactivate(&mut self) -> bool {
        if self.surface.is_none() && !self.render_loop.is_running() {
            return false;
        }
        self.render_loop.stop();
        self.drag.cancel();
        self.listeners.clear();
        self.scene.clear();
        self.surface = None;
        log::info!("Deactivated scene #{} ({:?})", self.id, self.options.mode);
        true
    }
}

impl<S: RenderSurface> Drop for SceneHandle<S> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// A container a scene can be mounted in.
pub struct Mount<F: SurfaceFactory> {
    factory: F,
    viewport: Viewport,
    active: Option<SceneHandle<F::Surface>>,
    next_id: u64,
}

impl<F: SurfaceFactory> Mount<F> {
    pub fn new(factory: F, viewport: Viewport) -> Self {
        Self {
            factory,
            viewport,
            active: None,
            next_id: 1,
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn handle(&self) -> Option<&SceneHandle<F::Surface>> {
        self.active.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut SceneHandle<F::Surface>> {
        self.active.as_mut()
    }

    pub fn surface_mut(&mut self) -> Option<&mut F::Surface> {
        self.active.as_mut().and_then(SceneHandle::surface_mut)
    }

    /// Listeners currently registered by the live handle.
    pub fn listener_count(&self) -> usize {
        self.active.as_ref().map_or(0, |handle| handle.listeners.len())
    }

    /// Build a fresh scene and attach a surface for it.
    ///
    /// Any live handle is deactivated first. On error the mount is left with no
    /// handle and no listeners.
    pub fn activate(
        &mut self,
        options: SceneOptions,
        dataset: &Dataset,
    ) -> Result<&mut SceneHandle<F::Surface>, GpuError> {
        self.deactivate();

        let Some(aspect) = self.viewport.aspect() else {
            return Err(GpuError::EmptyViewport);
        };

        let id = self.next_id;
        self.next_id += 1;

        let mut options = options;
        options.index = dataset.clamp_index(options.index);

        let mut scene = SceneGraph::build(options.mode, &options.starfield);
        let visuals = map_index_to_visuals(dataset, options.category, options.index);
        scene.apply_visuals(&visuals);

        let surface = self.factory.create_surface(self.viewport, &scene)?;

        let mut handle = SceneHandle {
            id,
            listeners: ListenerKind::for_mode(options.mode),
            options,
            scene,
            camera: Camera::new(aspect),
            rotation: RotationState::new(),
            drag: DragController::new(),
            render_loop: RenderLoop::new(),
            visuals,
            surface: Some(surface),
        };
        handle.render_loop.start(id);

        log::info!(
            "Activated scene #{} ({:?}, category {:?}, index {}) at {}x{}",
            id,
            handle.options.mode,
            handle.options.category,
            handle.options.index,
            self.viewport.width,
            self.viewport.height
        );
        Ok(self.active.insert(handle))
    }

    /// Tear down the live handle, if any. Idempotent.
    pub fn deactivate(&mut self) -> bool {
        match self.active.take() {
            Some(mut handle) => handle.deactivate(),
            None => false,
        }
    }

    /// Run one frame callback for the live handle.
    ///
    /// While the container is zero-sized nothing is ticked or drawn. The loop
    /// stays running and picks up again after a drawable resize.
    pub fn frame(&mut self) -> FrameOutcome {
        if !self.viewport.is_drawable() {
            return FrameOutcome::Idle;
        }
        self.active
            .as_mut()
            .map_or(FrameOutcome::Idle, SceneHandle::frame)
    }

    /// Record a container resize and forward it to the live handle.
    ///
    /// Zero-sized viewports are remembered (so the next activation fails
    /// cleanly) but never forwarded.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        self.viewport = viewport;
        match self.active.as_mut() {
            Some(handle) if handle.listens(ListenerKind::Resize) => handle.resize(viewport),
            _ => false,
        }
    }

    /// Forward a pointer event to the live handle.
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        self.active
            .as_mut()
            .is_some_and(|handle| handle.pointer(event))
    }

    /// Change the selected index of the live handle.
    pub fn select_index(&mut self, dataset: &Dataset, index: usize) -> bool {
        match self.active.as_mut() {
            Some(handle) => {
                handle.set_index(dataset, index);
                true
            }
            None => false,
        }
    }
}
