//! Pointer input for the interactive globe.
//!
//! Raw winit events are first reduced to [`PointerEvent`]s by [`PointerInput`],
//! which remembers the cursor position (winit reports button presses without
//! one). A [`DragController`] then turns pointer events into rotation targets:
//!
//! - pointer-down on the render surface starts a drag,
//! - pointer-move while dragging adds the pixel delta to the targets,
//! - pointer-up anywhere ends the drag. There is no inertia after release.

use glam::Vec2;
use winit::event::{ElementState, MouseButton as WinitMouseButton, WindowEvent};

use crate::rotation::RotationState;

/// A pointer gesture step, already stripped of platform details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Primary button pressed. `on_surface` is false when an overlay (UI panel)
    /// received the press instead of the render surface.
    Down { position: Vec2, on_surface: bool },
    /// Pointer moved to `position` (window pixels).
    Move { position: Vec2 },
    /// Primary button released, wherever the pointer is.
    Up,
}

/// Tracks the cursor and converts winit events into [`PointerEvent`]s.
#[derive(Debug, Default)]
pub struct PointerInput {
    position: Vec2,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known cursor position in window pixels.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Translate a window event. Only the left button drives the globe.
    ///
    /// `on_surface` tells whether a press landed on the render surface rather
    /// than on overlay UI.
    pub fn translate(&mut self, event: &WindowEvent, on_surface: bool) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.position = Vec2::new(position.x as f32, position.y as f32);
                Some(PointerEvent::Move {
                    position: self.position,
                })
            }
            WindowEvent::MouseInput {
                state,
                button: WinitMouseButton::Left,
                ..
            } => {
                match state {
                    ElementState::Pressed => Some(PointerEvent::Down {
                        position: self.position,
                        on_surface,
                    }),
                    ElementState::Released => Some(PointerEvent::Up),
                }
            }
            _ => None,
        }
    }
}

/// Converts drag gestures into rotation target changes.
#[derive(Debug, Default)]
pub struct DragController {
    dragging: bool,
    last_position: Vec2,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Feed one pointer event. Returns `true` if the rotation targets changed.
    pub fn handle(&mut self, event: PointerEvent, rotation: &mut RotationState) -> bool {
        match event {
            PointerEvent::Down {
                position,
                on_surface,
            } => {
                if on_surface {
                    self.dragging = true;
                    self.last_position = position;
                }
                false
            }
            PointerEvent::Move { position } => {
                if !self.dragging {
                    return false;
                }
                let delta = position - self.last_position;
                rotation.apply_drag(delta.x, delta.y);
                self.last_position = position;
                delta != Vec2::ZERO
            }
            PointerEvent::Up => {
                self.dragging = false;
                false
            }
        }
    }

    /// Drop any drag in progress.
    pub fn cancel(&mut self) {
        self.dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(x: f32, y: f32) -> PointerEvent {
        PointerEvent::Down {
            position: Vec2::new(x, y),
            on_surface: true,
        }
    }

    fn move_to(x: f32, y: f32) -> PointerEvent {
        PointerEvent::Move {
            position: Vec2::new(x, y),
        }
    }

    #[test]
    fn test_drag_updates_targets() {
        let mut drag = DragController::new();
        let mut rotation = RotationState::new();

        drag.handle(down(10.0, 10.0), &mut rotation);
        assert!(drag.is_dragging());

        assert!(drag.handle(move_to(60.0, 10.0), &mut rotation));
        assert!(drag.handle(move_to(110.0, 10.0), &mut rotation));
        assert!((rotation.target_y() - 0.5).abs() < 1e-6);
        assert_eq!(rotation.target_x(), 0.0);

        drag.handle(move_to(110.0, 30.0), &mut rotation);
        assert!((rotation.target_x() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let mut drag = DragController::new();
        let mut rotation = RotationState::new();

        assert!(!drag.handle(move_to(500.0, 500.0), &mut rotation));
        assert_eq!(rotation, RotationState::new());
    }

    #[test]
    fn test_press_on_overlay_does_not_start_drag() {
        let mut drag = DragController::new();
        let mut rotation = RotationState::new();

        drag.handle(
            PointerEvent::Down {
                position: Vec2::new(5.0, 5.0),
                on_surface: false,
            },
            &mut rotation,
        );
        assert!(!drag.is_dragging());
        drag.handle(move_to(300.0, 300.0), &mut rotation);
        assert_eq!(rotation, RotationState::new());
    }

    #[test]
    fn test_release_ends_drag() {
        let mut drag = DragController::new();
        let mut rotation = RotationState::new();

        drag.handle(down(0.0, 0.0), &mut rotation);
        drag.handle(PointerEvent::Up, &mut rotation);
        assert!(!drag.is_dragging());

        let before = rotation;
        drag.handle(move_to(100.0, 100.0), &mut rotation);
        assert_eq!(rotation, before);
    }

    #[test]
    fn test_new_drag_starts_from_press_position() {
        let mut drag = DragController::new();
        let mut rotation = RotationState::new();

        drag.handle(down(0.0, 0.0), &mut rotation);
        drag.handle(move_to(20.0, 0.0), &mut rotation);
        drag.handle(PointerEvent::Up, &mut rotation);

        // A second drag must not see the jump from (20, 0) to (500, 0).
        drag.handle(down(500.0, 0.0), &mut rotation);
        drag.handle(move_to(520.0, 0.0), &mut rotation);
        assert!((rotation.target_y() - 40.0 * DRAG_STEP).abs() < 1e-6);
    }

    const DRAG_STEP: f32 = crate::rotation::DRAG_RADIANS_PER_PIXEL;

    #[test]
    fn test_pointer_input_translates_window_events() {
        use winit::dpi::PhysicalPosition;
        use winit::event::DeviceId;

        // SAFETY: dummy device ids are only compared, never dereferenced.
        let device_id = unsafe { DeviceId::dummy() };
        let mut input = PointerInput::new();

        let moved = WindowEvent::CursorMoved {
            device_id,
            position: PhysicalPosition::new(12.0, 34.0),
        };
        assert_eq!(
            input.translate(&moved, true),
            Some(move_to(12.0, 34.0))
        );

        let pressed = WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: WinitMouseButton::Left,
        };
        assert_eq!(
            input.translate(&pressed, false),
            Some(PointerEvent::Down {
                position: Vec2::new(12.0, 34.0),
                on_surface: false,
            })
        );

        let right = WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: WinitMouseButton::Right,
        };
        assert_eq!(input.translate(&right, true), None);

        let released = WindowEvent::MouseInput {
            device_id,
            state: ElementState::Released,
            button: WinitMouseButton::Left,
        };
        assert_eq!(input.translate(&released, true), Some(PointerEvent::Up));
    }
}
