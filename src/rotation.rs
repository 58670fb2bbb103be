//! Globe rotation state and its per-frame integration.
//!
//! Two sources drive the rotation: a small automatic yaw that runs every frame
//! in both modes, and (interactive mode only) drag-driven targets that the
//! current angles ease toward.

use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

/// Fraction of the remaining distance to the target covered each frame.
pub const SMOOTHING_FACTOR: f32 = 0.1;
/// Automatic globe yaw, radians per frame.
pub const AUTO_YAW_PER_FRAME: f32 = 0.001;
/// Drag sensitivity, radians per pixel.
pub const DRAG_RADIANS_PER_PIXEL: f32 = 0.005;
/// Limit on the pitch target, in both directions.
pub const MAX_PITCH: f32 = FRAC_PI_2;

/// Which variant of the globe is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Passive view that only spins.
    #[default]
    Ambient,
    /// Draggable, data-bound view with polar caps.
    Interactive,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Ambient => ViewMode::Interactive,
            ViewMode::Interactive => ViewMode::Ambient,
        }
    }

    pub fn is_interactive(self) -> bool {
        self == ViewMode::Interactive
    }
}

/// Current and target rotation angles of the globe, in radians.
///
/// `x` is pitch (clamped target), `y` is yaw (unbounded).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub current_x: f32,
    pub current_y: f32,
    target_x: f32,
    target_y: f32,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    pub fn target_y(&self) -> f32 {
        self.target_y
    }

    /// Set the targets directly. The pitch target is clamped.
    pub fn set_target(&mut self, x: f32, y: f32) {
        self.target_x = x.clamp(-MAX_PITCH, MAX_PITCH);
        self.target_y = y;
    }

    /// Apply a pointer drag of `(dx, dy)` pixels to the targets.
    pub fn apply_drag(&mut self, dx: f32, dy: f32) {
        self.set_target(
            self.target_x + dy * DRAG_RADIANS_PER_PIXEL,
            self.target_y + dx * DRAG_RADIANS_PER_PIXEL,
        );
    }

    /// Advance one frame.
    ///
    /// Ambient: the current yaw is incremented directly and the targets follow it.
    /// Interactive: the auto yaw is added to the yaw target, then both current
    /// angles ease toward their targets. The auto yaw keeps running during a drag.
    pub fn advance(&mut self, mode: ViewMode) {
        match mode {
            ViewMode::Ambient => {
                self.current_y += AUTO_YAW_PER_FRAME;
                self.target_x = self.current_x.clamp(-MAX_PITCH, MAX_PITCH);
                self.target_y = self.current_y;
            }
            ViewMode::Interactive => {
                self.target_y += AUTO_YAW_PER_FRAME;
                self.current_x += (self.target_x - self.current_x) * SMOOTHING_FACTOR;
                self.current_y += (self.target_y - self.current_y) * SMOOTHING_FACTOR;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_maps_pixels_to_radians() {
        let mut rotation = RotationState::new();
        rotation.apply_drag(100.0, 0.0);
        assert!((rotation.target_y() - 0.5).abs() < 1e-6);
        assert_eq!(rotation.target_x(), 0.0);
        // Targets move before any smoothing is applied.
        assert_eq!(rotation.current_y, 0.0);
    }

    #[test]
    fn test_pitch_target_is_clamped() {
        let mut rotation = RotationState::new();
        rotation.apply_drag(0.0, 1.0e9);
        assert_eq!(rotation.target_x(), MAX_PITCH);
        rotation.apply_drag(0.0, -1.0e12);
        assert_eq!(rotation.target_x(), -MAX_PITCH);

        let deltas = [350.0, -17.0, 9_000.0, -0.25, f32::MAX, -f32::MAX, 42.0];
        for dy in deltas {
            rotation.apply_drag(dy * 0.5, dy);
            assert!(rotation.target_x() >= -MAX_PITCH && rotation.target_x() <= MAX_PITCH);
        }
    }

    #[test]
    fn test_yaw_target_is_unbounded() {
        let mut rotation = RotationState::new();
        for _ in 0..10 {
            rotation.apply_drag(1_000.0, 0.0);
        }
        assert!((rotation.target_y() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_interactive_smoothing() {
        let mut rotation = RotationState::new();
        rotation.set_target(1.0, 0.0);
        rotation.advance(ViewMode::Interactive);
        assert!((rotation.current_x - 0.1).abs() < 1e-6);
        // The auto yaw was added to the target, then smoothed.
        assert!((rotation.target_y() - AUTO_YAW_PER_FRAME).abs() < 1e-9);
        assert!((rotation.current_y - AUTO_YAW_PER_FRAME * SMOOTHING_FACTOR).abs() < 1e-9);

        for _ in 0..200 {
            rotation.advance(ViewMode::Interactive);
        }
        assert!((rotation.current_x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_ambient_spins_without_target_seeking() {
        let mut rotation = RotationState::new();
        rotation.set_target(1.0, 3.0);
        for _ in 0..10 {
            rotation.advance(ViewMode::Ambient);
        }
        assert_eq!(rotation.current_x, 0.0);
        assert!((rotation.current_y - 10.0 * AUTO_YAW_PER_FRAME).abs() < 1e-6);
        assert_eq!(rotation.target_y(), rotation.current_y);
    }

    #[test]
    fn test_auto_yaw_continues_after_release() {
        let mut rotation = RotationState::new();
        rotation.apply_drag(40.0, 0.0);
        for _ in 0..500 {
            rotation.advance(ViewMode::Interactive);
        }
        let before = rotation.current_y;
        rotation.advance(ViewMode::Interactive);
        let step = rotation.current_y - before;
        assert!((step - AUTO_YAW_PER_FRAME).abs() < 1e-5);
    }
}
