//! Size of the drawable region a scene is mounted in.

use winit::dpi::PhysicalSize;

/// Physical pixel size of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero width or height cannot be drawn to or resized to.
    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width over height, or `None` for an undrawable viewport.
    pub fn aspect(&self) -> Option<f32> {
        self.is_drawable()
            .then(|| self.width as f32 / self.height as f32)
    }
}

impl From<PhysicalSize<u32>> for Viewport {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}
