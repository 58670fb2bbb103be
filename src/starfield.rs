//! Decorative starfield point cloud.
//!
//! Stars are scattered uniformly inside an axis-aligned cube centered at the
//! origin. Generation is seeded, so the same config always yields the same
//! cloud:
//!
//! ```ignore
//! let stars = StarfieldConfig::default().with_count(2_000).generate();
//! assert_eq!(stars.len(), 2_000);
//! ```

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Number of stars in the default field.
pub const DEFAULT_STAR_COUNT: u32 = 5_000;
/// Side length of the cube the stars are scattered in.
pub const DEFAULT_EXTENT: f32 = 1_000.0;

/// Parameters for the starfield generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarfieldConfig {
    /// Number of points.
    pub count: u32,
    /// Side length of the bounding cube.
    pub extent: f32,
    /// RNG seed.
    pub seed: u64,
}

impl StarfieldConfig {
    pub fn new() -> Self {
        Self {
            count: DEFAULT_STAR_COUNT,
            extent: DEFAULT_EXTENT,
            seed: 0x5EED_57A2,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Set the cube side. Non-finite values collapse the field to the origin.
    pub fn with_extent(mut self, extent: f32) -> Self {
        self.extent = if extent.is_finite() { extent.abs() } else { 0.0 };
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the point cloud.
    pub fn generate(&self) -> Vec<Vec3> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let half_size = self.extent * 0.5;
        (0..self.count)
            .map(|_| random_in_cube(&mut rng, half_size))
            .collect()
    }
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Random point inside a cube of given half-size, centered at origin.
fn random_in_cube(rng: &mut SmallRng, half_size: f32) -> Vec3 {
    // Also catches NaN, which `gen_range` would panic on.
    if !(half_size > 0.0 && half_size.is_finite()) {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.gen_range(-half_size..half_size),
        rng.gen_range(-half_size..half_size),
        rng.gen_range(-half_size..half_size),
    )
}
