//! Mapping from dataset values to the globe's visual parameters.
//!
//! Every selection change recomputes a fresh [`VisualParams`] from the reset
//! defaults, so nothing from a previous category or index survives:
//!
//! ```ignore
//! let params = map_index_to_visuals(&dataset, Some(Category::Cryosphere), 0);
//! assert!(params.overlay_visible);
//! ```
//!
//! | Category | Series | Range | Effect |
//! |----------|--------|-------|--------|
//! | Atmosphere | `co2_ppm` | 370 - 425 | warmer atmosphere tint, warning glow |
//! | Cryosphere | `arctic_ice_extent` | 12.8 - 15.5 | polar caps shown, scaled 0.8 - 1.0 |
//! | Land | `land_temp_anomaly` | 0.6 - 1.3 | vegetation to warning base color |
//! | Ocean | `sea_surface_temp_anomaly` | 0.35 - 0.85 | deep to warm ocean base color |

use glam::Vec3;

use crate::dataset::{Category, Dataset};

/// Globe color when no category applies.
pub const OCEAN_DEFAULT: Vec3 = Vec3::new(0.133, 0.4, 0.8);
/// Atmosphere tint at the cool end of the scale (and the reset tint).
pub const ATMOSPHERE_COOL: Vec3 = Vec3::new(0.3, 0.6, 1.0);
pub const ATMOSPHERE_WARM: Vec3 = Vec3::new(1.0, 0.5, 0.2);
pub const NO_EMISSIVE: Vec3 = Vec3::ZERO;
/// Glow color used for a high greenhouse-gas reading.
pub const EMISSIVE_WARNING: Vec3 = Vec3::new(1.0, 0.267, 0.0);
/// Fixed green/blue blend used while the atmosphere category is active.
pub const GREEN_BLUE: Vec3 = Vec3::new(0.165, 0.55, 0.55);
pub const OCEAN_BLUE: Vec3 = Vec3::new(0.1, 0.35, 0.75);
pub const VEGETATION: Vec3 = Vec3::new(0.2, 0.6, 0.2);
pub const LAND_WARNING: Vec3 = Vec3::new(0.8, 0.4, 0.1);
pub const DEEP_OCEAN: Vec3 = Vec3::new(0.0, 0.15, 0.45);
pub const WARM_SURFACE: Vec3 = Vec3::new(0.0, 0.6, 0.7);

/// Polar cap scale at the lowest ice extent.
pub const OVERLAY_MIN_SCALE: f32 = 0.8;
/// Polar cap scale at the highest ice extent.
pub const OVERLAY_MAX_SCALE: f32 = 1.0;

/// Empirical value range used to normalize a series into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationRange {
    pub min: f32,
    pub max: f32,
}

impl NormalizationRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Normalize `value`, clamped to `[0, 1]`. A degenerate range maps to 0.
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span.abs() <= f32::EPSILON {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Which series drives a category, and over what range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingRule {
    pub series: &'static str,
    pub range: NormalizationRange,
}

impl MappingRule {
    pub fn for_category(category: Category) -> Self {
        let range = match category {
            Category::Atmosphere => NormalizationRange::new(370.0, 425.0),
            Category::Cryosphere => NormalizationRange::new(12.8, 15.5),
            Category::Land => NormalizationRange::new(0.6, 1.3),
            Category::Ocean => NormalizationRange::new(0.35, 0.85),
        };
        Self {
            series: category.representative_series(),
            range,
        }
    }

    /// Normalized factor for `index`, or `None` when the series is missing.
    pub fn factor(&self, dataset: &Dataset, category: Category, index: usize) -> Option<f32> {
        dataset
            .value(category.key(), self.series, index)
            .map(|value| self.range.normalize(value))
    }
}

/// Derived appearance of the globe for one (category, index) selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualParams {
    pub base_color: Vec3,
    pub emissive: Vec3,
    pub atmosphere_tint: Vec3,
    pub overlay_visible: bool,
    pub overlay_scale: f32,
}

impl VisualParams {
    /// The reset state every selection starts from.
    pub fn reset() -> Self {
        Self {
            base_color: OCEAN_DEFAULT,
            emissive: NO_EMISSIVE,
            atmosphere_tint: ATMOSPHERE_COOL,
            overlay_visible: false,
            overlay_scale: OVERLAY_MAX_SCALE,
        }
    }

    /// Apply one category's deltas on top of `self`.
    ///
    /// Unknown categories and missing series leave `self` unchanged. Callers
    /// start from [`VisualParams::reset`] so that deltas never accumulate.
    pub fn apply_category(&mut self, dataset: &Dataset, category: Option<Category>, index: usize) {
        let Some(category) = category else {
            return;
        };
        let index = dataset.clamp_index(index);
        let rule = MappingRule::for_category(category);
        let Some(factor) = rule.factor(dataset, category, index) else {
            log::debug!("No '{}' series for {}, leaving visuals unchanged", rule.series, category);
            return;
        };

        match category {
            Category::Atmosphere => {
                self.atmosphere_tint = ATMOSPHERE_COOL.lerp(ATMOSPHERE_WARM, 0.5 * factor);
                self.emissive = NO_EMISSIVE.lerp(EMISSIVE_WARNING, 0.3 * factor);
                self.base_color = GREEN_BLUE;
            }
            Category::Cryosphere => {
                self.overlay_visible = true;
                self.overlay_scale =
                    OVERLAY_MIN_SCALE + (OVERLAY_MAX_SCALE - OVERLAY_MIN_SCALE) * factor;
                self.base_color = OCEAN_BLUE;
            }
            Category::Land => {
                self.base_color = VEGETATION.lerp(LAND_WARNING, factor);
            }
            Category::Ocean => {
                self.base_color = DEEP_OCEAN.lerp(WARM_SURFACE, factor);
            }
        }
    }
}

impl Default for VisualParams {
    fn default() -> Self {
        Self::reset()
    }
}

/// Compute the visual parameters for a selection.
///
/// Pure: the same inputs always give the same output and the dataset is only read.
pub fn map_index_to_visuals(dataset: &Dataset, category: Option<Category>, index: usize) -> VisualParams {
    let mut params = VisualParams::reset();
    params.apply_category(dataset, category, index);
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn test_normalize() {
        let range = NormalizationRange::new(370.0, 425.0);
        assert_eq!(range.normalize(370.0), 0.0);
        assert_eq!(range.normalize(425.0), 1.0);
        assert_eq!(range.normalize(300.0), 0.0);
        assert_eq!(range.normalize(500.0), 1.0);
        assert_eq!(NormalizationRange::new(1.0, 1.0).normalize(5.0), 0.0);
    }

    #[test]
    fn test_cryosphere_scenario() {
        let data = Dataset::reference();

        let high = map_index_to_visuals(&data, Some(Category::Cryosphere), 0);
        assert!(high.overlay_visible);
        assert!((high.overlay_scale - 1.0).abs() < 1e-5);
        assert_eq!(high.base_color, OCEAN_BLUE);

        let low = map_index_to_visuals(&data, Some(Category::Cryosphere), 4);
        assert!(low.overlay_visible);
        assert!((low.overlay_scale - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_atmosphere_scenario() {
        let data = Dataset::reference();

        let cool = map_index_to_visuals(&data, Some(Category::Atmosphere), 0);
        assert!(approx(cool.atmosphere_tint, ATMOSPHERE_COOL));
        assert!(approx(cool.emissive, NO_EMISSIVE));
        assert_eq!(cool.base_color, GREEN_BLUE);

        let warm = map_index_to_visuals(&data, Some(Category::Atmosphere), 4);
        assert!(approx(warm.atmosphere_tint, ATMOSPHERE_COOL.lerp(ATMOSPHERE_WARM, 0.5)));
        assert!(approx(warm.emissive, EMISSIVE_WARNING * 0.3));
        assert!(!warm.overlay_visible);
    }

    #[test]
    fn test_land_and_ocean_blend_endpoints() {
        let data = Dataset::reference();

        assert!(approx(map_index_to_visuals(&data, Some(Category::Land), 0).base_color, VEGETATION));
        assert!(approx(map_index_to_visuals(&data, Some(Category::Land), 4).base_color, LAND_WARNING));
        assert!(approx(map_index_to_visuals(&data, Some(Category::Ocean), 0).base_color, DEEP_OCEAN));
        assert!(approx(map_index_to_visuals(&data, Some(Category::Ocean), 4).base_color, WARM_SURFACE));
    }

    #[test]
    fn test_mapping_is_pure() {
        let data = Dataset::reference();
        let before = data.clone();
        for category in Category::ALL {
            for index in 0..data.len() {
                let a = map_index_to_visuals(&data, Some(category), index);
                let b = map_index_to_visuals(&data, Some(category), index);
                assert_eq!(a, b);
            }
        }
        assert_eq!(data, before);
    }

    #[test]
    fn test_no_leakage_across_categories() {
        let data = Dataset::reference();
        for previous in Category::ALL {
            for next in Category::ALL {
                if previous == next {
                    continue;
                }
                // Selecting `previous` first must not influence `next`.
                let _ = map_index_to_visuals(&data, Some(previous), 4);
                let fresh = map_index_to_visuals(&data, Some(next), 2);
                let mut expected = VisualParams::reset();
                expected.apply_category(&data, Some(next), 2);
                assert_eq!(fresh, expected);

                if next != Category::Cryosphere {
                    assert!(!fresh.overlay_visible);
                }
                if next != Category::Atmosphere {
                    assert_eq!(fresh.emissive, NO_EMISSIVE);
                    assert_eq!(fresh.atmosphere_tint, ATMOSPHERE_COOL);
                }
            }
        }
    }

    #[test]
    fn test_unknown_category_and_missing_series_are_noops() {
        let data = Dataset::reference();
        assert_eq!(map_index_to_visuals(&data, None, 3), VisualParams::reset());

        let sparse = Dataset::new(["2000", "2010"]);
        assert_eq!(
            map_index_to_visuals(&sparse, Some(Category::Land), 1),
            VisualParams::reset()
        );
    }

    #[test]
    fn test_out_of_range_index_is_clamped() {
        let data = Dataset::reference();
        assert_eq!(
            map_index_to_visuals(&data, Some(Category::Cryosphere), 42),
            map_index_to_visuals(&data, Some(Category::Cryosphere), 4)
        );
    }
}
