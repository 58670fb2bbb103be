//! Climate dataset consumed by the data mapper.
//!
//! A [`Dataset`] is an ordered list of period labels plus, per category, named
//! numeric series indexed in lockstep with those labels. The globe only ever
//! reads it.
//!
//! ```ignore
//! let data = Dataset::reference();
//! assert_eq!(data.len(), 5);
//! assert_eq!(data.value("atmosphere", "co2_ppm", 4), Some(425.0));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// The four domains whose trend data drives the globe's appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Atmosphere,
    Ocean,
    Cryosphere,
    Land,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 4] = [
        Category::Atmosphere,
        Category::Ocean,
        Category::Cryosphere,
        Category::Land,
    ];

    /// Key used for this category in dataset files.
    pub fn key(self) -> &'static str {
        match self {
            Category::Atmosphere => "atmosphere",
            Category::Ocean => "ocean",
            Category::Cryosphere => "cryosphere",
            Category::Land => "land",
        }
    }

    /// Human readable name.
    pub fn label(self) -> &'static str {
        match self {
            Category::Atmosphere => "Atmosphere",
            Category::Ocean => "Ocean",
            Category::Cryosphere => "Cryosphere",
            Category::Land => "Land",
        }
    }

    /// Series that stands in for the whole category on the globe.
    pub fn representative_series(self) -> &'static str {
        match self {
            Category::Atmosphere => "co2_ppm",
            Category::Ocean => "sea_surface_temp_anomaly",
            Category::Cryosphere => "arctic_ice_extent",
            Category::Land => "land_temp_anomaly",
        }
    }

    /// Unit of the representative series.
    pub fn unit(self) -> &'static str {
        match self {
            Category::Atmosphere => "ppm",
            Category::Ocean | Category::Land => "°C",
            Category::Cryosphere => "million km²",
        }
    }

    /// Parse a category name. Unknown names yield `None`.
    ///
    /// Accepts the dataset keys plus the common aliases `gas`, `ice` and `cryo`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "atmosphere" | "gas" => Some(Category::Atmosphere),
            "ocean" => Some(Category::Ocean),
            "cryosphere" | "cryo" | "ice" => Some(Category::Cryosphere),
            "land" => Some(Category::Land),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered, fixed-length table of labeled periods and per-category series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    periods: Vec<String>,
    #[serde(default)]
    categories: BTreeMap<String, BTreeMap<String, Vec<f32>>>,
}

impl Dataset {
    /// Create an empty dataset over the given periods.
    pub fn new<S: Into<String>>(periods: impl IntoIterator<Item = S>) -> Self {
        Self {
            periods: periods.into_iter().map(Into::into).collect(),
            categories: BTreeMap::new(),
        }
    }

    /// Add (or replace) a series.
    pub fn with_series(mut self, category: &str, series: &str, values: Vec<f32>) -> Self {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(series.to_string(), values);
        self
    }

    /// The bundled five-period reference configuration.
    pub fn reference() -> Self {
        Self::new(["2000", "2006", "2012", "2018", "2024"])
            .with_series("atmosphere", "co2_ppm", vec![370.0, 382.0, 394.0, 408.0, 425.0])
            .with_series("atmosphere", "methane_ppb", vec![1773.0, 1775.0, 1808.0, 1858.0, 1930.0])
            .with_series("ocean", "sea_surface_temp_anomaly", vec![0.35, 0.45, 0.55, 0.7, 0.85])
            .with_series("ocean", "ph", vec![8.11, 8.10, 8.09, 8.07, 8.05])
            .with_series("cryosphere", "arctic_ice_extent", vec![15.5, 14.9, 14.2, 13.5, 12.8])
            .with_series("cryosphere", "sea_level_mm", vec![0.0, 18.0, 38.0, 62.0, 95.0])
            .with_series("land", "land_temp_anomaly", vec![0.6, 0.75, 0.9, 1.1, 1.3])
            .with_series("land", "forest_cover_pct", vec![31.9, 31.6, 31.3, 31.0, 30.7])
    }

    /// Parse and validate a dataset from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let dataset: Dataset = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Load and validate a dataset from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that there is at least one period and that every series has one
    /// value per period.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.periods.is_empty() {
            return Err(DatasetError::NoPeriods);
        }
        for (category, series_map) in &self.categories {
            for (series, values) in series_map {
                if values.len() != self.periods.len() {
                    return Err(DatasetError::SeriesLength {
                        category: category.clone(),
                        series: series.clone(),
                        expected: self.periods.len(),
                        found: values.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of periods (L).
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Largest valid index, `L - 1`.
    pub fn max_index(&self) -> usize {
        self.periods.len().saturating_sub(1)
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn period(&self, index: usize) -> Option<&str> {
        self.periods.get(index).map(String::as_str)
    }

    /// Names of the series recorded for a category.
    pub fn series_names<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.categories
            .get(category)
            .into_iter()
            .flat_map(|series| series.keys().map(String::as_str))
    }

    pub fn series(&self, category: &str, series: &str) -> Option<&[f32]> {
        self.categories
            .get(category)
            .and_then(|map| map.get(series))
            .map(Vec::as_slice)
    }

    /// Value of a series at `index`, or `None` when the series or index is missing.
    pub fn value(&self, category: &str, series: &str, index: usize) -> Option<f32> {
        self.series(category, series)
            .and_then(|values| values.get(index))
            .copied()
    }

    /// Clamp an index into `[0, L - 1]`.
    ///
    /// Out-of-range indices are a caller error; they are logged and clamped.
    pub fn clamp_index(&self, index: usize) -> usize {
        let max = self.max_index();
        if index > max {
            log::warn!("Index {} out of range, clamping to {}", index, max);
        }
        index.min(max)
    }

    /// One-line textual summary of a category's representative series at `index`.
    pub fn summary(&self, category: Category, index: usize) -> String {
        let index = self.clamp_index(index);
        let period = self.period(index).unwrap_or("?");
        let series = category.representative_series();

        match self.value(category.key(), series, index) {
            Some(value) => {
                let mut line = format!(
                    "{} · {}: {} {:.2} {}",
                    period,
                    category.label(),
                    series,
                    value,
                    category.unit()
                );
                if index > 0 {
                    if let (Some(first), Some(first_period)) =
                        (self.value(category.key(), series, 0), self.period(0))
                    {
                        line.push_str(&format!(" ({:+.2} since {})", value - first, first_period));
                    }
                }
                line
            }
            None => format!("{} · {}: no data", period, category.label()),
        }
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::reference()
    }
}
