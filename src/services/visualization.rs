//! Population visualization data for the world map view

use super::country_codes::country_code;
use crate::types::{CountryRecord, VisualizationDatum};

/// Density bucket thresholds (half-open: `[lower, upper)`)
const LOW_UPPER: f64 = 50.0;
const MODERATE_UPPER: f64 = 100.0;
const HIGH_UPPER: f64 = 200.0;

/// Ordered density categories, each mapped to a fixed map color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DensityBucket {
    Low,
    Moderate,
    High,
    Extreme,
    /// Population unknown or enrichment failed
    NoData,
}

impl DensityBucket {
    pub fn for_density(density: f64) -> Self {
        if !density.is_finite() || density < 0.0 {
            Self::NoData
        } else if density < LOW_UPPER {
            Self::Low
        } else if density < MODERATE_UPPER {
            Self::Moderate
        } else if density < HIGH_UPPER {
            Self::High
        } else {
            Self::Extreme
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "#2ECC71",
            Self::Moderate => "#F39C12",
            Self::High => "#E74C3C",
            Self::Extreme => "#8E44AD",
            Self::NoData => "#CCCCCC",
        }
    }
}

/// Monotonic density proxy: `ln(population + 1)`
pub fn density(population: u64) -> f64 {
    (population as f64).ln_1p()
}

/// Build the map datum for one country.
///
/// Unknown or zero population yields density 0 and the no-data color.
pub fn visualize(record: &CountryRecord) -> VisualizationDatum {
    let (population, density, bucket) = match record.population.filter(|&p| p > 0) {
        Some(population) => {
            let d = density(population);
            (population, d, DensityBucket::for_density(d))
        }
        None => (0, 0.0, DensityBucket::NoData),
    };

    VisualizationDatum {
        country_code: country_code(&record.name).map(String::from),
        country_name: record.name.clone(),
        population,
        density,
        color_code: bucket.color().to_string(),
    }
}
