//! Country domain types shared by sources, merger and services

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{CountryError, Result};

/// Unified country record produced by the merge pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CountryRecord {
    pub name: String,
    pub capital: Option<String>,
    #[serde(rename = "flag")]
    pub flag_url: Option<String>,
    /// `None` means unknown (no source delivered a usable value)
    pub population: Option<u64>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub subregion: Option<String>,
}

impl CountryRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_capital(mut self, capital: impl Into<String>) -> Self {
        self.capital = Some(capital.into());
        self
    }
}

/// Partial record contributed by one supplement source for one country.
///
/// Every field is optional; only present, non-placeholder values are
/// applied during the merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Supplement {
    pub capital: Option<String>,
    pub flag_url: Option<String>,
    pub population: Option<u64>,
    pub region: Option<String>,
    pub subregion: Option<String>,
}

impl Supplement {
    pub fn flag(url: impl Into<String>) -> Self {
        Self {
            flag_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn population(value: u64) -> Self {
        Self {
            population: Some(value),
            ..Default::default()
        }
    }
}

/// Supplement data keyed by the exact country name the base source returned
pub type SupplementMap = HashMap<String, Supplement>;

/// One population observation for a city
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PopulationSeriesPoint {
    pub year: i32,
    pub value: u64,
}

/// Raw per-city population series, passed through from the upstream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CityPopulationEntry {
    pub city: String,
    pub country: String,
    pub population_counts: Vec<PopulationSeriesPoint>,
}

impl CityPopulationEntry {
    /// Observation with the highest year (later position wins a tie)
    pub fn latest(&self) -> Option<&PopulationSeriesPoint> {
        self.population_counts.iter().max_by_key(|p| p.year)
    }
}

/// Presentation-ready population datum for the world map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationDatum {
    /// ISO 3166-1 alpha-2 code, `None` when the name has no known code
    pub country_code: Option<String>,
    pub country_name: String,
    pub population: u64,
    pub density: f64,
    pub color_code: String,
}

/// Result of asking one upstream source for data.
///
/// Failures are values, so one failing source never aborts the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome<T> {
    Available(T),
    Unavailable { source: String, reason: String },
}

impl<T> SourceOutcome<T> {
    pub fn unavailable(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            source: source.into(),
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn available(self) -> Option<T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Available(value) => Ok(value),
            Self::Unavailable { source, reason } => Err(CountryError::unavailable(source, reason)),
        }
    }
}
