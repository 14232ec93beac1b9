//! Upstream source traits and implementations for public country APIs

mod countriesnow;
pub mod http;
mod restcountries;
mod un_population;

pub use countriesnow::{CityTotalsSupplement, CountriesNowClient, FlagSupplement};
pub use http::{FetchError, HttpClient};
pub use restcountries::{RestCountriesClient, RestCountriesExtraInfo};
pub use un_population::UnPopulationClient;

use crate::config::{AppConfig, Profile};
use crate::services::normalizer::{clean_text, parse_population_text, population_from_f64};
use crate::types::{
    CityPopulationEntry, CountryRecord, PopulationSeriesPoint, Result, SourceOutcome,
    SupplementMap,
};
use serde::Deserialize;
use std::time::Duration;

/// Source of the authoritative country listing (defines the join keys)
pub trait BaseSource: Send + Sync {
    /// Source name used in logs and `Unavailable` reasons
    fn name(&self) -> &str;

    fn fetch_base(&self) -> SourceOutcome<Vec<CountryRecord>>;
}

/// Source of enrichment data for countries the base source already listed
pub trait SupplementSource: Send + Sync {
    fn name(&self) -> &str;

    /// `names` are the exact strings the base source returned
    fn fetch_supplement(&self, names: &[String]) -> SourceOutcome<SupplementMap>;
}

/// Source of per-city population series for one country
pub trait CitySource: Send + Sync {
    fn name(&self) -> &str;

    /// `Available(vec![])` when the upstream has no data for `country`
    fn fetch_cities(&self, country: &str) -> SourceOutcome<Vec<CityPopulationEntry>>;
}

/// Convert a fetch result into an outcome, logging the failure at the
/// source boundary.
pub(crate) fn into_outcome<T>(
    source: &str,
    result: std::result::Result<T, FetchError>,
) -> SourceOutcome<T> {
    match result {
        Ok(value) => SourceOutcome::Available(value),
        Err(e) => {
            tracing::warn!(source, error = %e, "upstream unavailable");
            SourceOutcome::unavailable(source, e.to_string())
        }
    }
}

/// CountriesNow-style response envelope: `{error, msg, data}`
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
}

/// A number that upstreams send either as JSON number or as text
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum RawNumber {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    /// Population count, `None` when unparseable or negative
    pub fn to_population(&self) -> Option<u64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Float(v) => population_from_f64(*v),
            Self::Text(s) => parse_population_text(s),
        }
    }

    pub fn to_year(&self) -> Option<i32> {
        match self {
            Self::Integer(v) => i32::try_from(*v).ok(),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i32),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// `{year, value}` observation as sent upstream
#[derive(Debug, Deserialize)]
pub(crate) struct RawCount {
    pub year: Option<RawNumber>,
    pub value: Option<RawNumber>,
}

/// Parse raw observations, dropping points whose year or value is unusable
pub(crate) fn parse_series(counts: &[RawCount]) -> Vec<PopulationSeriesPoint> {
    counts
        .iter()
        .filter_map(|c| {
            let year = c.year.as_ref()?.to_year()?;
            let value = c.value.as_ref()?.to_population()?;
            Some(PopulationSeriesPoint { year, value })
        })
        .collect()
}

/// Latest observation of a raw series (highest year)
pub(crate) fn latest_value(counts: &[RawCount]) -> Option<u64> {
    parse_series(counts)
        .iter()
        .max_by_key(|p| p.year)
        .map(|p| p.value)
}

/// `{city, country, populationCounts}` row shared by the city endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct RawCityRow {
    pub city: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "populationCounts", default)]
    pub population_counts: Vec<RawCount>,
}

impl RawCityRow {
    pub fn into_entry(self) -> Option<CityPopulationEntry> {
        Some(CityPopulationEntry {
            city: clean_text(self.city.as_deref())?,
            country: clean_text(self.country.as_deref())?,
            population_counts: parse_series(&self.population_counts),
        })
    }
}

/// Registry of configured sources
pub struct SourceRegistry {
    base: Vec<Box<dyn BaseSource>>,
    supplements: Vec<Box<dyn SupplementSource>>,
    cities: Option<Box<dyn CitySource>>,
}

impl SourceRegistry {
    /// Empty registry, filled with the `with_*` builders
    pub fn new() -> Self {
        Self {
            base: Vec::new(),
            supplements: Vec::new(),
            cities: None,
        }
    }

    /// Build the source line-up for the configured profile
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpClient::new(Duration::from_secs(config.request_timeout_secs))?;
        let countries_now = CountriesNowClient::new(http.clone(), &config.countriesnow_url);

        let registry = match config.profile {
            Profile::Basic => Self::new()
                .with_base(countries_now.clone())
                .with_supplement(countries_now.flags()),
            Profile::Standard => Self::new()
                .with_base(countries_now.clone())
                .with_supplement(countries_now.flags())
                .with_supplement(countries_now.city_totals()),
            Profile::Extended => {
                let rest = RestCountriesClient::new(http.clone(), &config.restcountries_url);
                Self::new()
                    .with_base(rest.clone())
                    .with_base(countries_now.clone())
                    .with_supplement(UnPopulationClient::new(http, &config.population_url))
                    .with_supplement(rest.extra_info())
            }
        };

        Ok(registry.with_cities(countries_now))
    }

    /// Append a base source; earlier ones take precedence
    pub fn with_base(mut self, source: impl BaseSource + 'static) -> Self {
        self.base.push(Box::new(source));
        self
    }

    /// Append a supplement; later ones are applied later during the merge
    pub fn with_supplement(mut self, source: impl SupplementSource + 'static) -> Self {
        self.supplements.push(Box::new(source));
        self
    }

    pub fn with_cities(mut self, source: impl CitySource + 'static) -> Self {
        self.cities = Some(Box::new(source));
        self
    }

    pub fn base_sources(&self) -> &[Box<dyn BaseSource>] {
        &self.base
    }

    pub fn supplements(&self) -> &[Box<dyn SupplementSource>] {
        &self.supplements
    }

    pub fn cities(&self) -> Option<&dyn CitySource> {
        self.cities.as_deref()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
