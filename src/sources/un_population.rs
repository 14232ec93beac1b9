//! UN-style population-by-location client

use super::{
    into_outcome, latest_value, Envelope, FetchError, HttpClient, RawCount, RawNumber,
    SupplementSource,
};
use crate::services::normalizer::clean_text;
use crate::types::{SourceOutcome, Supplement, SupplementMap};
use serde::Deserialize;

/// `{location, value}` row; `{country, populationCounts}` rows are accepted too
#[derive(Debug, Deserialize)]
struct LocationRow {
    #[serde(alias = "country")]
    location: Option<String>,
    value: Option<RawNumber>,
    #[serde(rename = "populationCounts", default)]
    population_counts: Vec<RawCount>,
}

impl LocationRow {
    fn population(&self) -> Option<u64> {
        match &self.value {
            Some(value) => value.to_population(),
            None => latest_value(&self.population_counts),
        }
    }
}

/// Population supplement keyed by location name
pub struct UnPopulationClient {
    http: HttpClient,
    url: String,
}

impl UnPopulationClient {
    pub fn new(http: HttpClient, url: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
        }
    }

    fn fetch_populations(&self) -> Result<SupplementMap, FetchError> {
        let envelope: Envelope<Vec<LocationRow>> = self.http.get_json(&self.url)?;
        let rows = envelope
            .data
            .ok_or_else(|| FetchError::Decode("missing `data` list".into()))?;

        let mut map = SupplementMap::new();
        for row in rows {
            let Some(location) = clean_text(row.location.as_deref()) else {
                continue;
            };
            match row.population() {
                Some(population) => {
                    map.insert(location, Supplement::population(population));
                }
                None => tracing::debug!(%location, "unparseable population, field skipped"),
            }
        }
        Ok(map)
    }
}

impl SupplementSource for UnPopulationClient {
    fn name(&self) -> &str {
        "un-population"
    }

    fn fetch_supplement(&self, _names: &[String]) -> SourceOutcome<SupplementMap> {
        into_outcome(self.name(), self.fetch_populations())
    }
}
