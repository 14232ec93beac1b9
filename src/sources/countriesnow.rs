//! CountriesNow API client
//!
//! One client serves four roles: the capital listing (base source), per-country
//! flag lookups and city-total population (supplements), and the per-country
//! city listing.

use super::{
    into_outcome, BaseSource, CitySource, Envelope, FetchError, HttpClient, RawCityRow,
    SupplementSource,
};
use crate::services::normalizer::{clean_text, normalize_flag_url};
use crate::types::{
    CityPopulationEntry, CountryRecord, SourceOutcome, Supplement, SupplementMap,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Consecutive transport failures after which the flag stage gives up
const MAX_CONSECUTIVE_FLAG_FAILURES: usize = 3;

/// Run of back-to-back transport failures; any other answer ends the run
#[derive(Debug, Default)]
struct TransportStreak {
    count: usize,
}

impl TransportStreak {
    /// Record one lookup, returning true once the streak limit is reached
    fn observe(&mut self, error: Option<&FetchError>) -> bool {
        match error {
            Some(e) if e.is_transport() => self.count += 1,
            _ => self.count = 0,
        }
        self.count >= MAX_CONSECUTIVE_FLAG_FAILURES
    }
}

#[derive(Debug, Deserialize)]
struct CapitalRow {
    name: Option<String>,
    capital: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FlagRow {
    name: Option<String>,
    flag: Option<String>,
    png: Option<String>,
}

impl FlagRow {
    /// `flag` takes precedence over `png`
    fn url(&self) -> Option<String> {
        self.flag
            .as_deref()
            .or(self.png.as_deref())
            .and_then(normalize_flag_url)
    }
}

/// Flag endpoint answers with one object or, for batch queries, a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlagData {
    Many(Vec<FlagRow>),
    One(FlagRow),
}

#[derive(Serialize)]
struct CountryQuery<'a> {
    country: &'a str,
}

/// Client for `https://countriesnow.space/api/v0.1`
#[derive(Clone)]
pub struct CountriesNowClient {
    http: HttpClient,
    base_url: String,
}

impl CountriesNowClient {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Flag supplement view of this client
    pub fn flags(&self) -> FlagSupplement {
        FlagSupplement {
            client: self.clone(),
        }
    }

    /// City-total population supplement view of this client
    pub fn city_totals(&self) -> CityTotalsSupplement {
        CityTotalsSupplement {
            client: self.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn fetch_capitals(&self) -> Result<Vec<CountryRecord>, FetchError> {
        let envelope: Envelope<Vec<CapitalRow>> =
            self.http.get_json(&self.url("/countries/capital"))?;
        let rows = envelope
            .data
            .ok_or_else(|| FetchError::Decode("missing `data` list".into()))?;

        // Blank names stay blank here; the merger drops them
        Ok(rows
            .into_iter()
            .map(|row| CountryRecord {
                name: clean_text(row.name.as_deref()).unwrap_or_default(),
                capital: clean_text(row.capital.as_deref()),
                ..Default::default()
            })
            .collect())
    }

    fn fetch_flag(&self, country: &str) -> Result<Option<String>, FetchError> {
        let envelope: Envelope<FlagData> = self
            .http
            .post_json(&self.url("/countries/flag/images"), &CountryQuery { country })?;

        Ok(match envelope.data {
            None => None,
            Some(FlagData::One(row)) => row.url(),
            Some(FlagData::Many(rows)) => rows
                .iter()
                .find(|r| r.name.as_deref().map(str::trim) == Some(country))
                .and_then(FlagRow::url),
        })
    }

    fn fetch_all_cities(&self) -> Result<Vec<CityPopulationEntry>, FetchError> {
        let envelope: Envelope<Vec<RawCityRow>> = self
            .http
            .get_json(&self.url("/countries/population/cities"))?;
        let rows = envelope
            .data
            .ok_or_else(|| FetchError::Decode("missing `data` list".into()))?;
        Ok(rows.into_iter().filter_map(RawCityRow::into_entry).collect())
    }

    fn fetch_country_cities(&self, country: &str) -> Result<Vec<CityPopulationEntry>, FetchError> {
        let result: Result<Envelope<Vec<RawCityRow>>, FetchError> = self.http.post_json(
            &self.url("/countries/population/cities/filter"),
            &CountryQuery { country },
        );

        match result {
            Ok(envelope) => Ok(envelope
                .data
                .unwrap_or_default()
                .into_iter()
                .filter_map(RawCityRow::into_entry)
                .collect()),
            // Unknown country is reported as 404: no data, not a failure
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

impl BaseSource for CountriesNowClient {
    fn name(&self) -> &str {
        "countriesnow-capitals"
    }

    fn fetch_base(&self) -> SourceOutcome<Vec<CountryRecord>> {
        into_outcome(BaseSource::name(self), self.fetch_capitals())
    }
}

impl CitySource for CountriesNowClient {
    fn name(&self) -> &str {
        "countriesnow-cities"
    }

    fn fetch_cities(&self, country: &str) -> SourceOutcome<Vec<CityPopulationEntry>> {
        into_outcome(CitySource::name(self), self.fetch_country_cities(country))
    }
}

/// Per-country flag lookups (one request per country, sequential)
pub struct FlagSupplement {
    client: CountriesNowClient,
}

impl SupplementSource for FlagSupplement {
    fn name(&self) -> &str {
        "countriesnow-flags"
    }

    fn fetch_supplement(&self, names: &[String]) -> SourceOutcome<SupplementMap> {
        let mut flags = SupplementMap::new();
        let mut streak = TransportStreak::default();

        for name in names {
            match self.client.fetch_flag(name) {
                Ok(found) => {
                    streak.observe(None);
                    if let Some(url) = found {
                        flags.insert(name.clone(), Supplement::flag(url));
                    }
                }
                Err(e) => {
                    tracing::debug!(country = %name, error = %e, "flag lookup failed");
                    if streak.observe(Some(&e)) {
                        tracing::warn!(
                            source = self.name(),
                            error = %e,
                            fetched = flags.len(),
                            "flag source unreachable, skipping remaining countries"
                        );
                        if flags.is_empty() {
                            return SourceOutcome::unavailable(self.name(), e.to_string());
                        }
                        break;
                    }
                }
            }
        }

        SourceOutcome::Available(flags)
    }
}

/// Country population approximated by summing each city's latest count
pub struct CityTotalsSupplement {
    client: CountriesNowClient,
}

/// Sum the latest observation of every city, per country
pub(crate) fn sum_latest_by_country(
    entries: &[CityPopulationEntry],
    wanted: Option<&HashSet<&str>>,
) -> SupplementMap {
    let mut totals = SupplementMap::new();
    for entry in entries {
        if wanted.is_some_and(|w| !w.contains(entry.country.as_str())) {
            continue;
        }
        let Some(latest) = entry.latest() else {
            continue;
        };
        let slot = totals
            .entry(entry.country.clone())
            .or_insert_with(|| Supplement::population(0));
        slot.population = Some(slot.population.unwrap_or(0).saturating_add(latest.value));
    }
    totals
}

impl SupplementSource for CityTotalsSupplement {
    fn name(&self) -> &str {
        "countriesnow-city-totals"
    }

    fn fetch_supplement(&self, names: &[String]) -> SourceOutcome<SupplementMap> {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        into_outcome(
            self.name(),
            self.client
                .fetch_all_cities()
                .map(|entries| sum_latest_by_country(&entries, Some(&wanted))),
        )
    }
}
