//! REST Countries API client
//!
//! Serves as the richest base source (name, capital, population, flag, region)
//! and as an extra-info supplement filling region/subregion/flag for records
//! that came from a sparser base source.

use super::{into_outcome, BaseSource, FetchError, HttpClient, RawNumber, SupplementSource};
use crate::services::normalizer::{clean_text, normalize_flag_url};
use crate::types::{CountryRecord, SourceOutcome, Supplement, SupplementMap};
use serde::Deserialize;

const ALL_FIELDS: &str = "name,capital,population,flags,region,subregion,area";
const EXTRA_INFO_FIELDS: &str = "name,flags,region,subregion";

#[derive(Debug, Deserialize)]
struct RestName {
    common: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestFlags {
    svg: Option<String>,
    png: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestCountry {
    name: Option<RestName>,
    #[serde(default)]
    capital: Vec<String>,
    population: Option<RawNumber>,
    flags: Option<RestFlags>,
    region: Option<String>,
    subregion: Option<String>,
}

impl RestCountry {
    fn common_name(&self) -> Option<String> {
        clean_text(self.name.as_ref()?.common.as_deref())
    }

    /// SVG preferred over PNG
    fn flag_url(&self) -> Option<String> {
        let flags = self.flags.as_ref()?;
        flags
            .svg
            .as_deref()
            .and_then(normalize_flag_url)
            .or_else(|| flags.png.as_deref().and_then(normalize_flag_url))
    }

    fn into_record(self) -> CountryRecord {
        CountryRecord {
            name: self.common_name().unwrap_or_default(),
            capital: self
                .capital
                .iter()
                .find_map(|c| clean_text(Some(c.as_str()))),
            flag_url: self.flag_url(),
            // Zero population is a placeholder, not a measurement
            population: self
                .population
                .as_ref()
                .and_then(RawNumber::to_population)
                .filter(|&p| p > 0),
            region: clean_text(self.region.as_deref()),
            subregion: clean_text(self.subregion.as_deref()),
        }
    }
}

/// Client for `https://restcountries.com/v3.1`
#[derive(Clone)]
pub struct RestCountriesClient {
    http: HttpClient,
    base_url: String,
}

impl RestCountriesClient {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Region/subregion/flag supplement view of this client
    pub fn extra_info(&self) -> RestCountriesExtraInfo {
        RestCountriesExtraInfo {
            client: self.clone(),
        }
    }

    fn fetch_all(&self, fields: &str) -> Result<Vec<RestCountry>, FetchError> {
        self.http
            .get_json(&format!("{}/all?fields={}", self.base_url, fields))
    }
}

impl BaseSource for RestCountriesClient {
    fn name(&self) -> &str {
        "restcountries"
    }

    fn fetch_base(&self) -> SourceOutcome<Vec<CountryRecord>> {
        let result = self
            .fetch_all(ALL_FIELDS)
            .map(|rows| rows.into_iter().map(RestCountry::into_record).collect());
        into_outcome(self.name(), result)
    }
}

/// REST Countries as a supplement: region, subregion and flag only
pub struct RestCountriesExtraInfo {
    client: RestCountriesClient,
}

impl SupplementSource for RestCountriesExtraInfo {
    fn name(&self) -> &str {
        "restcountries-extra-info"
    }

    fn fetch_supplement(&self, _names: &[String]) -> SourceOutcome<SupplementMap> {
        let result = self.client.fetch_all(EXTRA_INFO_FIELDS).map(|rows| {
            rows.into_iter()
                .filter_map(|row| {
                    let name = row.common_name()?;
                    let supplement = Supplement {
                        flag_url: row.flag_url(),
                        region: clean_text(row.region.as_deref()),
                        subregion: clean_text(row.subregion.as_deref()),
                        ..Default::default()
                    };
                    Some((name, supplement))
                })
                .collect()
        });
        into_outcome(self.name(), result)
    }
}
