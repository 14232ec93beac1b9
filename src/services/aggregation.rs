//! Country aggregation service
//!
//! Orchestrates the pipeline: cache lookup, base listing (first available
//! base source wins), supplement fan-out, merge, cache store. Per-source
//! failures degrade to missing fields; only a total base failure is fatal.

use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;

use super::cache::TtlCache;
use super::merger::{MergePolicy, Merger};
use super::normalizer::name_key;
use super::visualization::visualize;
use crate::config::AppConfig;
use crate::sources::SourceRegistry;
use crate::types::{
    CityPopulationEntry, CountryError, CountryRecord, Result, SourceOutcome, SupplementMap,
    VisualizationDatum,
};

const ALL_COUNTRIES_KEY: &str = "all-countries";
const POPULATION_DATA_KEY: &str = "population-data";

fn country_key(name: &str) -> String {
    format!("country:{}", name_key(name))
}

/// Pipeline tuning independent of which sources are registered
#[derive(Debug, Clone, Copy)]
pub struct AggregationOptions {
    pub policy: MergePolicy,
    /// Fetch supplements as parallel tasks joined before the merge
    pub parallel_fanout: bool,
    /// `None` keeps cached results for the service lifetime
    pub cache_ttl: Option<Duration>,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            policy: MergePolicy::default(),
            parallel_fanout: true,
            cache_ttl: Some(Duration::from_secs(3600)),
        }
    }
}

impl From<&AppConfig> for AggregationOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            policy: MergePolicy {
                require_population: config.require_population,
            },
            parallel_fanout: config.parallel_fanout,
            cache_ttl: config.cache_ttl(),
        }
    }
}

/// Value computed from one country-list snapshot
#[derive(Clone)]
struct Derived<T> {
    snapshot: Arc<Vec<CountryRecord>>,
    value: T,
}

/// Aggregation service exposing the country query operations
pub struct AggregationService {
    registry: SourceRegistry,
    options: AggregationOptions,
    countries: TtlCache<Arc<Vec<CountryRecord>>>,
    lookups: TtlCache<Derived<CountryRecord>>,
    visualization: TtlCache<Derived<Arc<Vec<VisualizationDatum>>>>,
}

impl AggregationService {
    pub fn new(registry: SourceRegistry, options: AggregationOptions) -> Self {
        Self {
            registry,
            options,
            countries: TtlCache::new(options.cache_ttl),
            lookups: TtlCache::new(options.cache_ttl),
            visualization: TtlCache::new(options.cache_ttl),
        }
    }

    /// Build the service with the source line-up of the configured profile
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let registry = SourceRegistry::from_config(config)?;
        Ok(Self::new(registry, AggregationOptions::from(config)))
    }

    /// All countries, merged and sorted by name.
    ///
    /// Fails with `AllSourcesFailed` only when every base source failed.
    pub fn list_all(&self) -> Result<Arc<Vec<CountryRecord>>> {
        self.countries.get_or_compute(ALL_COUNTRIES_KEY, || {
            let countries = Arc::new(self.aggregate()?);
            // Entries derived from the previous list are stale now
            self.lookups.clear();
            self.visualization.clear();
            Ok(countries)
        })
    }

    /// Country by case-insensitive name
    pub fn get_by_name(&self, name: &str) -> Result<CountryRecord> {
        let key = name_key(name);
        if key.is_empty() {
            return Err(CountryError::NotFound(name.to_string()));
        }

        let countries = self.list_all()?;
        derive(&self.lookups, &country_key(name), &countries, |list| {
            list.iter()
                .find(|record| name_key(&record.name) == key)
                .cloned()
                .ok_or_else(|| CountryError::NotFound(name.trim().to_string()))
        })
    }

    /// Countries whose name contains `query` (case-insensitive)
    pub fn search(&self, query: &str) -> Result<Vec<CountryRecord>> {
        let needle = name_key(query);
        Ok(self
            .list_all()?
            .iter()
            .filter(|record| record.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    /// Raw city population series for `country`.
    ///
    /// Empty when the upstream has no data for that country; an unreachable
    /// upstream is `UpstreamUnavailable`.
    pub fn get_city_populations(&self, country: &str) -> Result<Vec<CityPopulationEntry>> {
        let country = country.trim();
        let Some(source) = self.registry.cities() else {
            return Ok(Vec::new());
        };
        if country.is_empty() {
            return Ok(Vec::new());
        }
        source.fetch_cities(country).into_result()
    }

    /// Per-country population datum with density and map color
    pub fn get_visualization_data(&self) -> Result<Arc<Vec<VisualizationDatum>>> {
        let countries = self.list_all()?;
        derive(&self.visualization, POPULATION_DATA_KEY, &countries, |list| {
            Ok(Arc::new(list.iter().map(visualize).collect()))
        })
    }

    /// Drop every cached result so the next query re-aggregates
    pub fn invalidate(&self) {
        self.countries.clear();
        self.lookups.clear();
        self.visualization.clear();
    }

    fn aggregate(&self) -> Result<Vec<CountryRecord>> {
        let base = self.fetch_base()?;
        let names: Vec<String> = base
            .iter()
            .filter(|r| !r.name.is_empty())
            .map(|r| r.name.clone())
            .collect();

        let supplements = self.fetch_supplements(&names);
        let merged = Merger::merge(base, &supplements, self.options.policy);

        tracing::info!(
            countries = merged.len(),
            supplements = supplements.len(),
            "aggregation complete"
        );
        Ok(merged)
    }

    /// First available base source wins
    fn fetch_base(&self) -> Result<Vec<CountryRecord>> {
        let mut failures = Vec::new();

        for source in self.registry.base_sources() {
            match source.fetch_base() {
                SourceOutcome::Available(records) => {
                    if !failures.is_empty() {
                        tracing::info!(source = source.name(), "using fallback base source");
                    }
                    return Ok(records);
                }
                SourceOutcome::Unavailable { source: name, reason } => {
                    failures.push(format!("{}: {}", name, reason));
                }
            }
        }

        if failures.is_empty() {
            return Err(CountryError::AllSourcesFailed(
                "no base source configured".into(),
            ));
        }
        Err(CountryError::AllSourcesFailed(failures.join("; ")))
    }

    /// One map per registered supplement, in registration order.
    ///
    /// An unavailable supplement contributes an empty map, leaving its
    /// fields unset.
    fn fetch_supplements(&self, names: &[String]) -> Vec<SupplementMap> {
        let supplements = self.registry.supplements();

        let outcomes: Vec<SourceOutcome<SupplementMap>> = if self.options.parallel_fanout {
            supplements
                .par_iter()
                .map(|source| source.fetch_supplement(names))
                .collect()
        } else {
            supplements
                .iter()
                .map(|source| source.fetch_supplement(names))
                .collect()
        };

        tracing::debug!(
            available = outcomes.iter().filter(|o| o.is_available()).count(),
            total = outcomes.len(),
            "supplement fan-out joined"
        );

        outcomes
            .into_iter()
            .map(|outcome| outcome.available().unwrap_or_default())
            .collect()
    }
}

/// Cached value for `key`, valid only while it was computed from `countries`
fn derive<T, F>(
    cache: &TtlCache<Derived<T>>,
    key: &str,
    countries: &Arc<Vec<CountryRecord>>,
    compute: F,
) -> Result<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&[CountryRecord]) -> Result<T>,
{
    if let Some(hit) = cache.get(key) {
        if Arc::ptr_eq(&hit.snapshot, countries) {
            return Ok(hit.value);
        }
        cache.invalidate(key);
    }

    let derived = cache.get_or_compute(key, || {
        Ok(Derived {
            snapshot: Arc::clone(countries),
            value: compute(countries.as_slice())?,
        })
    })?;
    if Arc::ptr_eq(&derived.snapshot, countries) {
        Ok(derived.value)
    } else {
        // Raced with a refresh that another caller derived from
        compute(countries.as_slice())
    }
}
