//! Merger service for combining base records with supplement data

use crate::types::{CountryRecord, Supplement, SupplementMap};

/// Record filtering policy applied after all supplements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergePolicy {
    /// Drop records whose population is still unknown after merging
    pub require_population: bool,
}

/// Merger for joining per-source country data by name
pub struct Merger;

impl Merger {
    /// Merge supplements into base records (sorted by name ascending).
    ///
    /// Supplements are applied in slice order. Lookup is an exact match on
    /// the base record's name; a country missing from a supplement keeps its
    /// current values. A supplement value only overwrites when it is present
    /// and not a placeholder (`None`, blank string, zero population).
    ///
    /// Sorting is byte-wise on `name` (case-sensitive, locale-naive).
    pub fn merge(
        base: Vec<CountryRecord>,
        supplements: &[SupplementMap],
        policy: MergePolicy,
    ) -> Vec<CountryRecord> {
        let mut merged: Vec<CountryRecord> = base
            .into_iter()
            .filter(|record| !record.name.trim().is_empty())
            .map(|mut record| {
                for supplement in supplements {
                    if let Some(fields) = supplement.get(&record.name) {
                        Self::apply(&mut record, fields);
                    }
                }
                record
            })
            .filter(|record| !policy.require_population || record.population.is_some())
            .collect();

        merged.sort_by(|a, b| a.name.cmp(&b.name));
        merged
    }

    /// Apply one supplement's non-placeholder fields onto `record`
    pub fn apply(record: &mut CountryRecord, fields: &Supplement) {
        overwrite_text(&mut record.capital, &fields.capital);
        overwrite_text(&mut record.flag_url, &fields.flag_url);
        overwrite_text(&mut record.region, &fields.region);
        overwrite_text(&mut record.subregion, &fields.subregion);
        if let Some(population) = fields.population.filter(|&p| p > 0) {
            record.population = Some(population);
        }
    }
}

fn overwrite_text(current: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming.as_deref().filter(|v| !v.trim().is_empty()) {
        *current = Some(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, capital: Option<&str>) -> CountryRecord {
        CountryRecord {
            name: name.to_string(),
            capital: capital.map(String::from),
            ..Default::default()
        }
    }

    fn map(entries: Vec<(&str, Supplement)>) -> SupplementMap {
        entries
            .into_iter()
            .map(|(name, s)| (name.to_string(), s))
            .collect()
    }

    // ========== field priority tests ==========

    #[test]
    fn test_merge_empty_inputs() {
        let result = Merger::merge(Vec::new(), &[], MergePolicy::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_last_non_placeholder_wins() {
        let base = vec![record("Testland", Some("Old Capital"))];
        let supplements = vec![
            map(vec![("Testland", Supplement::population(100))]),
            map(vec![("Testland", Supplement::population(200))]),
        ];

        let result = Merger::merge(base, &supplements, MergePolicy::default());

        assert_eq!(result[0].population, Some(200));
        assert_eq!(result[0].capital.as_deref(), Some("Old Capital"));
    }

    #[test]
    fn test_placeholder_does_not_overwrite() {
        let base = vec![record("Testland", Some("Test City"))];
        let supplements = vec![
            map(vec![(
                "Testland",
                Supplement {
                    population: Some(500),
                    flag_url: Some("https://f/t.svg".into()),
                    ..Default::default()
                },
            )]),
            map(vec![(
                "Testland",
                Supplement {
                    capital: Some("   ".into()),
                    population: Some(0),
                    flag_url: Some(String::new()),
                    ..Default::default()
                },
            )]),
        ];

        let result = Merger::merge(base, &supplements, MergePolicy::default());

        let merged = &result[0];
        assert_eq!(merged.capital.as_deref(), Some("Test City"));
        assert_eq!(merged.population, Some(500));
        assert_eq!(merged.flag_url.as_deref(), Some("https://f/t.svg"));
    }

    #[test]
    fn test_supplements_write_disjoint_fields() {
        let base = vec![record("France", Some("Paris"))];
        let supplements = vec![
            map(vec![("France", Supplement::population(67_000_000))]),
            map(vec![(
                "France",
                Supplement {
                    region: Some("Europe".into()),
                    subregion: Some("Western Europe".into()),
                    ..Default::default()
                },
            )]),
        ];

        let result = Merger::merge(base, &supplements, MergePolicy::default());

        assert_eq!(result[0].population, Some(67_000_000));
        assert_eq!(result[0].region.as_deref(), Some("Europe"));
        assert_eq!(result[0].subregion.as_deref(), Some("Western Europe"));
    }

    // ========== join key tests ==========

    #[test]
    fn test_missing_name_leaves_record_unchanged() {
        let base = vec![record("Testland", Some("Test City"))];
        let supplements = vec![map(vec![("Otherland", Supplement::population(9))])];

        let result = Merger::merge(base.clone(), &supplements, MergePolicy::default());

        assert_eq!(result, base);
    }

    #[test]
    fn test_join_is_exact_string_match() {
        let base = vec![record("Côte d'Ivoire", None)];
        let supplements = vec![map(vec![("Cote d'Ivoire", Supplement::population(9))])];

        let result = Merger::merge(base, &supplements, MergePolicy::default());

        assert_eq!(result[0].population, None);
    }

    // ========== filtering and ordering tests ==========

    #[test]
    fn test_blank_names_dropped() {
        let base = vec![record("", Some("X")), record("  ", None), record("A", None)];
        let result = Merger::merge(base, &[], MergePolicy::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "A");
    }

    #[test]
    fn test_require_population_drops_unknown() {
        let base = vec![record("Known", None), record("Unknown", None)];
        let supplements = vec![map(vec![("Known", Supplement::population(10))])];
        let policy = MergePolicy {
            require_population: true,
        };

        let result = Merger::merge(base, &supplements, policy);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Known");
    }

    #[test]
    fn test_sorted_byte_wise() {
        let base = vec![
            record("albania", None),
            record("Zambia", None),
            record("Brazil", None),
        ];
        let result = Merger::merge(base, &[], MergePolicy::default());
        let names: Vec<&str> = result.iter().map(|r| r.name.as_str()).collect();
        // Uppercase sorts before lowercase
        assert_eq!(names, vec!["Brazil", "Zambia", "albania"]);
    }
}
