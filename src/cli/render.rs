//! Plain-text rendering for terminal output

use std::fmt::Write;

use countrypop::types::{CityPopulationEntry, CountryRecord, VisualizationDatum};

const MISSING: &str = "-";

/// Format a number with thousand separators (e.g., 1234567 -> "1,234,567")
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);

    for (i, ch) in digits.bytes().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            out.push(',');
        }
        out.push(ch as char);
    }
    out
}

fn population_cell(population: Option<u64>) -> String {
    population.map_or_else(|| MISSING.to_string(), format_number)
}

fn width_of<'a>(header: &str, cells: impl Iterator<Item = &'a str>) -> usize {
    cells
        .map(|c| c.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0)
}

pub fn render_countries(countries: &[CountryRecord]) -> String {
    let name_w = width_of("NAME", countries.iter().map(|c| c.name.as_str()));
    let capital_w = width_of(
        "CAPITAL",
        countries
            .iter()
            .map(|c| c.capital.as_deref().unwrap_or(MISSING)),
    );

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<name_w$}  {:<capital_w$}  {:>15}",
        "NAME", "CAPITAL", "POPULATION"
    );
    for country in countries {
        let _ = writeln!(
            out,
            "{:<name_w$}  {:<capital_w$}  {:>15}",
            country.name,
            country.capital.as_deref().unwrap_or(MISSING),
            population_cell(country.population),
        );
    }
    let _ = writeln!(out, "\n{} countries", countries.len());
    out
}

pub fn render_country(country: &CountryRecord) -> String {
    let mut out = String::new();
    let fields = [
        ("Name", Some(country.name.clone())),
        ("Capital", country.capital.clone()),
        ("Population", country.population.map(format_number)),
        ("Flag", country.flag_url.clone()),
        ("Region", country.region.clone()),
        ("Subregion", country.subregion.clone()),
    ];
    for (label, value) in fields {
        let _ = writeln!(
            out,
            "{:<11} {}",
            format!("{label}:"),
            value.as_deref().unwrap_or(MISSING)
        );
    }
    out
}

/// One line per city with its latest observation
pub fn render_cities(country: &str, entries: &[CityPopulationEntry]) -> String {
    if entries.is_empty() {
        return format!("No city population data for {country}\n");
    }

    let city_w = width_of("CITY", entries.iter().map(|e| e.city.as_str()));
    let mut out = String::new();
    let _ = writeln!(out, "{:<city_w$}  {:>4}  {:>13}", "CITY", "YEAR", "POPULATION");
    for entry in entries {
        let (year, value) = match entry.latest() {
            Some(point) => (point.year.to_string(), format_number(point.value)),
            None => (MISSING.to_string(), MISSING.to_string()),
        };
        let _ = writeln!(out, "{:<city_w$}  {:>4}  {:>13}", entry.city, year, value);
    }
    out
}

pub fn render_visualization(data: &[VisualizationDatum]) -> String {
    let name_w = width_of("COUNTRY", data.iter().map(|d| d.country_name.as_str()));
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<4}  {:<name_w$}  {:>15}  {:>7}  COLOR",
        "CODE", "COUNTRY", "POPULATION", "DENSITY"
    );
    for datum in data {
        let _ = writeln!(
            out,
            "{:<4}  {:<name_w$}  {:>15}  {:>7.2}  {}",
            datum.country_code.as_deref().unwrap_or(MISSING),
            datum.country_name,
            format_number(datum.population),
            datum.density,
            datum.color_code,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use countrypop::types::PopulationSeriesPoint;

    // ========== format_number tests ==========

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0), "0");
    }

    #[test]
    fn test_format_number_small() {
        assert_eq!(format_number(999), "999");
    }

    #[test]
    fn test_format_number_large() {
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1000000), "1,000,000");
    }

    // ========== render tests ==========

    #[test]
    fn test_render_countries_marks_missing() {
        let countries = vec![
            CountryRecord {
                population: Some(67_750_000),
                ..CountryRecord::named("France").with_capital("Paris")
            },
            CountryRecord::named("Testland"),
        ];

        let out = render_countries(&countries);
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].starts_with("NAME"));
        assert!(lines[1].starts_with("France"));
        assert!(lines[1].ends_with("67,750,000"));
        assert!(lines[2].starts_with("Testland"));
        assert!(lines[2].ends_with('-'));
        assert!(out.contains("2 countries"));
    }

    #[test]
    fn test_render_country_lists_all_fields() {
        let out = render_country(&CountryRecord::named("Testland").with_capital("Test City"));
        assert!(out.contains("Name:       Testland"));
        assert!(out.contains("Capital:    Test City"));
        assert!(out.contains("Flag:       -"));
    }

    #[test]
    fn test_render_cities_uses_latest_point() {
        let entries = vec![CityPopulationEntry {
            city: "Test City".into(),
            country: "Testland".into(),
            population_counts: vec![
                PopulationSeriesPoint {
                    year: 2021,
                    value: 200,
                },
                PopulationSeriesPoint {
                    year: 2020,
                    value: 100,
                },
            ],
        }];

        let out = render_cities("Testland", &entries);

        assert!(out.lines().nth(1).unwrap().contains("2021"));
        assert!(out.lines().nth(1).unwrap().ends_with("200"));
    }

    #[test]
    fn test_render_cities_empty() {
        assert_eq!(
            render_cities("Nowhereland", &[]),
            "No city population data for Nowhereland\n"
        );
    }

    #[test]
    fn test_render_visualization() {
        let data = vec![VisualizationDatum {
            country_code: None,
            country_name: "Testland".into(),
            population: 0,
            density: 0.0,
            color_code: "#CCCCCC".into(),
        }];

        let out = render_visualization(&data);

        let row = out.lines().nth(1).unwrap();
        assert!(row.starts_with("-   "));
        assert!(row.contains("0.00"));
        assert!(row.ends_with("#CCCCCC"));
    }
}
