//! Field normalization service
//!
//! Normalizes names, flag URLs and population numbers coming from
//! differently-shaped upstream APIs so the merger sees one canonical form.

/// Case-insensitive lookup key for a country name.
///
/// Used for `get_by_name`, `search` and the `country:{name}` cache key.
/// Merging itself still joins on the exact base-source string.
///
/// # Examples
/// ```
/// use countrypop::services::normalizer::name_key;
///
/// assert_eq!(name_key("  France "), "france");
/// assert_eq!(name_key("FRANCE"), "france");
/// ```
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trim a raw name or text field, treating blank values as absent.
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalize a flag URL.
///
/// Transformations:
/// - Strip escaping backslashes: `"https:\/\/x.png"` → `"https://x.png"`
/// - Trim whitespace
/// - Upgrade protocol-relative URLs: `"//x.png"` → `"https://x.png"`
pub fn normalize_flag_url(raw: &str) -> Option<String> {
    let cleaned = raw.replace('\\', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    if cleaned.starts_with("//") {
        return Some(format!("https:{}", cleaned));
    }
    Some(cleaned.to_string())
}

/// Parse a population number that may carry thousands separators.
///
/// Returns `None` for anything that is not a non-negative integer once
/// `,` separators and surrounding whitespace are removed.
///
/// # Examples
/// ```
/// use countrypop::services::normalizer::parse_population_text;
///
/// assert_eq!(parse_population_text("1,234,567"), Some(1_234_567));
/// assert_eq!(parse_population_text("n/a"), None);
/// ```
pub fn parse_population_text(raw: &str) -> Option<u64> {
    let digits: String = raw.trim().chars().filter(|&c| c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Convert a JSON float population into an integer count.
pub fn population_from_f64(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value <= u64::MAX as f64 {
        Some(value.round() as u64)
    } else {
        None
    }
}
