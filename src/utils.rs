use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

/// Canonical token for free-text categorical fields:
/// trims, drops commas, lowercases and joins whitespace runs with `_`.
/// `"Kericho, Kenya"` becomes `"kericho_kenya"`.
pub fn normalize_token(raw: &str) -> String {
    raw.replace(',', "")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Parses the `datetime` column of a daily export into a calendar date.
/// Accepts a bare date or a full timestamp, in which case the time is dropped.
pub fn parse_observation_date(value: &str) -> Result<NaiveDate, String> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt.date());
        }
    }
    Err(format!("Failed to parse '{}' as a calendar date", trimmed))
}

/// Location for files without a `name` column: the file stem up to the first digit,
/// so `Kericho, Kenya 2020-01-01 to 2020-12-31.csv` maps to `kericho_kenya`.
pub fn implicit_location(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix: String = stem.chars().take_while(|c| !c.is_ascii_digit()).collect();
    let token = normalize_token(&prefix);
    if token.is_empty() {
        normalize_token(&stem)
    } else {
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("Kericho, Kenya"), "kericho_kenya");
        assert_eq!(normalize_token("  Partially   cloudy "), "partially_cloudy");
        assert_eq!(normalize_token("Rain, Overcast"), "rain_overcast");
    }

    #[test]
    fn test_normalize_token_is_idempotent() {
        for raw in ["Kericho, Kenya", "Partially cloudy", "clear", "Nairobi  ,Kenya", ""] {
            let once = normalize_token(raw);
            assert_eq!(normalize_token(&once), once);
        }
    }

    #[test]
    fn test_parse_observation_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 21).unwrap();
        assert_eq!(parse_observation_date("2024-03-21").unwrap(), expected);
        assert_eq!(parse_observation_date("2024-03-21T00:00:00").unwrap(), expected);
        assert_eq!(parse_observation_date(" 2024-03-21 06:30:00 ").unwrap(), expected);
        assert!(parse_observation_date("21/03/2024").is_err());
        assert!(parse_observation_date("2024-02-30").is_err());
    }

    #[test]
    fn test_implicit_location() {
        let path = Path::new("/data/Kericho, Kenya 2020-01-01 to 2020-12-31.csv");
        assert_eq!(implicit_location(path), "kericho_kenya");
        assert_eq!(implicit_location(Path::new("nakuru.csv")), "nakuru");
        assert_eq!(implicit_location(Path::new("2021.csv")), "2021");
    }
}
