//! Physical plausibility checks for loaded observations.
//!
//! Violations are reported to the caller, which logs them and keeps the row.

use crate::data_models::WeatherRecord;

/// Validates a loaded weather record.
///
/// Checks:
/// - humidity and cloud cover are percentages (0 to 100)
/// - precipitation, solar radiation and wind speed are non-negative
/// - the daily minimum does not exceed the daily maximum
///
/// Returns Ok(()) if valid, otherwise Err(String) describing the first violation.
pub fn validate_record(record: &WeatherRecord) -> Result<(), String> {
    validate_percentage("humidity", record.humidity)?;
    validate_percentage("cloudcover", record.cloudcover)?;
    validate_non_negative("precip", record.precip)?;
    validate_non_negative("solarradiation", record.solarradiation)?;
    validate_non_negative("windspeed", record.windspeed)?;

    if let (Some(min), Some(max)) = (record.tempmin, record.tempmax) {
        if min > max {
            return Err(format!(
                "Validation Error: tempmin ({}) above tempmax ({}) for {} on {}",
                min, max, record.location, record.date
            ));
        }
    }
    Ok(())
}

fn validate_percentage(field: &str, value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if !(0.0..=100.0).contains(&v) => Err(format!(
            "Validation Error: {} ({}) out of range (0 to 100)",
            field, v
        )),
        _ => Ok(()),
    }
}

fn validate_non_negative(field: &str, value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if v < 0.0 => Err(format!("Validation Error: {} ({}) is negative", field, v)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::test_support::record;

    #[test]
    fn test_valid_record_passes() {
        assert!(validate_record(&record("a", "2022-01-01", 18.0, 2.0, 65.0, 200.0)).is_ok());
    }

    #[test]
    fn test_humidity_out_of_range() {
        let err = validate_record(&record("a", "2022-01-01", 18.0, 2.0, 120.0, 200.0)).unwrap_err();
        assert!(err.contains("humidity"));
    }

    #[test]
    fn test_negative_precip() {
        let err = validate_record(&record("a", "2022-01-01", 18.0, -1.0, 60.0, 200.0)).unwrap_err();
        assert!(err.contains("precip"));
    }

    #[test]
    fn test_inverted_temperature_range() {
        let mut rec = record("a", "2022-01-01", 18.0, 1.0, 60.0, 200.0);
        rec.tempmin = Some(25.0);
        rec.tempmax = Some(12.0);
        assert!(validate_record(&rec).is_err());
    }
}
