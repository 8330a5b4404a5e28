//! Day-level weather condition and season derivation.

use crate::data_models::{Condition, Season, WeatherRecord};

const RAIN_PRECIP_MM: f64 = 4.0;
const OVERCAST_CLOUDCOVER: f64 = 80.0;
const SUNNY_MAX_CLOUDCOVER: f64 = 15.0;
const SUNNY_MIN_SOLAR: f64 = 500.0;
const PARTIAL_CLOUDCOVER: f64 = 40.0;
const PARTIAL_HUMIDITY: f64 = 70.0;

/// Classifies a day into exactly one condition. Rules are checked in order and
/// the first match wins. A missing value never satisfies a comparison.
pub fn classify(record: &WeatherRecord) -> Condition {
    let gt = |v: Option<f64>, limit: f64| v.map_or(false, |x| x > limit);
    let lt = |v: Option<f64>, limit: f64| v.map_or(false, |x| x < limit);

    if gt(record.precip, RAIN_PRECIP_MM) {
        Condition::Rain
    } else if gt(record.cloudcover, OVERCAST_CLOUDCOVER) {
        Condition::Overcast
    } else if lt(record.cloudcover, SUNNY_MAX_CLOUDCOVER) && gt(record.solarradiation, SUNNY_MIN_SOLAR) {
        Condition::Sunny
    } else if gt(record.cloudcover, PARTIAL_CLOUDCOVER) || gt(record.humidity, PARTIAL_HUMIDITY) {
        Condition::PartiallyCloudy
    } else {
        Condition::Clear
    }
}

/// Maps a calendar month to its quarter. Months outside 1..=12 are clamped
/// into the nearest quarter; `chrono` never produces them.
pub fn season_for_month(month: u32) -> Season {
    match month {
        0..=3 => Season::Jfm,
        4..=6 => Season::Amj,
        7..=9 => Season::Jas,
        _ => Season::Ond,
    }
}
