use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classifier::{classify, season_for_month};

/// Discrete weather condition derived for each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Rain,
    Overcast,
    Sunny,
    PartiallyCloudy,
    Clear,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::Rain,
        Condition::Overcast,
        Condition::Sunny,
        Condition::PartiallyCloudy,
        Condition::Clear,
    ];

    /// Normalized token, as produced by `utils::normalize_token` on the display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Rain => "rain",
            Condition::Overcast => "overcast",
            Condition::Sunny => "sunny",
            Condition::PartiallyCloudy => "partially_cloudy",
            Condition::Clear => "clear",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar quarter used to group observations into seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    #[serde(rename = "JFM")]
    Jfm,
    #[serde(rename = "AMJ")]
    Amj,
    #[serde(rename = "JAS")]
    Jas,
    #[serde(rename = "OND")]
    Ond,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Jfm => "JFM",
            Season::Amj => "AMJ",
            Season::Jas => "JAS",
            Season::Ond => "OND",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One CSV row as it appears in a daily weather export.
/// Extra columns in the file are ignored. The station comes from `name`,
/// falling back to `location`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWeatherRow {
    pub datetime: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub temp: Option<f64>,
    pub tempmax: Option<f64>,
    pub tempmin: Option<f64>,
    pub precip: Option<f64>,
    pub humidity: Option<f64>,
    pub solarradiation: Option<f64>,
    pub cloudcover: Option<f64>,
    pub windspeed: Option<f64>,
}

/// Raw measurements for one day. Blank cells stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Observation {
    pub temp: Option<f64>,
    pub tempmax: Option<f64>,
    pub tempmin: Option<f64>,
    pub precip: Option<f64>,
    pub humidity: Option<f64>,
    pub solarradiation: Option<f64>,
    pub cloudcover: Option<f64>,
    pub windspeed: Option<f64>,
}

impl From<&RawWeatherRow> for Observation {
    fn from(row: &RawWeatherRow) -> Self {
        Self {
            temp: row.temp,
            tempmax: row.tempmax,
            tempmin: row.tempmin,
            precip: row.precip,
            humidity: row.humidity,
            solarradiation: row.solarradiation,
            cloudcover: row.cloudcover,
            windspeed: row.windspeed,
        }
    }
}

/// A single enriched daily observation for one location.
/// Condition, season, year and month are derived once on construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub location: String,
    pub date: NaiveDate,
    pub temp: Option<f64>,
    pub tempmax: Option<f64>,
    pub tempmin: Option<f64>,
    pub precip: Option<f64>,
    pub humidity: Option<f64>,
    pub solarradiation: Option<f64>,
    pub cloudcover: Option<f64>,
    pub windspeed: Option<f64>,
    pub condition: Condition,
    pub season: Season,
    pub year: i32,
    pub month: u32,
}

impl WeatherRecord {
    /// `location` is expected to be an already normalized token.
    pub fn new(location: String, date: NaiveDate, obs: Observation) -> Self {
        let mut record = Self {
            location,
            date,
            temp: obs.temp,
            tempmax: obs.tempmax,
            tempmin: obs.tempmin,
            precip: obs.precip,
            humidity: obs.humidity,
            solarradiation: obs.solarradiation,
            cloudcover: obs.cloudcover,
            windspeed: obs.windspeed,
            condition: Condition::Clear,
            season: season_for_month(date.month()),
            year: date.year(),
            month: date.month(),
        };
        record.condition = classify(&record);
        record
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Builds a record with the four threshold fields set and everything else blank.
    pub fn record(location: &str, day: &str, temp: f64, precip: f64, humidity: f64, solar: f64) -> WeatherRecord {
        WeatherRecord::new(
            location.to_string(),
            date(day),
            Observation {
                temp: Some(temp),
                precip: Some(precip),
                humidity: Some(humidity),
                solarradiation: Some(solar),
                cloudcover: Some(50.0),
                ..Observation::default()
            },
        )
    }
}
