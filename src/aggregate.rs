//! Summary statistics over a window of daily records.

use crate::data_models::{Condition, WeatherRecord};
use crate::errors::AdvisorError;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Means over a window. A field is `None` when no record in the window has a value for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub record_count: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub avg_temp: Option<f64>,
    pub avg_tempmax: Option<f64>,
    pub avg_tempmin: Option<f64>,
    pub avg_precip: Option<f64>,
    pub avg_humidity: Option<f64>,
    pub avg_solarradiation: Option<f64>,
    pub avg_windspeed: Option<f64>,
    pub most_frequent_condition: Condition,
}

impl AggregateSummary {
    /// Returns a mean that downstream rules cannot do without.
    pub fn require(value: Option<f64>, field: &str) -> Result<f64, AdvisorError> {
        value.ok_or_else(|| AdvisorError::IncompleteData {
            field: field.to_string(),
        })
    }
}

/// How `daily_series` buckets records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayGrouping {
    /// Day number within the month, pooling every year in the window.
    DayOfMonth,
    /// Exact calendar date, pooling locations.
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum DayKey {
    DayOfMonth(u32),
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub day: DayKey,
    #[serde(flatten)]
    pub summary: AggregateSummary,
}

/// Averages every numeric field over `records`.
pub fn aggregate(records: &[&WeatherRecord]) -> Result<AggregateSummary, AdvisorError> {
    let most_frequent_condition = most_frequent_condition(records)
        .ok_or_else(|| AdvisorError::EmptyInput("cannot aggregate zero records".to_string()))?;

    // Non-empty from here on.
    let first = records[0].date;
    let (start_date, end_date) = records
        .iter()
        .fold((first, first), |(lo, hi), r| (lo.min(r.date), hi.max(r.date)));

    Ok(AggregateSummary {
        record_count: records.len(),
        start_date,
        end_date,
        avg_temp: mean(records, |r| r.temp),
        avg_tempmax: mean(records, |r| r.tempmax),
        avg_tempmin: mean(records, |r| r.tempmin),
        avg_precip: mean(records, |r| r.precip),
        avg_humidity: mean(records, |r| r.humidity),
        avg_solarradiation: mean(records, |r| r.solarradiation),
        avg_windspeed: mean(records, |r| r.windspeed),
        most_frequent_condition,
    })
}

fn mean<F>(records: &[&WeatherRecord], field: F) -> Option<f64>
where
    F: Fn(&WeatherRecord) -> Option<f64>,
{
    let (sum, count) = records
        .iter()
        .filter_map(|r| field(r))
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Most common condition; ties go to the condition seen first.
pub fn most_frequent_condition(records: &[&WeatherRecord]) -> Option<Condition> {
    let mut counts: Vec<(Condition, usize)> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|(c, _)| *c == record.condition) {
            Some((_, n)) => *n += 1,
            None => counts.push((record.condition, 1)),
        }
    }

    let mut best: Option<(Condition, usize)> = None;
    for (condition, count) in counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((condition, count));
        }
    }
    best.map(|(condition, _)| condition)
}

/// Precipitation on the chronologically last day of the window, 0 when absent.
/// With several locations on that day the last one in iteration order is used.
pub fn latest_precip(records: &[&WeatherRecord]) -> f64 {
    let mut latest: Option<&WeatherRecord> = None;
    for record in records {
        if latest.map_or(true, |l| record.date >= l.date) {
            latest = Some(record);
        }
    }
    latest.and_then(|r| r.precip).unwrap_or(0.0)
}

/// One summary per day bucket, ordered by day.
pub fn daily_series(records: &[&WeatherRecord], grouping: DayGrouping) -> Result<Vec<DailySummary>, AdvisorError> {
    if records.is_empty() {
        return Err(AdvisorError::EmptyInput("cannot build a daily series from zero records".to_string()));
    }

    let mut groups: BTreeMap<DayKey, Vec<&WeatherRecord>> = BTreeMap::new();
    for record in records {
        let key = match grouping {
            DayGrouping::DayOfMonth => DayKey::DayOfMonth(record.date.day()),
            DayGrouping::Date => DayKey::Date(record.date),
        };
        groups.entry(key).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(day, group)| Ok(DailySummary { day, summary: aggregate(&group)? }))
        .collect()
}
