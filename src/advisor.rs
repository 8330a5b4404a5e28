//! Query entry points. Each call takes the dataset by reference, builds its
//! own local selections and returns a serializable report.

use crate::aggregate::{aggregate, daily_series, latest_precip, AggregateSummary, DayGrouping, DayKey};
use crate::catalog::{get_crop_threshold, get_crop_thresholds, CropThreshold, CropThresholdView};
use crate::data_models::{Condition, WeatherRecord};
use crate::dataset::{Dataset, LocationCoverage};
use crate::errors::AdvisorError;
use crate::metrics::METRICS;
use crate::recommend::{is_raining, recommend, Advisory};
use crate::suitability::{season_scores, SeasonSuitability};
use crate::utils::normalize_token;
use crate::window::{select, WindowSpec};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub record_count: usize,
}

/// Window means rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Averages {
    pub temp: Option<f64>,
    pub tempmax: Option<f64>,
    pub tempmin: Option<f64>,
    pub precip: Option<f64>,
    pub humidity: Option<f64>,
    pub solarradiation: Option<f64>,
    pub windspeed: Option<f64>,
}

impl From<&AggregateSummary> for Averages {
    fn from(s: &AggregateSummary) -> Self {
        Self {
            temp: round1(s.avg_temp),
            tempmax: round1(s.avg_tempmax),
            tempmin: round1(s.avg_tempmin),
            precip: round1(s.avg_precip),
            humidity: round1(s.avg_humidity),
            solarradiation: round1(s.avg_solarradiation),
            windspeed: round1(s.avg_windspeed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub crop: CropThresholdView,
    pub window: String,
    pub period: Period,
    pub averages: Averages,
    pub most_frequent_condition: Condition,
    pub latest_precip: f64,
    pub raining: bool,
    pub advisories: Vec<Advisory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuitabilityReport {
    pub crop: CropThresholdView,
    pub location: String,
    pub min_score: f64,
    pub suitable: bool,
    pub seasons: Vec<SeasonSuitability>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropVerdict {
    pub crop: String,
    pub suitable: bool,
    pub suitable_seasons: usize,
    pub best_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    pub day: DayKey,
    pub record_count: usize,
    pub averages: Averages,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub window: String,
    pub grouping: DayGrouping,
    pub days: Vec<ForecastDay>,
}

fn round1(value: Option<f64>) -> Option<f64> {
    value.map(|v| (v * 10.0).round() / 10.0)
}

fn no_data() -> AdvisorError {
    AdvisorError::EmptyInput("no data for requested period".to_string())
}

/// Counts the query outcome and passes the result through.
fn track<T>(operation: &str, result: Result<T, AdvisorError>) -> Result<T, AdvisorError> {
    if let Err(e) = &result {
        warn!("{} failed: {}", operation, e);
    }
    METRICS.lock().record_query(result.is_ok());
    result
}

/// Aggregates the window and runs the advisory rules for `crop`.
pub fn recommendation_report(
    dataset: &Dataset,
    spec: &WindowSpec,
    crop: &str,
) -> Result<RecommendationReport, AdvisorError> {
    track("recommendation_report", build_recommendation(dataset, spec, crop))
}

fn build_recommendation(dataset: &Dataset, spec: &WindowSpec, crop: &str) -> Result<RecommendationReport, AdvisorError> {
    let threshold = get_crop_threshold(crop)?;
    let records = select(dataset, spec)?;
    if records.is_empty() {
        return Err(no_data());
    }

    let summary = aggregate(&records)?;
    let latest = latest_precip(&records);
    let advisories = recommend(&summary, threshold, latest)?;
    debug!(
        "{} advisories for {} over {} records",
        advisories.len(),
        threshold.name,
        summary.record_count
    );

    Ok(RecommendationReport {
        crop: CropThresholdView::from(threshold),
        window: spec.describe(),
        period: Period {
            start_date: summary.start_date,
            end_date: summary.end_date,
            record_count: summary.record_count,
        },
        averages: Averages::from(&summary),
        most_frequent_condition: summary.most_frequent_condition,
        latest_precip: latest,
        raining: is_raining(latest),
        advisories,
    })
}

/// Recommendation over the last `days` days at `location`. Without `end`
/// the window closes on the location's latest observation.
///
/// Location names are normalized, so `"Kericho, Kenya"` finds `kericho_kenya`.
pub fn recent_advisory(
    dataset: &Dataset,
    location: &str,
    end: Option<NaiveDate>,
    days: i64,
    crop: &str,
) -> Result<RecommendationReport, AdvisorError> {
    let location = normalize_token(location);
    let spec = match end {
        Some(end) => Ok(WindowSpec::rolling(end, days).at_location(location.as_str())),
        None => last_observation(dataset, &location)
            .map(|end| WindowSpec::rolling(end, days).at_location(location.as_str())),
    };
    match spec {
        Ok(spec) => recommendation_report(dataset, &spec, crop),
        Err(e) => track("recent_advisory", Err(e)),
    }
}

fn last_observation(dataset: &Dataset, location: &str) -> Result<NaiveDate, AdvisorError> {
    dataset
        .records()
        .iter()
        .rev()
        .find(|r| r.location == location)
        .map(|r| r.date)
        .ok_or_else(|| AdvisorError::UnknownLocation(location.to_string()))
}

/// Whether `crop` has ever had a qualifying season at `location`.
pub fn crop_suitability(
    dataset: &Dataset,
    location: &str,
    crop: &str,
    min_score: f64,
) -> Result<SuitabilityReport, AdvisorError> {
    let location = normalize_token(location);
    track(
        "crop_suitability",
        location_records(dataset, &location).and_then(|records| {
            let threshold = get_crop_threshold(crop)?;
            Ok(suitability_for(&records, threshold, &location, min_score))
        }),
    )
}

fn suitability_for(
    records: &[&WeatherRecord],
    threshold: &CropThreshold,
    location: &str,
    min_score: f64,
) -> SuitabilityReport {
    let seasons = season_scores(records, threshold, min_score);
    SuitabilityReport {
        crop: CropThresholdView::from(threshold),
        location: location.to_string(),
        min_score,
        suitable: seasons.iter().any(|s| s.suitable),
        seasons,
    }
}

fn location_records<'a>(dataset: &'a Dataset, location: &str) -> Result<Vec<&'a WeatherRecord>, AdvisorError> {
    let records = select(dataset, &WindowSpec::location(location))?;
    if records.is_empty() {
        return Err(no_data());
    }
    Ok(records)
}

/// Verdict for every catalog crop at `location`, in catalog order.
pub fn suitable_crops(dataset: &Dataset, location: &str, min_score: f64) -> Result<Vec<CropVerdict>, AdvisorError> {
    let location = normalize_token(location);
    track(
        "suitable_crops",
        location_records(dataset, &location).map(|records| {
            get_crop_thresholds()
                .iter()
                .map(|threshold| {
                    let report = suitability_for(&records, threshold, &location, min_score);
                    CropVerdict {
                        crop: threshold.name.to_string(),
                        suitable: report.suitable,
                        suitable_seasons: report.seasons.iter().filter(|s| s.suitable).count(),
                        best_score: report.seasons.iter().map(|s| s.best_score).fold(0.0, f64::max),
                    }
                })
                .collect()
        }),
    )
}

/// Per-day averages over the window.
pub fn forecast(dataset: &Dataset, spec: &WindowSpec, grouping: DayGrouping) -> Result<ForecastReport, AdvisorError> {
    track("forecast", build_forecast(dataset, spec, grouping))
}

fn build_forecast(dataset: &Dataset, spec: &WindowSpec, grouping: DayGrouping) -> Result<ForecastReport, AdvisorError> {
    let records = select(dataset, spec)?;
    if records.is_empty() {
        return Err(no_data());
    }
    let days = daily_series(&records, grouping)?
        .into_iter()
        .map(|d| ForecastDay {
            day: d.day,
            record_count: d.summary.record_count,
            averages: Averages::from(&d.summary),
            condition: d.summary.most_frequent_condition,
        })
        .collect();

    Ok(ForecastReport {
        window: spec.describe(),
        grouping,
        days,
    })
}

pub fn location_summary(dataset: &Dataset) -> Vec<LocationCoverage> {
    METRICS.lock().record_query(true);
    dataset.coverage()
}
