//! Advisory rules comparing windowed averages with a crop's thresholds.
//!
//! The rule groups are independent: planting is one exclusive chain, the
//! irrigation, waterlogging, fertilization and harvesting groups each add
//! their own advisory on top.

use crate::aggregate::AggregateSummary;
use crate::catalog::{get_crop_threshold, CropThreshold};
use crate::errors::AdvisorError;
use serde::Serialize;
use std::fmt;

/// Precipitation (mm) on the latest day above which it counts as currently raining.
pub const RAINING_PRECIP_MM: f64 = 0.5;

const IRRIGATION_FRACTION: f64 = 0.5;
const SEVERE_WATERLOGGING_FACTOR: f64 = 1.2;
const MILD_WATERLOGGING_FRACTION: f64 = 0.5;
const FERTILIZER_MIN_TEMP: f64 = 10.0;
const FERTILIZER_MAX_TEMP: f64 = 29.0;
const FERTILIZER_MAX_AVG_PRECIP: f64 = 10.0;
const FERTILIZER_MAX_LATEST_PRECIP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryCategory {
    Planting,
    Irrigation,
    Waterlogging,
    Fertilization,
    Harvesting,
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub category: AdvisoryCategory,
    pub message: String,
}

impl Advisory {
    fn new(category: AdvisoryCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub fn is_raining(latest_precip: f64) -> bool {
    latest_precip > RAINING_PRECIP_MM
}

/// Runs every rule group in order and returns the advisories that fired.
///
/// Fails with `IncompleteData` if the summary has no temperature,
/// precipitation or humidity average.
pub fn recommend(
    summary: &AggregateSummary,
    threshold: &CropThreshold,
    latest_precip: f64,
) -> Result<Vec<Advisory>, AdvisorError> {
    let avg_temp = AggregateSummary::require(summary.avg_temp, "avg_temp")?;
    let avg_precip = AggregateSummary::require(summary.avg_precip, "avg_precip")?;
    let avg_humidity = AggregateSummary::require(summary.avg_humidity, "avg_humidity")?;
    let raining = is_raining(latest_precip);
    let crop = threshold.name;

    let mut advisories = Vec::new();

    // Planting
    if avg_precip > threshold.max_precip {
        advisories.push(Advisory::new(
            AdvisoryCategory::Planting,
            format!("High average rain, good for planting {}.", crop),
        ));
    } else if avg_temp >= threshold.min_temp
        && threshold.min_precip <= avg_precip
        && avg_precip <= threshold.max_precip
    {
        advisories.push(Advisory::new(
            AdvisoryCategory::Planting,
            format!("Good conditions for planting {}.", crop),
        ));
    } else if avg_temp < threshold.min_temp {
        advisories.push(Advisory::new(
            AdvisoryCategory::Planting,
            format!(
                "Temperature too low for planting {} ({:.1}°C, needs at least {:.1}°C).",
                crop, avg_temp, threshold.min_temp
            ),
        ));
    } else if avg_precip < threshold.min_precip {
        let message = if raining {
            format!("Rainfall is below what {} needs, but it is currently raining. Monitor soil moisture before planting.", crop)
        } else {
            format!("Rainfall is below what {} needs. Irrigation may be needed before planting.", crop)
        };
        advisories.push(Advisory::new(AdvisoryCategory::Planting, message));
    }

    // Irrigation
    if avg_precip < IRRIGATION_FRACTION * threshold.min_precip {
        let message = if raining {
            "Very low average rainfall, but it is currently raining. Hold irrigation and re-check after the rain."
        } else {
            "Very low average rainfall. Apply irrigation."
        };
        advisories.push(Advisory::new(AdvisoryCategory::Irrigation, message));
    }

    // Waterlogging
    if avg_precip > SEVERE_WATERLOGGING_FACTOR * threshold.max_precip {
        advisories.push(Advisory::new(
            AdvisoryCategory::Waterlogging,
            "Severe excess rainfall. High risk of waterlogging, ensure fields drain.",
        ));
    } else if latest_precip > MILD_WATERLOGGING_FRACTION * threshold.max_precip {
        advisories.push(Advisory::new(
            AdvisoryCategory::Waterlogging,
            "Heavy recent rain. Monitor fields for waterlogging.",
        ));
    }

    // Fertilization
    let fertilizer_window = (FERTILIZER_MIN_TEMP..=FERTILIZER_MAX_TEMP).contains(&avg_temp)
        && avg_precip < FERTILIZER_MAX_AVG_PRECIP;
    if fertilizer_window && latest_precip < FERTILIZER_MAX_LATEST_PRECIP && !raining {
        advisories.push(Advisory::new(
            AdvisoryCategory::Fertilization,
            "Conditions favour applying fertilizer.",
        ));
    } else if fertilizer_window && raining {
        advisories.push(Advisory::new(
            AdvisoryCategory::Fertilization,
            "It is currently raining. Defer fertilizer application until the rain stops to avoid run-off.",
        ));
    }

    // Harvesting
    if avg_precip <= threshold.min_precip && avg_humidity <= threshold.max_humidity {
        advisories.push(Advisory::new(
            AdvisoryCategory::Harvesting,
            format!("Good conditions for harvesting {}.", crop),
        ));
    }

    if advisories.is_empty() {
        advisories.push(Advisory::new(
            AdvisoryCategory::General,
            format!("No specific recommendation for {} in this period.", crop),
        ));
    }

    Ok(advisories)
}

/// `recommend` with the crop looked up by name.
pub fn recommend_for_crop(
    summary: &AggregateSummary,
    crop: &str,
    latest_precip: f64,
) -> Result<Vec<Advisory>, AdvisorError> {
    let threshold = get_crop_threshold(crop)?;
    recommend(summary, threshold, latest_precip)
}
