//! Static agronomic thresholds per crop.
//!
//! Values are daily-scale: temperature in °C, precipitation in mm/day,
//! relative humidity in %, solar radiation in W/m². Every band is compared
//! against means of daily records, so rainfall is a daily mean (tea's
//! 1100-2900 mm/yr becomes 3-8 mm/day) and humidity is a range rather than
//! a single ceiling.
//!
//! Tea and the two coffees are the East African highland crops the advisor
//! started with; their altitude bands are the usual growing belts (arabica
//! 1000-2100 m, robusta below 800 m). Maize, beans and potatoes are the
//! common rotation crops of the same smallholdings, with FAO crop-ecology
//! ranges scaled the same way.

use crate::errors::AdvisorError;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CropThreshold {
    pub name: &'static str,
    pub min_temp: f64,
    pub max_temp: f64,
    pub min_precip: f64,
    pub max_precip: f64,
    pub min_humidity: f64,
    pub max_humidity: f64,
    pub min_solarradiation: f64,
    pub max_solarradiation: f64,
    /// Suitable altitude band in metres.
    pub altitude_range: Option<(f64, f64)>,
    pub icon: Option<&'static str>,
}

static CROP_THRESHOLDS: [CropThreshold; 6] = [
    CropThreshold {
        name: "tea",
        min_temp: 13.0,
        max_temp: 25.0,
        min_precip: 3.0,
        max_precip: 8.0,
        min_humidity: 70.0,
        max_humidity: 90.0,
        min_solarradiation: 120.0,
        max_solarradiation: 250.0,
        altitude_range: Some((1500.0, 2700.0)),
        icon: Some("tea-leaf"),
    },
    CropThreshold {
        name: "coffee/arabica",
        min_temp: 18.0,
        max_temp: 24.0,
        min_precip: 4.0,
        max_precip: 6.0,
        min_humidity: 60.0,
        max_humidity: 80.0,
        min_solarradiation: 150.0,
        max_solarradiation: 250.0,
        altitude_range: Some((1000.0, 2100.0)),
        icon: Some("coffee-bean"),
    },
    CropThreshold {
        name: "coffee/robusta",
        min_temp: 24.0,
        max_temp: 30.0,
        min_precip: 5.0,
        max_precip: 8.0,
        min_humidity: 70.0,
        max_humidity: 90.0,
        min_solarradiation: 150.0,
        max_solarradiation: 280.0,
        altitude_range: Some((0.0, 800.0)),
        icon: Some("coffee-bean"),
    },
    CropThreshold {
        name: "maize",
        min_temp: 18.0,
        max_temp: 30.0,
        min_precip: 1.5,
        max_precip: 4.0,
        min_humidity: 50.0,
        max_humidity: 80.0,
        min_solarradiation: 180.0,
        max_solarradiation: 320.0,
        altitude_range: None,
        icon: Some("corn"),
    },
    CropThreshold {
        name: "beans",
        min_temp: 15.0,
        max_temp: 27.0,
        min_precip: 1.0,
        max_precip: 3.5,
        min_humidity: 40.0,
        max_humidity: 70.0,
        min_solarradiation: 150.0,
        max_solarradiation: 300.0,
        altitude_range: None,
        icon: Some("bean"),
    },
    CropThreshold {
        name: "potatoes",
        min_temp: 10.0,
        max_temp: 22.0,
        min_precip: 1.5,
        max_precip: 3.5,
        min_humidity: 60.0,
        max_humidity: 85.0,
        min_solarradiation: 120.0,
        max_solarradiation: 260.0,
        altitude_range: Some((1500.0, 3000.0)),
        icon: Some("potato"),
    },
];

static CROP_INDEX: Lazy<HashMap<&'static str, &'static CropThreshold>> =
    Lazy::new(|| CROP_THRESHOLDS.iter().map(|t| (t.name, t)).collect());

/// Every crop in the catalog, in display order.
pub fn get_crop_thresholds() -> &'static [CropThreshold] {
    &CROP_THRESHOLDS
}

/// Looks a crop up by name, ignoring case and surrounding whitespace.
pub fn get_crop_threshold(name: &str) -> Result<&'static CropThreshold, AdvisorError> {
    let key = name.trim().to_lowercase();
    CROP_INDEX
        .get(key.as_str())
        .copied()
        .ok_or_else(|| AdvisorError::UnknownCrop(name.trim().to_string()))
}

/// Serializable copy of a catalog entry for responses. Built on demand so
/// the catalog itself is never touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropThresholdView {
    pub name: String,
    pub min_temp: f64,
    pub max_temp: f64,
    pub min_precip: f64,
    pub max_precip: f64,
    pub min_humidity: f64,
    pub max_humidity: f64,
    pub min_solarradiation: f64,
    pub max_solarradiation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl From<&CropThreshold> for CropThresholdView {
    fn from(t: &CropThreshold) -> Self {
        Self {
            name: t.name.to_string(),
            min_temp: t.min_temp,
            max_temp: t.max_temp,
            min_precip: t.min_precip,
            max_precip: t.max_precip,
            min_humidity: t.min_humidity,
            max_humidity: t.max_humidity,
            min_solarradiation: t.min_solarradiation,
            max_solarradiation: t.max_solarradiation,
            altitude_range: t.altitude_range.map(|(lo, hi)| [lo, hi]),
            icon: t.icon.map(str::to_string),
        }
    }
}
