//! Crop advisories and suitability verdicts from historical daily weather.
//!
//! Weather CSV exports are loaded once into an immutable [`Dataset`]; every
//! query selects a window from it, aggregates, and compares the result with
//! static per-crop thresholds.

pub mod advisor;
pub mod aggregate;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod data_models;
pub mod dataset;
pub mod errors;
pub mod file_processor;
pub mod metrics;
pub mod parallel;
pub mod parsers;
pub mod recommend;
pub mod suitability;
pub mod utils;
pub mod validation;
pub mod window;

pub use aggregate::{aggregate, AggregateSummary, DayGrouping};
pub use catalog::{get_crop_threshold, get_crop_thresholds, CropThreshold, CropThresholdView};
pub use config::{load_config, AdvisorConfig};
pub use data_models::{Condition, Season, WeatherRecord};
pub use dataset::{Dataset, DatasetHandle};
pub use errors::{AdvisorError, ConfigError, ParseError};
pub use file_processor::{load_dataset, load_from_config};
pub use recommend::{recommend, Advisory, AdvisoryCategory};
pub use suitability::{is_suitable, season_scores, suitability_detail, SeasonSuitability};
pub use window::{select, WindowSpec};
