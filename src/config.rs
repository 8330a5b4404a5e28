use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const DEFAULT_ROLLING_WINDOW_DAYS: i64 = 21;
pub const DEFAULT_MIN_MATCH_SCORE: f64 = 0.75;

/// Runtime settings for loading weather history and answering queries.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Glob matched against file names inside `data_dir`.
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
    #[serde(default = "default_rolling_window_days")]
    pub rolling_window_days: i64,
    /// Fraction of threshold criteria a single day must meet to count as suitable.
    #[serde(default = "default_min_match_score")]
    pub min_match_score: f64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./weather_data")
}

fn default_file_pattern() -> String {
    "*.csv".to_string()
}

fn default_rolling_window_days() -> i64 {
    DEFAULT_ROLLING_WINDOW_DAYS
}

fn default_min_match_score() -> f64 {
    DEFAULT_MIN_MATCH_SCORE
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_pattern: default_file_pattern(),
            rolling_window_days: default_rolling_window_days(),
            min_match_score: default_min_match_score(),
        }
    }
}

impl AdvisorConfig {
    /// Applies `CROP_ADVISOR_*` environment overrides on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("CROP_ADVISOR_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(pattern) = lookup("CROP_ADVISOR_FILE_PATTERN") {
            self.file_pattern = pattern;
        }
        if let Some(days) = lookup("CROP_ADVISOR_ROLLING_DAYS") {
            self.rolling_window_days = days.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "CROP_ADVISOR_ROLLING_DAYS".to_string(),
                message: format!("'{}' is not an integer", days),
            })?;
        }
        if let Some(score) = lookup("CROP_ADVISOR_MIN_MATCH_SCORE") {
            self.min_match_score = score.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "CROP_ADVISOR_MIN_MATCH_SCORE".to_string(),
                message: format!("'{}' is not a number", score),
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rolling_window_days < 1 {
            return Err(ConfigError::InvalidValue {
                field: "rolling_window_days".to_string(),
                message: format!("must be at least 1, got {}", self.rolling_window_days),
            });
        }
        if !(self.min_match_score > 0.0 && self.min_match_score <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "min_match_score".to_string(),
                message: format!("must be in (0, 1], got {}", self.min_match_score),
            });
        }
        glob::Pattern::new(&self.file_pattern).map_err(|e| ConfigError::InvalidValue {
            field: "file_pattern".to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// Loads the configuration from a JSON file. Missing keys fall back to defaults.
pub fn load_config(path: &Path) -> Result<AdvisorConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound { path: path.to_path_buf() });
    }

    let file = File::open(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let config: AdvisorConfig = serde_json::from_reader(reader).map_err(|e| ConfigError::JsonParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    config.validate()?;
    Ok(config)
}
