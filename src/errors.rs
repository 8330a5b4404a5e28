use chrono::NaiveDate;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse JSON configuration in {path}: {source}")]
    JsonParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Configuration file not found at {path}")]
    NotFound { path: PathBuf },
    #[error("Invalid configuration value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors raised while reading a single weather CSV file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading data file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error reading CSV headers in {path}: {source}")]
    HeaderReadError {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Missing required columns in {path}: {missing:?}")]
    MissingColumns { path: PathBuf, missing: Vec<String> },
    #[error("Date parsing error in {path} at row {row} for value '{value}': {message}")]
    TimestampParseError {
        path: PathBuf,
        row: usize,
        value: String,
        message: String,
    },
    #[error("Failed to read row {row} in {path}: {source}")]
    RowDeserializeError {
        path: PathBuf,
        row: usize,
        #[source]
        source: csv::Error,
    },
}

/// Error returned by every public operation of the crate.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),
    #[error("Weather data source unavailable at {path}: {reason}")]
    DataSource { path: PathBuf, reason: String },
    #[error("Schema mismatch in {path}: missing columns {missing:?}")]
    Schema { path: PathBuf, missing: Vec<String> },
    #[error("Parsing failed: {0}")]
    Parse(ParseError),
    #[error("Duplicate observation for location '{location}' on {date}")]
    DuplicateObservation { location: String, date: NaiveDate },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unsupported crop '{0}'")]
    UnknownCrop(String),
    #[error("Unknown location '{0}'")]
    UnknownLocation(String),
    #[error("No data for requested period: {0}")]
    EmptyInput(String),
    #[error("Aggregate is missing required field '{field}'")]
    IncompleteData { field: String },
}

impl AdvisorError {
    /// True for errors that can only happen while building the dataset.
    /// Everything else is a recoverable query error.
    pub fn is_load_fatal(&self) -> bool {
        matches!(
            self,
            AdvisorError::Config(_)
                | AdvisorError::DataSource { .. }
                | AdvisorError::Schema { .. }
                | AdvisorError::Parse(_)
                | AdvisorError::DuplicateObservation { .. }
        )
    }
}

impl From<ParseError> for AdvisorError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MissingColumns { path, missing } => AdvisorError::Schema { path, missing },
            other => AdvisorError::Parse(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_become_schema_error() {
        let err: AdvisorError = ParseError::MissingColumns {
            path: PathBuf::from("a.csv"),
            missing: vec!["precip".to_string()],
        }
        .into();
        assert!(matches!(err, AdvisorError::Schema { ref missing, .. } if missing == &vec!["precip".to_string()]));
        assert!(err.is_load_fatal());
    }

    #[test]
    fn test_query_errors_are_not_load_fatal() {
        assert!(!AdvisorError::UnknownCrop("rice".into()).is_load_fatal());
        assert!(!AdvisorError::EmptyInput("month 2".into()).is_load_fatal());
        assert!(!AdvisorError::InvalidInput("month 13".into()).is_load_fatal());
    }
}
