use crate::data_models::{Observation, RawWeatherRow, WeatherRecord};
use crate::errors::ParseError;
use crate::utils::{implicit_location, normalize_token, parse_observation_date};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use std::fs::File;
use std::path::Path;

/// Columns every daily weather export must carry.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "datetime",
    "temp",
    "tempmax",
    "tempmin",
    "precip",
    "humidity",
    "solarradiation",
    "cloudcover",
    "windspeed",
];

/// Columns that identify the station; if neither is present the file name is used.
const LOCATION_COLUMNS: [&str; 2] = ["name", "location"];

/// Parses one daily weather CSV into enriched records.
///
/// Any missing required column, unreadable row or unparsable date fails the
/// whole file. Blank numeric cells are kept as missing values.
pub fn parse_weather_csv(file_path: &Path) -> Result<Vec<WeatherRecord>, ParseError> {
    let file = File::open(file_path).map_err(|e| ParseError::IoError {
        path: file_path.to_path_buf(),
        source: e,
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| ParseError::HeaderReadError {
            path: file_path.to_path_buf(),
            source: e,
        })?
        .clone();

    check_required_columns(&headers, file_path)?;

    let has_location_column = headers
        .iter()
        .any(|h| LOCATION_COLUMNS.contains(&h));
    let fallback_location = implicit_location(file_path);
    if !has_location_column {
        debug!(
            "No location column in {}, using '{}'",
            file_path.display(),
            fallback_location
        );
    }

    let mut records = Vec::new();
    for (row_index, result) in reader.deserialize::<RawWeatherRow>().enumerate() {
        // Header is file row 1.
        let file_row_num = row_index + 2;
        let row = result.map_err(|e| ParseError::RowDeserializeError {
            path: file_path.to_path_buf(),
            row: file_row_num,
            source: e,
        })?;

        let date = parse_observation_date(&row.datetime).map_err(|message| ParseError::TimestampParseError {
            path: file_path.to_path_buf(),
            row: file_row_num,
            value: row.datetime.clone(),
            message,
        })?;

        let location = [row.name.as_deref(), row.location.as_deref()]
            .into_iter()
            .flatten()
            .map(normalize_token)
            .find(|token| !token.is_empty())
            .unwrap_or_else(|| fallback_location.clone());

        records.push(WeatherRecord::new(location, date, Observation::from(&row)));
    }

    debug!("Parsed {} records from {}", records.len(), file_path.display());
    Ok(records)
}

fn check_required_columns(headers: &StringRecord, file_path: &Path) -> Result<(), ParseError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ParseError::MissingColumns {
            path: file_path.to_path_buf(),
            missing,
        })
    }
}
