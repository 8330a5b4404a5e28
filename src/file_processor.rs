use crate::config::AdvisorConfig;
use crate::dataset::Dataset;
use crate::errors::AdvisorError;
use crate::metrics::METRICS;
use crate::parallel::ParallelProcessor;
use crate::validation;
use log::{info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Loads the dataset described by `config`.
pub fn load_from_config(config: &AdvisorConfig) -> Result<Dataset, AdvisorError> {
    load_dataset_matching(&config.data_dir, &config.file_pattern)
}

/// Loads every `*.csv` file directly inside `dir`.
pub fn load_dataset(dir: &Path) -> Result<Dataset, AdvisorError> {
    load_dataset_matching(dir, "*.csv")
}

/// Loads all files in `dir` whose name matches `pattern` into one dataset.
///
/// The load is all-or-nothing: the first file that fails to parse (in file
/// name order) aborts it, and duplicate `(location, date)` pairs are rejected.
pub fn load_dataset_matching(dir: &Path, pattern: &str) -> Result<Dataset, AdvisorError> {
    let files = crate::time_operation!("discover_files", discover_files(dir, pattern))?;
    info!("Found {} weather files in {}", files.len(), dir.display());

    let results = crate::time_operation!("parse_files", ParallelProcessor::new().process_files(&files));

    let mut records = Vec::new();
    for result in results {
        let file_records = result.outcome?;
        METRICS.lock().record_file_loaded(file_records.len() as u64);
        records.extend(file_records);
    }

    let mut warnings = 0u64;
    for record in &records {
        if let Err(message) = validation::validate_record(record) {
            warn!("{} ({} {})", message, record.location, record.date);
            warnings += 1;
        }
    }
    METRICS.lock().record_validation_warnings(warnings);

    let dataset = crate::time_operation!("build_dataset", Dataset::from_records(records))?;
    info!(
        "Loaded {} records for {} locations ({} validation warnings)",
        dataset.len(),
        dataset.locations().len(),
        warnings
    );
    Ok(dataset)
}

/// Regular files directly inside `dir` whose name matches `pattern`, sorted by name.
fn discover_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, AdvisorError> {
    if !dir.is_dir() {
        return Err(AdvisorError::DataSource {
            path: dir.to_path_buf(),
            reason: "directory does not exist".to_string(),
        });
    }

    let matcher = glob::Pattern::new(pattern).map_err(|e| AdvisorError::DataSource {
        path: dir.to_path_buf(),
        reason: format!("invalid file pattern '{}': {}", pattern, e),
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| AdvisorError::DataSource {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if matcher.matches(&name) {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(AdvisorError::DataSource {
            path: dir.to_path_buf(),
            reason: format!("no files matching '{}'", pattern),
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::Condition;

    const HEADER: &str = "name,datetime,tempmax,tempmin,temp,humidity,precip,windspeed,cloudcover,solarradiation";

    fn write(dir: &Path, name: &str, rows: &[&str]) {
        let mut body = String::from(HEADER);
        for row in rows {
            body.push('\n');
            body.push_str(row);
        }
        body.push('\n');
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_load_concatenates_files_and_locations() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "kericho_2023.csv",
            &[
                "\"Kericho, Kenya\",2023-12-31,24,12,18,80,6,10,60,150",
                "\"Kericho, Kenya\",2023-12-30,24,12,18,60,0,10,20,300",
            ],
        );
        write(dir.path(), "kericho_2024.csv", &["\"Kericho, Kenya\",2024-01-01,24,12,18,60,0,10,90,100"]);
        write(dir.path(), "nakuru.csv", &["Nakuru,2024-01-01,27,13,20,50,0,12,10,650"]);
        std::fs::write(dir.path().join("README.txt"), "not weather").unwrap();

        let ds = load_dataset(dir.path()).unwrap();
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.locations(), vec!["kericho_kenya", "nakuru"]);
        assert_eq!(ds.records()[0].condition, Condition::Clear);
        assert_eq!(ds.records()[1].condition, Condition::Rain);
        assert_eq!(ds.records()[3].condition, Condition::Sunny);
    }

    #[test]
    fn test_file_with_name_and_location_columns_loads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("kericho.csv"),
            "name,location,datetime,tempmax,tempmin,temp,humidity,precip,windspeed,cloudcover,solarradiation\n\
             Kericho,Kericho,2023-01-01,24,12,18,60,0,10,20,300\n",
        )
        .unwrap();

        let ds = load_dataset(dir.path()).unwrap();
        assert_eq!(ds.locations(), vec!["kericho"]);
    }

    #[test]
    fn test_missing_directory() {
        let err = load_dataset(Path::new("/no/such/weather/dir")).unwrap_err();
        assert!(matches!(err, AdvisorError::DataSource { .. }));
        assert!(err.is_load_fatal());
    }

    #[test]
    fn test_directory_without_csv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        assert!(matches!(load_dataset(dir.path()), Err(AdvisorError::DataSource { .. })));
    }

    #[test]
    fn test_one_bad_file_fails_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.csv", &["A,2023-01-01,24,12,18,60,0,10,20,300"]);
        std::fs::write(dir.path().join("b.csv"), "name,datetime,temp\nB,2023-01-01,20\n").unwrap();

        let err = load_dataset(dir.path()).unwrap_err();
        assert!(matches!(err, AdvisorError::Schema { .. }));
    }

    #[test]
    fn test_duplicate_across_files_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.csv", &["A,2023-01-01,24,12,18,60,0,10,20,300"]);
        write(dir.path(), "b.csv", &["A,2023-01-01,25,13,19,61,0,10,20,300"]);

        assert!(matches!(
            load_dataset(dir.path()),
            Err(AdvisorError::DuplicateObservation { .. })
        ));
    }

    #[test]
    fn test_pattern_from_config() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "station_a.csv", &["A,2023-01-01,24,12,18,60,0,10,20,300"]);
        write(dir.path(), "other.csv", &["B,2023-01-01,24,12,18,60,0,10,20,300"]);

        let config = AdvisorConfig {
            data_dir: dir.path().to_path_buf(),
            file_pattern: "station_*.csv".to_string(),
            ..AdvisorConfig::default()
        };
        let ds = load_from_config(&config).unwrap();
        assert_eq!(ds.locations(), vec!["a"]);
    }
}
