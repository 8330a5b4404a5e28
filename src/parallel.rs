use crate::data_models::WeatherRecord;
use crate::errors::ParseError;
use crate::parsers::csv_parser;
use log::{error, info, warn};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;

/// Result of parsing a single weather file
#[derive(Debug)]
pub struct FileProcessResult {
    pub file_path: PathBuf,
    pub outcome: Result<Vec<WeatherRecord>, ParseError>,
    pub processing_time_ms: u128,
}

/// Parallel CSV parser using Rayon
pub struct ParallelProcessor {
    num_workers: usize,
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelProcessor {
    pub fn new() -> Self {
        let num_workers = num_cpus::get();
        info!("Initializing ParallelProcessor with {} workers", num_workers);
        Self { num_workers }
    }

    pub fn with_workers(num_workers: usize) -> Self {
        let num_workers = num_workers.max(1);
        info!("Initializing ParallelProcessor with {} custom workers", num_workers);
        Self { num_workers }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Parses every file in parallel. Results come back in the same order as `paths`.
    pub fn process_files(&self, paths: &[PathBuf]) -> Vec<FileProcessResult> {
        info!("Starting parallel parsing of {} files", paths.len());

        let work = || -> Vec<FileProcessResult> {
            paths
                .par_iter()
                .map(|path| {
                    let start = Instant::now();
                    let outcome = csv_parser::parse_weather_csv(path);
                    let processing_time_ms = start.elapsed().as_millis();
                    match &outcome {
                        Ok(records) => info!(
                            "Parsed {} records from {} in {}ms",
                            records.len(),
                            path.display(),
                            processing_time_ms
                        ),
                        Err(e) => error!("Failed to parse {}: {}", path.display(), e),
                    }
                    FileProcessResult {
                        file_path: path.clone(),
                        outcome,
                        processing_time_ms,
                    }
                })
                .collect()
        };

        match rayon::ThreadPoolBuilder::new().num_threads(self.num_workers).build() {
            Ok(pool) => pool.install(work),
            Err(e) => {
                warn!("Could not build dedicated thread pool ({}), using the global pool", e);
                work()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_processor_creation() {
        let processor = ParallelProcessor::new();
        assert!(processor.num_workers() > 0);
        assert_eq!(ParallelProcessor::with_workers(0).num_workers(), 1);
    }

    #[test]
    fn test_results_keep_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let header = "name,datetime,tempmax,tempmin,temp,humidity,precip,windspeed,cloudcover,solarradiation";
        let mut paths = Vec::new();
        for (i, station) in ["alpha", "bravo", "charlie"].iter().enumerate() {
            let path = dir.path().join(format!("{}.csv", station));
            std::fs::write(
                &path,
                format!("{}\n{},2022-01-0{},25,12,18,60,0,10,30,200\n", header, station, i + 1),
            )
            .unwrap();
            paths.push(path);
        }
        paths.push(dir.path().join("missing.csv"));

        let results = ParallelProcessor::with_workers(2).process_files(&paths);
        assert_eq!(results.len(), 4);
        for (result, path) in results.iter().zip(&paths) {
            assert_eq!(&result.file_path, path);
        }
        assert_eq!(results[1].outcome.as_ref().unwrap()[0].location, "bravo");
        assert!(matches!(results[3].outcome, Err(ParseError::IoError { .. })));
    }
}
