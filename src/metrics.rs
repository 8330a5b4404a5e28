use log::info;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Global metrics instance
pub static METRICS: Lazy<Mutex<Metrics>> = Lazy::new(|| Mutex::new(Metrics::new()));

/// Load and query counters for the advisor process.
#[derive(Debug, Default)]
pub struct Metrics {
    pub files_loaded: u64,
    pub records_loaded: u64,
    pub validation_warnings: u64,
    pub queries_served: u64,
    pub queries_failed: u64,
    pub processing_times: HashMap<String, Duration>,
    pub start_time: Option<Instant>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_file_loaded(&mut self, records: u64) {
        self.files_loaded += 1;
        self.records_loaded += records;
    }

    pub fn record_validation_warnings(&mut self, count: u64) {
        self.validation_warnings += count;
    }

    pub fn record_query(&mut self, succeeded: bool) {
        if succeeded {
            self.queries_served += 1;
        } else {
            self.queries_failed += 1;
        }
    }

    pub fn record_processing_time(&mut self, operation: String, duration: Duration) {
        self.processing_times.insert(operation, duration);
    }

    pub fn get_total_duration(&self) -> Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or_default()
    }

    pub fn print_summary(&self) {
        info!("========== Advisor Metrics Summary ==========");
        info!("Uptime: {:.2?}", self.get_total_duration());
        info!("Files Loaded: {}", self.files_loaded);
        info!("Records Loaded: {}", self.records_loaded);
        info!("Validation Warnings: {}", self.validation_warnings);
        info!("Queries Served: {}", self.queries_served);
        info!("Queries Failed: {}", self.queries_failed);
        let mut ops: Vec<_> = self.processing_times.iter().collect();
        ops.sort_by(|a, b| a.0.cmp(b.0));
        for (op, duration) in ops {
            info!("  {}: {:.2?}", op, duration);
        }
    }
}

/// Helper macro to time an operation
#[macro_export]
macro_rules! time_operation {
    ($name:expr, $op:expr) => {{
        let start = std::time::Instant::now();
        let result = $op;
        let duration = start.elapsed();
        $crate::metrics::METRICS
            .lock()
            .record_processing_time($name.to_string(), duration);
        result
    }};
}
