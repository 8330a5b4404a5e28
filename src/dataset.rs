//! The in-memory, read-only weather history every query runs against.

use crate::data_models::WeatherRecord;
use crate::errors::AdvisorError;
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Daily records for all locations, ordered by `(date, location)`.
/// Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<WeatherRecord>,
}

/// Per-location coverage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationCoverage {
    pub location: String,
    pub record_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl Dataset {
    /// Builds a dataset, rejecting a second observation for the same location and day.
    pub fn from_records(mut records: Vec<WeatherRecord>) -> Result<Self, AdvisorError> {
        let mut seen: HashSet<(&str, NaiveDate)> = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert((record.location.as_str(), record.date)) {
                return Err(AdvisorError::DuplicateObservation {
                    location: record.location.clone(),
                    date: record.date,
                });
            }
        }

        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.location.cmp(&b.location)));
        Ok(Self { records })
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct location tokens, sorted.
    pub fn locations(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.records.iter().map(|r| r.location.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn has_location(&self, location: &str) -> bool {
        self.records.iter().any(|r| r.location == location)
    }

    /// Fails with `UnknownLocation` if no record carries `location`.
    pub fn require_location(&self, location: &str) -> Result<(), AdvisorError> {
        if self.has_location(location) {
            Ok(())
        } else {
            Err(AdvisorError::UnknownLocation(location.to_string()))
        }
    }

    /// First and last observation date across all locations.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    pub fn coverage(&self) -> Vec<LocationCoverage> {
        let mut by_location: BTreeMap<&str, LocationCoverage> = BTreeMap::new();
        for record in &self.records {
            by_location
                .entry(record.location.as_str())
                .and_modify(|c| {
                    c.record_count += 1;
                    c.first_date = c.first_date.min(record.date);
                    c.last_date = c.last_date.max(record.date);
                })
                .or_insert_with(|| LocationCoverage {
                    location: record.location.clone(),
                    record_count: 1,
                    first_date: record.date,
                    last_date: record.date,
                });
        }
        by_location.into_values().collect()
    }
}

/// Shared handle to the current dataset. Readers take a cheap snapshot;
/// a reload publishes a fully built replacement in one assignment.
#[derive(Debug, Default)]
pub struct DatasetHandle {
    current: RwLock<Arc<Dataset>>,
}

impl DatasetHandle {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            current: RwLock::new(Arc::new(dataset)),
        }
    }

    pub fn snapshot(&self) -> Arc<Dataset> {
        Arc::clone(&self.current.read())
    }

    /// Swaps in `dataset` and returns the previous one.
    pub fn replace(&self, dataset: Dataset) -> Arc<Dataset> {
        let next = Arc::new(dataset);
        std::mem::replace(&mut *self.current.write(), next)
    }
}
