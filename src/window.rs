//! Time-window selection over the dataset.

use crate::data_models::WeatherRecord;
use crate::dataset::Dataset;
use crate::errors::AdvisorError;
use crate::utils::normalize_token;
use chrono::{Datelike, Days, NaiveDate};
use log::debug;
use serde::Serialize;

/// Which slice of history a query looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WindowSpec {
    /// Every record in a calendar month, across all years.
    ByMonth { month: u32 },
    /// Every record in an ISO week number, across all years.
    ByIsoWeek { week: u32 },
    /// Records in `month` whose week-of-month (see [`week_of_month`]) equals `week`.
    ByMonthWeekOfMonth { month: u32, week: u32 },
    /// Inclusive date range, optionally restricted to one location.
    ByDateRange {
        start: NaiveDate,
        end: NaiveDate,
        location: Option<String>,
    },
    /// The `length_days` days ending on `end` (inclusive).
    RollingWindow {
        end: NaiveDate,
        length_days: i64,
        location: Option<String>,
    },
    ByLocation { location: String },
}

impl WindowSpec {
    pub fn month(month: u32) -> Self {
        WindowSpec::ByMonth { month }
    }

    pub fn iso_week(week: u32) -> Self {
        WindowSpec::ByIsoWeek { week }
    }

    pub fn month_week(month: u32, week: u32) -> Self {
        WindowSpec::ByMonthWeekOfMonth { month, week }
    }

    pub fn date_range(start: NaiveDate, end: NaiveDate) -> Self {
        WindowSpec::ByDateRange { start, end, location: None }
    }

    pub fn rolling(end: NaiveDate, length_days: i64) -> Self {
        WindowSpec::RollingWindow { end, length_days, location: None }
    }

    /// Every record for one location. The name is normalized first.
    pub fn location(location: impl AsRef<str>) -> Self {
        WindowSpec::ByLocation {
            location: normalize_token(location.as_ref()),
        }
    }

    /// Restricts a date-range or rolling window to one (normalized) location.
    /// Other variants are returned unchanged.
    pub fn at_location(self, name: impl AsRef<str>) -> Self {
        let location = Some(normalize_token(name.as_ref()));
        match self {
            WindowSpec::ByDateRange { start, end, .. } => WindowSpec::ByDateRange { start, end, location },
            WindowSpec::RollingWindow { end, length_days, .. } => WindowSpec::RollingWindow {
                end,
                length_days,
                location,
            },
            other => other,
        }
    }

    /// Short description used in reports and "no data" errors.
    pub fn describe(&self) -> String {
        match self {
            WindowSpec::ByMonth { month } => format!("month {}", month),
            WindowSpec::ByIsoWeek { week } => format!("week {}", week),
            WindowSpec::ByMonthWeekOfMonth { month, week } => format!("month {}, week {}", month, week),
            WindowSpec::ByDateRange { start, end, location } => with_location(format!("{} to {}", start, end), location),
            WindowSpec::RollingWindow { end, length_days, location } => {
                with_location(format!("{} days ending {}", length_days, end), location)
            }
            WindowSpec::ByLocation { location } => format!("location {}", location),
        }
    }
}

fn with_location(base: String, location: &Option<String>) -> String {
    match location {
        Some(loc) => format!("{} at {}", base, loc),
        None => base,
    }
}

/// Week of the month: `((day + weekday_of_first) / 7) + 1` with Monday = 0.
/// Ranges from 1 to 6 depending on where the month starts.
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first_weekday = date
        .with_day(1)
        .map(|first| first.weekday().num_days_from_monday())
        .unwrap_or(0);
    (date.day() + first_weekday) / 7 + 1
}

/// First day of a rolling window of `length_days` ending on `end`.
pub fn rolling_start(end: NaiveDate, length_days: i64) -> Result<NaiveDate, AdvisorError> {
    if length_days < 1 {
        return Err(AdvisorError::InvalidInput(format!(
            "Rolling window length must be at least 1 day, got {}",
            length_days
        )));
    }
    end.checked_sub_days(Days::new((length_days - 1) as u64))
        .ok_or_else(|| AdvisorError::InvalidInput(format!("Rolling window of {} days before {} is out of range", length_days, end)))
}

/// Returns the records matching `spec`, in date order. An empty result is not an error.
pub fn select<'a>(dataset: &'a Dataset, spec: &WindowSpec) -> Result<Vec<&'a WeatherRecord>, AdvisorError> {
    let selected: Vec<&WeatherRecord> = match spec {
        WindowSpec::ByMonth { month } => {
            validate_month(*month)?;
            dataset.records().iter().filter(|r| r.month == *month).collect()
        }
        WindowSpec::ByIsoWeek { week } => {
            if !(1..=53).contains(week) {
                return Err(AdvisorError::InvalidInput(format!("Invalid week {}. Use 1-53.", week)));
            }
            dataset
                .records()
                .iter()
                .filter(|r| r.date.iso_week().week() == *week)
                .collect()
        }
        WindowSpec::ByMonthWeekOfMonth { month, week } => {
            validate_month(*month)?;
            if !(1..=5).contains(week) {
                return Err(AdvisorError::InvalidInput(format!("Invalid week of month {}. Use 1-5.", week)));
            }
            dataset
                .records()
                .iter()
                .filter(|r| r.month == *month && week_of_month(r.date) == *week)
                .collect()
        }
        WindowSpec::ByDateRange { start, end, location } => range(dataset, *start, *end, location.as_deref())?,
        WindowSpec::RollingWindow { end, length_days, location } => {
            let start = rolling_start(*end, *length_days)?;
            range(dataset, start, *end, location.as_deref())?
        }
        WindowSpec::ByLocation { location } => {
            dataset.require_location(location)?;
            dataset.records().iter().filter(|r| &r.location == location).collect()
        }
    };

    debug!("Window '{}' selected {} records", spec.describe(), selected.len());
    Ok(selected)
}

fn validate_month(month: u32) -> Result<(), AdvisorError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(AdvisorError::InvalidInput(format!("Invalid month {}. Use 1-12.", month)))
    }
}

fn range<'a>(
    dataset: &'a Dataset,
    start: NaiveDate,
    end: NaiveDate,
    location: Option<&str>,
) -> Result<Vec<&'a WeatherRecord>, AdvisorError> {
    if start > end {
        return Err(AdvisorError::InvalidInput(format!(
            "Start date {} is after end date {}",
            start, end
        )));
    }
    if let Some(loc) = location {
        dataset.require_location(loc)?;
    }
    Ok(dataset
        .records()
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .filter(|r| location.map_or(true, |loc| r.location == loc))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::test_support::{date, record};

    /// One record per day for `location` from `start` through `end`.
    fn daily(location: &str, start: &str, end: &str) -> Vec<WeatherRecord> {
        let mut out = Vec::new();
        let mut day = date(start);
        while day <= date(end) {
            out.push(record(location, &day.to_string(), 18.0, 1.0, 70.0, 200.0));
            day = day.succ_opt().unwrap();
        }
        out
    }

    fn two_years() -> Dataset {
        let mut records = daily("kericho", "2023-01-01", "2024-12-31");
        records.extend(daily("nakuru", "2024-02-20", "2024-03-31"));
        Dataset::from_records(records).unwrap()
    }

    #[test]
    fn test_rolling_window_bounds() {
        let ds = two_years();
        let spec = WindowSpec::rolling(date("2024-03-21"), 21).at_location("kericho");
        let picked = select(&ds, &spec).unwrap();

        assert_eq!(picked.len(), 21);
        assert_eq!(picked.first().unwrap().date, date("2024-03-01"));
        assert_eq!(picked.last().unwrap().date, date("2024-03-21"));
        assert!(picked.iter().all(|r| r.date != date("2024-02-29") && r.date != date("2024-03-22")));
    }

    #[test]
    fn test_rolling_window_all_locations() {
        let ds = two_years();
        let picked = select(&ds, &WindowSpec::rolling(date("2024-03-21"), 21)).unwrap();
        assert_eq!(picked.len(), 42);
    }

    #[test]
    fn test_month_buckets_are_exclusive_and_exhaustive() {
        let ds = two_years();
        let mut total = 0;
        for month in 1..=12 {
            let picked = select(&ds, &WindowSpec::month(month)).unwrap();
            assert!(picked.iter().all(|r| r.month == month));
            total += picked.len();
        }
        assert_eq!(total, ds.len());
    }

    #[test]
    fn test_month_spans_years() {
        let ds = two_years();
        let feb = select(&ds, &WindowSpec::month(2)).unwrap();
        // 28 days in 2023, 29 in 2024, plus 10 Nakuru days.
        assert_eq!(feb.len(), 28 + 29 + 10);
    }

    #[test]
    fn test_invalid_inputs() {
        let ds = two_years();
        for spec in [
            WindowSpec::month(0),
            WindowSpec::month(13),
            WindowSpec::iso_week(54),
            WindowSpec::month_week(3, 6),
            WindowSpec::month_week(13, 1),
            WindowSpec::date_range(date("2024-02-01"), date("2024-01-01")),
            WindowSpec::rolling(date("2024-03-21"), 0),
        ] {
            assert!(matches!(select(&ds, &spec), Err(AdvisorError::InvalidInput(_))), "{:?}", spec);
        }
    }

    #[test]
    fn test_unknown_location() {
        let ds = two_years();
        assert!(matches!(
            select(&ds, &WindowSpec::location("eldoret")),
            Err(AdvisorError::UnknownLocation(_))
        ));
        assert!(matches!(
            select(&ds, &WindowSpec::rolling(date("2024-03-21"), 7).at_location("eldoret")),
            Err(AdvisorError::UnknownLocation(_))
        ));
    }

    #[test]
    fn test_location_constructors_normalize_names() {
        let ds = Dataset::from_records(vec![record("kericho_kenya", "2024-03-01", 18.0, 1.0, 70.0, 200.0)]).unwrap();

        assert_eq!(select(&ds, &WindowSpec::location("Kericho, Kenya")).unwrap().len(), 1);
        let spec = WindowSpec::date_range(date("2024-03-01"), date("2024-03-31")).at_location("Kericho, Kenya");
        assert_eq!(select(&ds, &spec).unwrap().len(), 1);
    }

    #[test]
    fn test_by_location() {
        let ds = two_years();
        let picked = select(&ds, &WindowSpec::location("nakuru")).unwrap();
        assert_eq!(picked.len(), 41);
        assert!(picked.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_iso_week() {
        let ds = two_years();
        // ISO week 1: 2023-01-02..=2023-01-08, 2024-01-01..=2024-01-07,
        // and 2024-12-30..=2024-12-31 which open ISO week 1 of 2025.
        let picked = select(&ds, &WindowSpec::iso_week(1)).unwrap();
        assert_eq!(picked.len(), 16);
        assert!(picked.iter().all(|r| r.date.iso_week().week() == 1));
        // 2023-01-01 belongs to ISO week 52 of 2022.
        assert!(picked.iter().all(|r| r.date != date("2023-01-01")));
    }

    #[test]
    fn test_week_of_month_formula() {
        // March 2024 starts on a Friday (weekday index 4).
        assert_eq!(week_of_month(date("2024-03-01")), 1);
        assert_eq!(week_of_month(date("2024-03-02")), 1);
        assert_eq!(week_of_month(date("2024-03-03")), 2);
        assert_eq!(week_of_month(date("2024-03-31")), 6);
        // April 2024 starts on a Monday.
        assert_eq!(week_of_month(date("2024-04-06")), 1);
        assert_eq!(week_of_month(date("2024-04-07")), 2);
    }

    #[test]
    fn test_month_week_selection() {
        let ds = two_years();
        let picked = select(&ds, &WindowSpec::month_week(4, 1)).unwrap();
        assert!(picked.iter().all(|r| r.month == 4 && week_of_month(r.date) == 1));
        // April 2023 starts on Saturday: days 1 only (1+5=6 -> week 1); April 2024 on Monday: days 1-6.
        assert_eq!(picked.len(), 1 + 6);
    }

    #[test]
    fn test_empty_selection_is_ok() {
        let ds = two_years();
        let picked = select(&ds, &WindowSpec::date_range(date("2030-01-01"), date("2030-01-31"))).unwrap();
        assert!(picked.is_empty());
    }
}
