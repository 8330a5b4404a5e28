//! Per-record suitability scoring against a crop's ranges.
//!
//! Unlike the recommendation rules this never averages: a crop is suitable
//! for a set of records if any single day landed inside most of its ranges.

use crate::catalog::CropThreshold;
use crate::config::DEFAULT_MIN_MATCH_SCORE;
use crate::data_models::{Season, WeatherRecord};
use serde::Serialize;
use std::collections::BTreeMap;

const CRITERIA: f64 = 4.0;

/// One `(year, season)` group and how its records scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonSuitability {
    pub year: i32,
    pub season: Season,
    pub total_records: usize,
    pub qualifying_records: usize,
    pub best_score: f64,
    pub suitable: bool,
}

fn in_range(value: Option<f64>, min: f64, max: f64) -> bool {
    value.map_or(false, |v| v >= min && v <= max)
}

/// Fraction of the four range checks (temp, precip, humidity, solar radiation)
/// the record satisfies. A missing value fails its check.
pub fn match_score(record: &WeatherRecord, threshold: &CropThreshold) -> f64 {
    let met = [
        in_range(record.temp, threshold.min_temp, threshold.max_temp),
        in_range(record.precip, threshold.min_precip, threshold.max_precip),
        in_range(record.humidity, threshold.min_humidity, threshold.max_humidity),
        in_range(
            record.solarradiation,
            threshold.min_solarradiation,
            threshold.max_solarradiation,
        ),
    ]
    .iter()
    .filter(|ok| **ok)
    .count();
    met as f64 / CRITERIA
}

pub fn is_suitable(records: &[&WeatherRecord], threshold: &CropThreshold) -> bool {
    is_suitable_with_min_score(records, threshold, DEFAULT_MIN_MATCH_SCORE)
}

pub fn is_suitable_with_min_score(records: &[&WeatherRecord], threshold: &CropThreshold, min_score: f64) -> bool {
    records.iter().any(|r| match_score(r, threshold) >= min_score)
}

/// The `(year, season)` groups that qualify, oldest first.
pub fn suitability_detail(records: &[&WeatherRecord], threshold: &CropThreshold) -> Vec<SeasonSuitability> {
    suitability_detail_with_min_score(records, threshold, DEFAULT_MIN_MATCH_SCORE)
}

pub fn suitability_detail_with_min_score(
    records: &[&WeatherRecord],
    threshold: &CropThreshold,
    min_score: f64,
) -> Vec<SeasonSuitability> {
    season_scores(records, threshold, min_score)
        .into_iter()
        .filter(|group| group.suitable)
        .collect()
}

/// Scores every record and rolls the results up by `(year, season)`,
/// oldest group first. Groups with no qualifying record are kept
/// with `suitable: false`.
pub fn season_scores(records: &[&WeatherRecord], threshold: &CropThreshold, min_score: f64) -> Vec<SeasonSuitability> {
    let mut groups: BTreeMap<(i32, Season), SeasonSuitability> = BTreeMap::new();

    for record in records {
        let score = match_score(record, threshold);
        let entry = groups
            .entry((record.year, record.season))
            .or_insert_with(|| SeasonSuitability {
                year: record.year,
                season: record.season,
                total_records: 0,
                qualifying_records: 0,
                best_score: 0.0,
                suitable: false,
            });
        entry.total_records += 1;
        entry.best_score = entry.best_score.max(score);
        if score >= min_score {
            entry.qualifying_records += 1;
            entry.suitable = true;
        }
    }

    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::test_support::record;
    use approx::assert_relative_eq;

    fn threshold() -> CropThreshold {
        CropThreshold {
            name: "test",
            min_temp: 13.0,
            max_temp: 25.0,
            min_precip: 400.0,
            max_precip: 800.0,
            min_humidity: 70.0,
            max_humidity: 90.0,
            min_solarradiation: 10.0,
            max_solarradiation: 20.0,
            altitude_range: None,
            icon: None,
        }
    }

    #[test]
    fn test_all_four_ranges_met() {
        let rec = record("a", "2021-02-10", 18.0, 500.0, 75.0, 15.0);
        assert_relative_eq!(match_score(&rec, &threshold()), 1.0);
        assert!(is_suitable(&[&rec], &threshold()));
    }

    #[test]
    fn test_two_of_four_is_not_counted() {
        let rec = record("a", "2021-02-10", 18.0, 500.0, 40.0, 300.0);
        assert_relative_eq!(match_score(&rec, &threshold()), 0.5);
        assert!(!is_suitable(&[&rec], &threshold()));

        assert!(suitability_detail(&[&rec], &threshold()).is_empty());

        let scores = season_scores(&[&rec], &threshold(), DEFAULT_MIN_MATCH_SCORE);
        assert_eq!(scores.len(), 1);
        assert!(!scores[0].suitable);
        assert_eq!(scores[0].qualifying_records, 0);
    }

    #[test]
    fn test_three_of_four_meets_default_score() {
        let rec = record("a", "2021-02-10", 18.0, 500.0, 75.0, 300.0);
        assert_relative_eq!(match_score(&rec, &threshold()), 0.75);
        assert!(is_suitable(&[&rec], &threshold()));
        assert!(!is_suitable_with_min_score(&[&rec], &threshold(), 1.0));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let rec = record("a", "2021-02-10", 13.0, 800.0, 70.0, 20.0);
        assert_relative_eq!(match_score(&rec, &threshold()), 1.0);
    }

    #[test]
    fn test_missing_value_is_unmet() {
        let mut rec = record("a", "2021-02-10", 18.0, 500.0, 75.0, 15.0);
        rec.humidity = None;
        assert_relative_eq!(match_score(&rec, &threshold()), 0.75);
        rec.temp = None;
        assert_relative_eq!(match_score(&rec, &threshold()), 0.5);
    }

    fn mixed_seasons() -> Vec<WeatherRecord> {
        vec![
            record("a", "2022-08-01", 18.0, 500.0, 75.0, 15.0),
            record("a", "2021-02-10", 30.0, 0.0, 40.0, 300.0),
            record("a", "2021-03-10", 18.0, 500.0, 75.0, 300.0),
            record("a", "2021-11-10", 30.0, 0.0, 75.0, 300.0),
        ]
    }

    #[test]
    fn test_season_scores_group_by_year_and_season_in_order() {
        let records = mixed_seasons();
        let refs: Vec<&WeatherRecord> = records.iter().collect();
        let scores = season_scores(&refs, &threshold(), DEFAULT_MIN_MATCH_SCORE);

        let keys: Vec<(i32, Season)> = scores.iter().map(|d| (d.year, d.season)).collect();
        assert_eq!(keys, vec![(2021, Season::Jfm), (2021, Season::Ond), (2022, Season::Jas)]);

        assert_eq!(scores[0].total_records, 2);
        assert_eq!(scores[0].qualifying_records, 1);
        assert_relative_eq!(scores[0].best_score, 0.75);
        assert!(scores[0].suitable);

        assert!(!scores[1].suitable);
        assert_relative_eq!(scores[1].best_score, 0.25);

        assert!(scores[2].suitable);
    }

    #[test]
    fn test_detail_lists_only_qualifying_groups() {
        let records = mixed_seasons();
        let refs: Vec<&WeatherRecord> = records.iter().collect();
        let detail = suitability_detail(&refs, &threshold());

        let keys: Vec<(i32, Season)> = detail.iter().map(|d| (d.year, d.season)).collect();
        assert_eq!(keys, vec![(2021, Season::Jfm), (2022, Season::Jas)]);
        assert!(detail.iter().all(|d| d.suitable));
        assert!(is_suitable(&refs, &threshold()));

        let strict = suitability_detail_with_min_score(&refs, &threshold(), 1.0);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].year, 2022);
    }

    #[test]
    fn test_empty_records() {
        assert!(!is_suitable(&[], &threshold()));
        assert!(suitability_detail(&[], &threshold()).is_empty());
    }
}
