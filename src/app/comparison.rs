//! Two-driver comparison series
//!
//! Merges two drivers' per-round results against a season calendar into one
//! row per scheduled race. A driver's fields appear on a row only when that
//! driver has a result for the round. Totals are never carried forward onto
//! rounds the driver did not score a result in.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::app::models::{format_points, DriverRaceResult, RaceSummary};

/// One driver's results for a season
#[derive(Debug, Clone, Copy)]
pub struct DriverSeries<'a> {
    pub driver_id: &'a str,
    pub results: &'a [DriverRaceResult],
}

impl<'a> DriverSeries<'a> {
    pub fn new(driver_id: &'a str, results: &'a [DriverRaceResult]) -> Self {
        Self { driver_id, results }
    }
}

/// A driver's position in the series at one round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub driver_id: String,
    /// Running total up to and including this round
    pub cumulative: f64,
    /// Points scored in this round
    pub points: f64,
    pub position: u32,
    /// e.g. "18 pts • P2"
    pub annotation: String,
}

/// One scheduled race with each driver's point, where present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub round: u32,
    pub race_name: String,
    pub date: NaiveDate,
    pub a: Option<SeriesPoint>,
    pub b: Option<SeriesPoint>,
}

/// Build the merged comparison series
///
/// Output has exactly one row per race in `schedule`, ordered by round.
pub fn build_comparison(
    schedule: &[RaceSummary],
    a: DriverSeries<'_>,
    b: DriverSeries<'_>,
) -> Vec<ComparisonRow> {
    let points_a = cumulative_points(a);
    let points_b = cumulative_points(b);

    let mut races: Vec<&RaceSummary> = schedule.iter().collect();
    races.sort_by_key(|race| race.round);

    races
        .into_iter()
        .map(|race| ComparisonRow {
            round: race.round,
            race_name: race.race_name.clone(),
            date: race.date,
            a: points_a.get(&race.round).cloned(),
            b: points_b.get(&race.round).cloned(),
        })
        .collect()
}

fn cumulative_points(series: DriverSeries<'_>) -> HashMap<u32, SeriesPoint> {
    let mut results: Vec<&DriverRaceResult> = series.results.iter().collect();
    results.sort_by_key(|result| result.round);

    let mut total = 0.0;
    results
        .into_iter()
        .map(|result| {
            total += result.points;
            let point = SeriesPoint {
                driver_id: series.driver_id.to_string(),
                cumulative: total,
                points: result.points,
                position: result.position,
                annotation: format!("{} pts • P{}", format_points(result.points), result.position),
            };
            (result.round, point)
        })
        .collect()
}
