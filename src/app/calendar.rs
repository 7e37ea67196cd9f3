//! Race calendar annotation and date formatting

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::app::models::RaceSummary;

/// Where a race sits relative to now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RaceStatus {
    Completed,
    Upcoming,
    /// The first upcoming race on the calendar
    Next,
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RaceStatus::Completed => "Completed",
            RaceStatus::Upcoming => "Upcoming",
            RaceStatus::Next => "Next race",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry<'a> {
    pub race: &'a RaceSummary,
    pub status: RaceStatus,
}

/// Flag each race as completed, upcoming, or next
///
/// Keeps the schedule's order. At most one race is `Next`: the first in
/// schedule order that starts at or after `now`.
pub fn annotate_calendar(races: &[RaceSummary], now: DateTime<Utc>) -> Vec<CalendarEntry<'_>> {
    let mut next_found = false;
    races
        .iter()
        .map(|race| {
            let status = if !race.is_upcoming(now) {
                RaceStatus::Completed
            } else if next_found {
                RaceStatus::Upcoming
            } else {
                next_found = true;
                RaceStatus::Next
            };
            CalendarEntry { race, status }
        })
        .collect()
}

/// e.g. "Sat, Mar 2, 2024"
pub fn format_race_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d, %Y").to_string()
}

/// e.g. "15:00 (UTC)", or "TBA" when the start time is unknown
pub fn format_race_time(time: Option<NaiveTime>) -> String {
    match time {
        Some(time) => format!("{} (UTC)", time.format("%H:%M")),
        None => "TBA".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn race(round: u32, day: u32) -> RaceSummary {
        RaceSummary {
            round,
            race_name: format!("Race {round}"),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            time: NaiveTime::from_hms_opt(15, 0, 0),
            circuit_id: format!("circuit_{round}"),
            circuit_name: format!("Circuit {round}"),
            locality: "Town".to_string(),
            country: "Country".to_string(),
        }
    }

    #[test]
    fn test_exactly_one_next_race() {
        let races = vec![race(1, 2), race(2, 9), race(3, 24)];
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();

        let statuses: Vec<RaceStatus> = annotate_calendar(&races, now)
            .into_iter()
            .map(|entry| entry.status)
            .collect();
        assert_eq!(
            statuses,
            vec![RaceStatus::Completed, RaceStatus::Next, RaceStatus::Upcoming]
        );
    }

    #[test]
    fn test_finished_season_has_no_next_race() {
        let races = vec![race(1, 2), race(2, 9)];
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(annotate_calendar(&races, now)
            .iter()
            .all(|entry| entry.status == RaceStatus::Completed));
    }

    #[test]
    fn test_format_race_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(format_race_date(date), "Sat, Mar 2, 2024");
    }

    #[test]
    fn test_format_race_time() {
        assert_eq!(
            format_race_time(NaiveTime::from_hms_opt(15, 0, 0)),
            "15:00 (UTC)"
        );
        assert_eq!(format_race_time(None), "TBA");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(RaceStatus::Next.to_string(), "Next race");
        assert_eq!(RaceStatus::Completed.to_string(), "Completed");
    }
}
