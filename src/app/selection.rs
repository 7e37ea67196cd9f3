//! Season, round and driver selection
//!
//! Tracks what the dashboard is looking at and applies the defaulting rules
//! each time a list finishes loading. A choice the user made is kept across
//! reloads as long as it is still present in the new list.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::app::models::{Driver, RaceSummary, SeasonOption};

/// Current dashboard selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    season: String,
    round: Option<u32>,
    driver_a: String,
    driver_b: String,
}

impl SelectionState {
    /// Start with last year's season selected, as the current season may not
    /// have standings yet
    pub fn new(today: NaiveDate) -> Self {
        Self {
            season: (today.year() - 1).to_string(),
            round: None,
            driver_a: String::new(),
            driver_b: String::new(),
        }
    }

    /// Start from an explicit season
    pub fn with_season(season: impl Into<String>) -> Self {
        Self {
            season: season.into(),
            round: None,
            driver_a: String::new(),
            driver_b: String::new(),
        }
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn round(&self) -> Option<u32> {
        self.round
    }

    /// Selected comparison driver A, `None` until one is chosen
    pub fn driver_a(&self) -> Option<&str> {
        Some(self.driver_a.as_str()).filter(|id| !id.is_empty())
    }

    /// Selected comparison driver B, `None` until one is chosen
    pub fn driver_b(&self) -> Option<&str> {
        Some(self.driver_b.as_str()).filter(|id| !id.is_empty())
    }

    /// Snap to the most recent season when the current one is empty or not
    /// offered. Returns true if the season changed.
    pub fn apply_seasons(&mut self, seasons: &[SeasonOption]) -> bool {
        let Some(latest) = seasons.first() else {
            return false;
        };
        if !self.season.is_empty() && seasons.iter().any(|s| s.value == self.season) {
            return false;
        }
        debug!("Season {:?} unavailable, selecting {}", self.season, latest.value);
        self.select_season(latest.value.clone());
        true
    }

    /// Select the next race at or after `now`, else the first race
    ///
    /// Applied on every schedule load; an empty schedule leaves the round as is.
    pub fn apply_schedule(&mut self, schedule: &[RaceSummary], now: DateTime<Utc>) {
        if let Some(round) = default_round(schedule, now) {
            self.round = Some(round);
        }
    }

    /// Default drivers A and B to the first two drivers unless the current
    /// choices are still in the list. B falls back to the first driver when
    /// only one is listed.
    pub fn apply_drivers(&mut self, drivers: &[Driver]) {
        if drivers.is_empty() {
            return;
        }
        let listed = |id: &str| !id.is_empty() && drivers.iter().any(|d| d.driver_id == id);

        if !listed(&self.driver_a) {
            self.driver_a = drivers[0].driver_id.clone();
        }
        if !listed(&self.driver_b) {
            self.driver_b = drivers
                .get(1)
                .unwrap_or(&drivers[0])
                .driver_id
                .clone();
        }
    }

    /// Switch season. The round is cleared until the new schedule loads;
    /// driver choices are kept and revalidated by `apply_drivers`.
    pub fn select_season(&mut self, season: impl Into<String>) {
        let season = season.into();
        if season != self.season {
            self.season = season;
            self.round = None;
        }
    }

    pub fn select_round(&mut self, round: u32) {
        self.round = Some(round);
    }

    /// Override both comparison drivers
    pub fn select_drivers(&mut self, driver_a: impl Into<String>, driver_b: impl Into<String>) {
        self.driver_a = driver_a.into();
        self.driver_b = driver_b.into();
    }

    /// The selected race within `schedule`
    pub fn active_race<'a>(&self, schedule: &'a [RaceSummary]) -> Option<&'a RaceSummary> {
        let round = self.round?;
        schedule.iter().find(|race| race.round == round)
    }
}

/// Round of the first race starting at or after `now`, else the first race
pub fn default_round(schedule: &[RaceSummary], now: DateTime<Utc>) -> Option<u32> {
    schedule
        .iter()
        .find(|race| race.is_upcoming(now))
        .or_else(|| schedule.first())
        .map(|race| race.round)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};

    fn race(round: u32, date: (i32, u32, u32), time: Option<(u32, u32)>) -> RaceSummary {
        RaceSummary {
            round,
            race_name: format!("Race {round}"),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            time: time.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap()),
            circuit_id: format!("circuit_{round}"),
            circuit_name: format!("Circuit {round}"),
            locality: "Town".to_string(),
            country: "Country".to_string(),
        }
    }

    fn driver(id: &str) -> Driver {
        Driver {
            driver_id: id.to_string(),
            code: None,
            permanent_number: None,
            given_name: id.to_string(),
            family_name: id.to_string(),
            nationality: "Unknown".to_string(),
            date_of_birth: None,
        }
    }

    fn seasons(years: &[&str]) -> Vec<SeasonOption> {
        years.iter().map(|y| SeasonOption::from_year(*y)).collect()
    }

    #[test]
    fn test_initial_season_is_previous_year() {
        let state = SelectionState::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(state.season(), "2024");
        assert_eq!(state.round(), None);
        assert_eq!(state.driver_a(), None);
    }

    #[test]
    fn test_season_snaps_to_latest_when_absent() {
        let mut state = SelectionState::with_season("");
        assert!(state.apply_seasons(&seasons(&["2024", "2023", "2022"])));
        assert_eq!(state.season(), "2024");

        let mut state = SelectionState::with_season("2019");
        assert!(state.apply_seasons(&seasons(&["2024", "2023", "2022"])));
        assert_eq!(state.season(), "2024");
    }

    #[test]
    fn test_season_kept_when_offered() {
        let mut state = SelectionState::with_season("2023");
        assert!(!state.apply_seasons(&seasons(&["2024", "2023", "2022"])));
        assert_eq!(state.season(), "2023");

        assert!(!state.apply_seasons(&[]));
        assert_eq!(state.season(), "2023");
    }

    #[test]
    fn test_next_race_skips_past_races() {
        let schedule = vec![
            race(1, (2024, 3, 2), Some((15, 0))),
            race(2, (2024, 3, 9), Some((17, 0))),
            race(3, (2024, 3, 24), None),
        ];
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();

        let mut state = SelectionState::with_season("2024");
        state.apply_schedule(&schedule, now);
        assert_eq!(state.round(), Some(2));
        assert_eq!(state.active_race(&schedule).unwrap().race_name, "Race 2");
    }

    #[test]
    fn test_first_race_when_season_finished() {
        let schedule = vec![race(1, (2023, 3, 5), None), race(2, (2023, 3, 19), None)];
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(default_round(&schedule, now), Some(1));
        assert_eq!(default_round(&[], now), None);
    }

    #[test]
    fn test_date_only_race_compared_at_midnight() {
        let schedule = vec![race(1, (2024, 3, 2), None), race(2, (2024, 3, 9), None)];
        let midnight = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 1).unwrap();
        assert_eq!(default_round(&schedule, midnight), Some(1));
        assert_eq!(default_round(&schedule, later), Some(2));
    }

    #[test]
    fn test_schedule_reload_resets_round() {
        let schedule = vec![race(1, (2030, 3, 2), None), race(2, (2030, 3, 9), None)];
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let mut state = SelectionState::with_season("2030");
        state.select_round(2);
        state.apply_schedule(&schedule, now);
        assert_eq!(state.round(), Some(1));
    }

    #[test]
    fn test_drivers_default_to_first_two() {
        let drivers = vec![driver("max"), driver("lando"), driver("charles")];
        let mut state = SelectionState::with_season("2024");
        state.apply_drivers(&drivers);
        assert_eq!(state.driver_a(), Some("max"));
        assert_eq!(state.driver_b(), Some("lando"));
    }

    #[test]
    fn test_driver_choice_survives_reload() {
        let drivers = vec![driver("max"), driver("lando"), driver("charles")];
        let mut state = SelectionState::with_season("2024");
        state.select_drivers("charles", "gone");
        state.apply_drivers(&drivers);
        assert_eq!(state.driver_a(), Some("charles"));
        assert_eq!(state.driver_b(), Some("lando"));
    }

    #[test]
    fn test_single_driver_fills_both_slots() {
        let mut state = SelectionState::with_season("2024");
        state.apply_drivers(&[driver("max")]);
        assert_eq!(state.driver_a(), Some("max"));
        assert_eq!(state.driver_b(), Some("max"));
    }

    #[test]
    fn test_season_change_clears_round() {
        let mut state = SelectionState::with_season("2024");
        state.select_round(5);
        state.select_season("2024");
        assert_eq!(state.round(), Some(5));
        state.select_season("2023");
        assert_eq!(state.round(), None);
    }
}
