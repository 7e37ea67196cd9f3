//! Normalized Formula 1 entities
//!
//! These are the shapes every other component works with. They are produced by
//! the data access layer from remote responses or from the static fallback
//! dataset, and are never mutated after construction.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A driver entered in a season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Stable identifier, unique within a season
    pub driver_id: String,
    /// Three-letter timing code
    pub code: Option<String>,
    /// Permanent car number
    pub permanent_number: Option<u32>,
    pub given_name: String,
    pub family_name: String,
    pub nationality: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl Driver {
    /// Given and family name joined for display
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }

    /// Short tag shown next to the name: code, else car number, else nothing
    pub fn short_tag(&self) -> String {
        match (&self.code, self.permanent_number) {
            (Some(code), _) => code.clone(),
            (None, Some(number)) => number.to_string(),
            (None, None) => String::new(),
        }
    }
}

/// A constructor (team) entered in a season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constructor {
    /// Stable identifier, unique within a season
    pub constructor_id: String,
    pub name: String,
    pub nationality: String,
}

/// A driver's championship standing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverStanding {
    /// Rank, 1 = leader
    pub position: u32,
    pub points: f64,
    pub wins: u32,
    pub driver: Driver,
    /// Constructors driven for this season, in source order
    pub constructors: Vec<Constructor>,
}

/// A constructor's championship standing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorStanding {
    pub position: u32,
    pub points: f64,
    pub wins: u32,
    pub constructor: Constructor,
}

/// One race on a season's calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSummary {
    /// 1-based round; defines chronological order and joins to results
    pub round: u32,
    pub race_name: String,
    pub date: NaiveDate,
    /// Start time in UTC. `None` means the time is still to be announced.
    pub time: Option<NaiveTime>,
    pub circuit_id: String,
    pub circuit_name: String,
    pub locality: String,
    pub country: String,
}

impl RaceSummary {
    /// Instant the race starts, or midnight UTC of the race day when no time is known
    pub fn starts_at(&self) -> DateTime<Utc> {
        let time = self.time.unwrap_or(NaiveTime::MIN);
        Utc.from_utc_datetime(&self.date.and_time(time))
    }

    /// Whether the race starts at or after `now`
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.starts_at() >= now
    }
}

/// A driver's classified result in one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRaceResult {
    /// Joins to [`RaceSummary::round`] within the same season
    pub round: u32,
    pub race_name: String,
    pub points: f64,
    /// Finishing position
    pub position: u32,
    /// Starting grid slot (0 = pit lane)
    pub grid: u32,
    /// e.g. "Finished", "+1 Lap", "Engine"
    pub status: String,
}

/// A selectable season
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonOption {
    /// Four-digit year
    pub value: String,
    pub label: String,
}

impl SeasonOption {
    /// Option whose label is the year itself
    pub fn from_year(year: impl Into<String>) -> Self {
        let value = year.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Format points without a trailing `.0` for whole values
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{}", points as i64)
    } else {
        format!("{}", points)
    }
}
