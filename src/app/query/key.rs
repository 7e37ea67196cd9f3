//! Cache keys
//!
//! A key is the tuple of operation and parameter values. Two keys that differ
//! in any parameter are independent cache entries.

use std::fmt;
use std::hash::Hash;

/// Requirements for anything used as a query cache key
pub trait CacheKey: Clone + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static {
    /// Whether every required parameter is present
    ///
    /// Disabled keys never reach the loader.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Keys for the dashboard's six data access operations
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Seasons { min_count: usize },
    DriverStandings { season: String },
    ConstructorStandings { season: String },
    RaceSchedule { season: String },
    Drivers { season: String },
    DriverResults {
        season: String,
        driver_id: Option<String>,
    },
}

impl QueryKey {
    /// Operation name, used as the first key segment
    pub fn operation(&self) -> &'static str {
        match self {
            QueryKey::Seasons { .. } => "seasons",
            QueryKey::DriverStandings { .. } => "driver-standings",
            QueryKey::ConstructorStandings { .. } => "constructor-standings",
            QueryKey::RaceSchedule { .. } => "race-schedule",
            QueryKey::Drivers { .. } => "drivers",
            QueryKey::DriverResults { .. } => "driver-results",
        }
    }

    /// Season parameter, if the operation takes one
    pub fn season(&self) -> Option<&str> {
        match self {
            QueryKey::Seasons { .. } => None,
            QueryKey::DriverStandings { season }
            | QueryKey::ConstructorStandings { season }
            | QueryKey::RaceSchedule { season }
            | QueryKey::Drivers { season }
            | QueryKey::DriverResults { season, .. } => Some(season),
        }
    }
}

fn present(value: &str) -> bool {
    !value.trim().is_empty()
}

impl CacheKey for QueryKey {
    fn is_enabled(&self) -> bool {
        match self {
            QueryKey::Seasons { .. } => true,
            QueryKey::DriverResults { season, driver_id } => {
                present(season) && driver_id.as_deref().is_some_and(present)
            }
            other => other.season().is_some_and(present),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::Seasons { min_count } => write!(f, "seasons/{min_count}"),
            QueryKey::DriverResults { season, driver_id } => write!(
                f,
                "driver-results/{}/{}",
                season,
                driver_id.as_deref().unwrap_or("")
            ),
            other => write!(f, "{}/{}", other.operation(), other.season().unwrap_or("")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_requires_parameters() {
        assert!(QueryKey::Seasons { min_count: 60 }.is_enabled());
        assert!(QueryKey::Drivers {
            season: "2024".to_string()
        }
        .is_enabled());
        assert!(!QueryKey::Drivers {
            season: "  ".to_string()
        }
        .is_enabled());
        assert!(!QueryKey::DriverResults {
            season: "2024".to_string(),
            driver_id: None,
        }
        .is_enabled());
        assert!(!QueryKey::DriverResults {
            season: "2024".to_string(),
            driver_id: Some(String::new()),
        }
        .is_enabled());
        assert!(QueryKey::DriverResults {
            season: "2024".to_string(),
            driver_id: Some("max_verstappen".to_string()),
        }
        .is_enabled());
    }

    #[test]
    fn test_display_includes_parameters() {
        let key = QueryKey::DriverResults {
            season: "2024".to_string(),
            driver_id: Some("lando_norris".to_string()),
        };
        assert_eq!(key.to_string(), "driver-results/2024/lando_norris");

        let key = QueryKey::RaceSchedule {
            season: "2023".to_string(),
        };
        assert_eq!(key.to_string(), "race-schedule/2023");
    }

    #[test]
    fn test_parameters_distinguish_keys() {
        let a = QueryKey::DriverStandings {
            season: "2023".to_string(),
        };
        let b = QueryKey::DriverStandings {
            season: "2024".to_string(),
        };
        let c = QueryKey::ConstructorStandings {
            season: "2024".to_string(),
        };
        assert_ne!(a, b);
        assert_ne!(b, c);
    }
}
