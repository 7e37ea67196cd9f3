//! Static fallback dataset
//!
//! A hand-authored snapshot of a season in the normalized entity shapes. It is
//! served whole whenever a remote call fails, so the dashboard always has
//! something to render. Any change to the entity structs in
//! [`crate::app::models`] must be mirrored here.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

use crate::app::models::{
    Constructor, ConstructorStanding, Driver, DriverRaceResult, DriverStanding, RaceSummary,
    SeasonOption,
};
use crate::constants::fallback;

/// Substitute data for every data access operation
#[derive(Debug, Clone)]
pub struct FallbackData {
    pub seasons: Vec<SeasonOption>,
    pub drivers: Vec<Driver>,
    pub driver_standings: Vec<DriverStanding>,
    pub constructor_standings: Vec<ConstructorStanding>,
    pub schedule: Vec<RaceSummary>,
    pub results_by_driver: HashMap<String, Vec<DriverRaceResult>>,
}

impl Default for FallbackData {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FallbackData {
    /// Dataset with no entries at all
    pub fn empty() -> Self {
        Self {
            seasons: Vec::new(),
            drivers: Vec::new(),
            driver_standings: Vec::new(),
            constructor_standings: Vec::new(),
            schedule: Vec::new(),
            results_by_driver: HashMap::new(),
        }
    }

    /// The built-in snapshot shipped with the crate
    pub fn builtin() -> Self {
        let drivers = vec![
            driver("max_verstappen", "VER", 1, "Max", "Verstappen", "Dutch", (1997, 9, 30)),
            driver("lewis_hamilton", "HAM", 44, "Lewis", "Hamilton", "British", (1985, 1, 7)),
            driver("charles_leclerc", "LEC", 16, "Charles", "Leclerc", "Monégasque", (1997, 10, 16)),
            driver("lando_norris", "NOR", 4, "Lando", "Norris", "British", (1999, 11, 13)),
        ];

        let red_bull = constructor("red_bull", "Oracle Red Bull Racing", "Austrian");
        let ferrari = constructor("ferrari", "Scuderia Ferrari", "Italian");
        let mclaren = constructor("mclaren", "McLaren F1 Team", "British");
        let mercedes = constructor("mercedes", "Mercedes-AMG Petronas F1 Team", "German");

        let driver_standings = vec![
            driver_standing(1, 437.0, 15, &drivers[0], &red_bull),
            driver_standing(2, 289.0, 3, &drivers[2], &ferrari),
            driver_standing(3, 276.0, 0, &drivers[3], &mclaren),
            driver_standing(4, 250.0, 1, &drivers[1], &mercedes),
        ];

        let constructor_standings = vec![
            constructor_standing(1, 782.0, 17, red_bull),
            constructor_standing(2, 562.0, 3, ferrari),
            constructor_standing(3, 504.0, 0, mclaren),
            constructor_standing(4, 470.0, 1, mercedes),
        ];

        let schedule = vec![
            race(1, "Bahrain Grand Prix", (2024, 3, 2), 15, "bahrain", "Bahrain International Circuit", "Sakhir", "Bahrain"),
            race(2, "Saudi Arabian Grand Prix", (2024, 3, 9), 17, "jeddah", "Jeddah Corniche Circuit", "Jeddah", "Saudi Arabia"),
            race(3, "Australian Grand Prix", (2024, 3, 24), 4, "albert_park", "Albert Park Circuit", "Melbourne", "Australia"),
            race(4, "Japanese Grand Prix", (2024, 4, 7), 5, "suzuka", "Suzuka Circuit", "Suzuka", "Japan"),
        ];

        // (points, position, grid) per round, rounds 1..=4
        let table: [(&str, [(f64, u32, u32); 4]); 4] = [
            ("max_verstappen", [(25.0, 1, 1), (25.0, 1, 2), (18.0, 2, 1), (25.0, 1, 1)]),
            ("lewis_hamilton", [(12.0, 4, 6), (10.0, 5, 8), (15.0, 3, 5), (18.0, 2, 4)]),
            ("charles_leclerc", [(18.0, 2, 2), (18.0, 2, 1), (25.0, 1, 1), (15.0, 3, 2)]),
            ("lando_norris", [(15.0, 3, 4), (12.0, 4, 5), (12.0, 4, 3), (12.0, 4, 3)]),
        ];

        let results_by_driver = table
            .iter()
            .map(|(driver_id, rounds)| {
                let results = rounds
                    .iter()
                    .zip(&schedule)
                    .map(|(&(points, position, grid), race)| DriverRaceResult {
                        round: race.round,
                        race_name: race.race_name.clone(),
                        points,
                        position,
                        grid,
                        status: "Finished".to_string(),
                    })
                    .collect();
                (driver_id.to_string(), results)
            })
            .collect();

        Self {
            seasons: builtin_seasons(),
            drivers,
            driver_standings,
            constructor_standings,
            schedule,
            results_by_driver,
        }
    }

    /// Results for a driver, or an empty list if the driver is not in the snapshot
    pub fn results_for(&self, driver_id: &str) -> Vec<DriverRaceResult> {
        self.results_by_driver
            .get(driver_id)
            .cloned()
            .unwrap_or_default()
    }
}

/// Fixed-length list of seasons counting down from the latest snapshot season
fn builtin_seasons() -> Vec<SeasonOption> {
    (0..fallback::SEASON_COUNT as u16)
        .map(|offset| SeasonOption::from_year((fallback::LATEST_SEASON - offset).to_string()))
        .collect()
}

fn driver(
    driver_id: &str,
    code: &str,
    number: u32,
    given_name: &str,
    family_name: &str,
    nationality: &str,
    (year, month, day): (i32, u32, u32),
) -> Driver {
    Driver {
        driver_id: driver_id.to_string(),
        code: Some(code.to_string()),
        permanent_number: Some(number),
        given_name: given_name.to_string(),
        family_name: family_name.to_string(),
        nationality: nationality.to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(year, month, day),
    }
}

fn constructor(constructor_id: &str, name: &str, nationality: &str) -> Constructor {
    Constructor {
        constructor_id: constructor_id.to_string(),
        name: name.to_string(),
        nationality: nationality.to_string(),
    }
}

fn driver_standing(
    position: u32,
    points: f64,
    wins: u32,
    driver: &Driver,
    constructor: &Constructor,
) -> DriverStanding {
    DriverStanding {
        position,
        points,
        wins,
        driver: driver.clone(),
        constructors: vec![constructor.clone()],
    }
}

fn constructor_standing(
    position: u32,
    points: f64,
    wins: u32,
    constructor: Constructor,
) -> ConstructorStanding {
    ConstructorStanding {
        position,
        points,
        wins,
        constructor,
    }
}

#[allow(clippy::too_many_arguments)]
fn race(
    round: u32,
    race_name: &str,
    (year, month, day): (i32, u32, u32),
    hour: u32,
    circuit_id: &str,
    circuit_name: &str,
    locality: &str,
    country: &str,
) -> RaceSummary {
    RaceSummary {
        round,
        race_name: race_name.to_string(),
        date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
        time: NaiveTime::from_hms_opt(hour, 0, 0),
        circuit_id: circuit_id.to_string(),
        circuit_name: circuit_name.to_string(),
        locality: locality.to_string(),
        country: country.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_seasons_descending() {
        let data = FallbackData::builtin();
        assert_eq!(data.seasons.len(), fallback::SEASON_COUNT);
        assert_eq!(data.seasons[0].value, "2024");
        assert_eq!(data.seasons[14].value, "2010");
    }

    #[test]
    fn test_builtin_standings_in_position_order() {
        let data = FallbackData::builtin();
        let positions: Vec<u32> = data.driver_standings.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_results_join_to_schedule() {
        let data = FallbackData::builtin();
        for driver in &data.drivers {
            let results = data.results_for(&driver.driver_id);
            assert_eq!(results.len(), data.schedule.len());
            for (result, race) in results.iter().zip(&data.schedule) {
                assert_eq!(result.round, race.round);
                assert_eq!(result.race_name, race.race_name);
            }
        }
    }

    #[test]
    fn test_driver_nationalities_keep_accents() {
        let data = FallbackData::builtin();
        let leclerc = data
            .drivers
            .iter()
            .find(|driver| driver.driver_id == "charles_leclerc")
            .unwrap();
        assert_eq!(leclerc.nationality, "Monégasque");
    }

    #[test]
    fn test_unknown_driver_has_no_results() {
        assert!(FallbackData::builtin().results_for("juan_fangio").is_empty());
    }
}
