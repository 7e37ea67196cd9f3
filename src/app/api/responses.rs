//! Remote response schemas and normalization
//!
//! Every endpoint answers with a JSON document wrapped in `MRData`, with all
//! numbers encoded as strings. The structs here mirror that shape exactly;
//! the `TryFrom` impls turn them into the normalized entities in
//! [`crate::app::models`]. A missing list is "no data" (`#[serde(default)]`),
//! a missing `MRData` or table object is a decode error.

use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::app::models::{
    Constructor, ConstructorStanding, Driver, DriverRaceResult, DriverStanding, RaceSummary,
    SeasonOption,
};
use crate::errors::{ApiError, ApiResult};

/// Outer wrapper shared by every response
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "MRData")]
    pub mr_data: T,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a response body
    pub fn decode(body: &str) -> ApiResult<T> {
        let envelope: Envelope<T> = serde_json::from_str(body)?;
        Ok(envelope.mr_data)
    }
}

// ----- seasons -------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SeasonsData {
    /// Total seasons available, across all pages
    #[serde(default)]
    pub total: Option<String>,
    #[serde(rename = "SeasonTable")]
    pub season_table: SeasonTable,
}

#[derive(Debug, Deserialize)]
pub struct SeasonTable {
    #[serde(rename = "Seasons", default)]
    pub seasons: Vec<SeasonRecord>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonRecord {
    pub season: String,
}

impl SeasonsData {
    /// Reported total, if present and numeric
    pub fn total(&self) -> ApiResult<Option<usize>> {
        self.total
            .as_deref()
            .map(|raw| {
                raw.trim().parse::<usize>().map_err(|_| ApiError::InvalidNumber {
                    field: "total",
                    value: raw.to_string(),
                })
            })
            .transpose()
    }

    /// Seasons on this page, most recent first
    pub fn into_options(self) -> ApiResult<Vec<SeasonOption>> {
        let mut years = self
            .season_table
            .seasons
            .into_iter()
            .map(|record| {
                parse_u32("season", &record.season).map(|year| (year, record.season))
            })
            .collect::<ApiResult<Vec<_>>>()?;

        years.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(years
            .into_iter()
            .map(|(_, season)| SeasonOption::from_year(season))
            .collect())
    }
}

// ----- standings -----------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StandingsData<L> {
    #[serde(rename = "StandingsTable")]
    pub standings_table: StandingsTable<L>,
}

#[derive(Debug, Deserialize)]
pub struct StandingsTable<L> {
    #[serde(rename = "StandingsLists", default = "Vec::new")]
    pub standings_lists: Vec<L>,
}

impl<L> StandingsData<L> {
    /// The first standings list, if the season has one
    pub fn first_list(self) -> Option<L> {
        self.standings_table.standings_lists.into_iter().next()
    }
}

#[derive(Debug, Deserialize)]
pub struct DriverStandingsList {
    #[serde(rename = "DriverStandings", default)]
    pub driver_standings: Vec<DriverStandingRecord>,
}

#[derive(Debug, Deserialize)]
pub struct DriverStandingRecord {
    /// Absent for excluded drivers; their rank is their place in the list
    #[serde(default)]
    pub position: Option<String>,
    pub points: String,
    pub wins: String,
    #[serde(rename = "Driver")]
    pub driver: DriverRecord,
    #[serde(rename = "Constructors", default)]
    pub constructors: Vec<ConstructorRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ConstructorStandingsList {
    #[serde(rename = "ConstructorStandings", default)]
    pub constructor_standings: Vec<ConstructorStandingRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ConstructorStandingRecord {
    #[serde(default)]
    pub position: Option<String>,
    pub points: String,
    pub wins: String,
    #[serde(rename = "Constructor")]
    pub constructor: ConstructorRecord,
}

impl DriverStandingsList {
    pub fn into_standings(self) -> ApiResult<Vec<DriverStanding>> {
        self.driver_standings
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                Ok(DriverStanding {
                    position: parse_position(record.position.as_deref(), index)?,
                    points: parse_points(&record.points)?,
                    wins: parse_u32("wins", &record.wins)?,
                    driver: Driver::try_from(record.driver)?,
                    constructors: record
                        .constructors
                        .into_iter()
                        .map(Constructor::from)
                        .collect(),
                })
            })
            .collect()
    }
}

impl ConstructorStandingsList {
    pub fn into_standings(self) -> ApiResult<Vec<ConstructorStanding>> {
        self.constructor_standings
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                Ok(ConstructorStanding {
                    position: parse_position(record.position.as_deref(), index)?,
                    points: parse_points(&record.points)?,
                    wins: parse_u32("wins", &record.wins)?,
                    constructor: Constructor::from(record.constructor),
                })
            })
            .collect()
    }
}

// ----- drivers and constructors --------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRecord {
    pub driver_id: String,
    #[serde(default)]
    pub permanent_number: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    pub given_name: String,
    pub family_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub nationality: String,
}

impl TryFrom<DriverRecord> for Driver {
    type Error = ApiError;

    fn try_from(record: DriverRecord) -> ApiResult<Self> {
        let permanent_number = record
            .permanent_number
            .as_deref()
            .map(|raw| parse_u32("permanentNumber", raw))
            .transpose()?;
        let date_of_birth = record
            .date_of_birth
            .as_deref()
            .map(|raw| parse_date("dateOfBirth", raw))
            .transpose()?;

        Ok(Driver {
            driver_id: record.driver_id,
            code: record.code.filter(|code| !code.is_empty()),
            permanent_number,
            given_name: record.given_name,
            family_name: record.family_name,
            nationality: record.nationality,
            date_of_birth,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct DriversData {
    #[serde(rename = "DriverTable")]
    pub driver_table: DriverTable,
}

#[derive(Debug, Deserialize)]
pub struct DriverTable {
    #[serde(rename = "Drivers", default)]
    pub drivers: Vec<DriverRecord>,
}

impl DriversData {
    pub fn into_drivers(self) -> ApiResult<Vec<Driver>> {
        self.driver_table
            .drivers
            .into_iter()
            .map(Driver::try_from)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorRecord {
    pub constructor_id: String,
    pub name: String,
    #[serde(default)]
    pub nationality: String,
}

impl From<ConstructorRecord> for Constructor {
    fn from(record: ConstructorRecord) -> Self {
        Constructor {
            constructor_id: record.constructor_id,
            name: record.name,
            nationality: record.nationality,
        }
    }
}

// ----- races ----------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RacesData<R> {
    #[serde(rename = "RaceTable")]
    pub race_table: RaceTable<R>,
}

#[derive(Debug, Deserialize)]
pub struct RaceTable<R> {
    #[serde(rename = "Races", default = "Vec::new")]
    pub races: Vec<R>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledRaceRecord {
    pub round: String,
    pub race_name: String,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(rename = "Circuit")]
    pub circuit: CircuitRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitRecord {
    pub circuit_id: String,
    pub circuit_name: String,
    #[serde(rename = "Location")]
    pub location: LocationRecord,
}

#[derive(Debug, Deserialize)]
pub struct LocationRecord {
    pub locality: String,
    pub country: String,
}

impl TryFrom<ScheduledRaceRecord> for RaceSummary {
    type Error = ApiError;

    fn try_from(record: ScheduledRaceRecord) -> ApiResult<Self> {
        Ok(RaceSummary {
            round: parse_u32("round", &record.round)?,
            race_name: record.race_name,
            date: parse_date("date", &record.date)?,
            time: record.time.as_deref().map(parse_time).transpose()?,
            circuit_id: record.circuit.circuit_id,
            circuit_name: record.circuit.circuit_name,
            locality: record.circuit.location.locality,
            country: record.circuit.location.country,
        })
    }
}

impl RacesData<ScheduledRaceRecord> {
    pub fn into_schedule(self) -> ApiResult<Vec<RaceSummary>> {
        self.race_table
            .races
            .into_iter()
            .map(RaceSummary::try_from)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRaceRecord {
    pub round: String,
    pub race_name: String,
    #[serde(rename = "Results", default)]
    pub results: Vec<ResultRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ResultRecord {
    pub points: String,
    pub position: String,
    pub grid: String,
    pub status: String,
}

impl RacesData<ResultRaceRecord> {
    /// One result per race that has one; races without results are skipped
    pub fn into_results(self) -> ApiResult<Vec<DriverRaceResult>> {
        let mut results = Vec::new();
        for race in self.race_table.races {
            let Some(result) = race.results.into_iter().next() else {
                continue;
            };
            results.push(DriverRaceResult {
                round: parse_u32("round", &race.round)?,
                race_name: race.race_name,
                points: parse_points(&result.points)?,
                position: parse_u32("position", &result.position)?,
                grid: parse_u32("grid", &result.grid)?,
                status: result.status,
            });
        }
        Ok(results)
    }
}

// ----- field parsing ----------------------------------------------------------

fn parse_u32(field: &'static str, raw: &str) -> ApiResult<u32> {
    raw.trim().parse().map_err(|_| ApiError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn parse_points(raw: &str) -> ApiResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(points) if points.is_finite() && points >= 0.0 => Ok(points),
        _ => Err(ApiError::InvalidNumber {
            field: "points",
            value: raw.to_string(),
        }),
    }
}

fn parse_position(raw: Option<&str>, index: usize) -> ApiResult<u32> {
    match raw {
        Some(raw) => parse_u32("position", raw),
        None => Ok(index as u32 + 1),
    }
}

fn parse_date(field: &'static str, raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ApiError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

/// Race times come as `HH:MM:SSZ`, always UTC
fn parse_time(raw: &str) -> ApiResult<NaiveTime> {
    let trimmed = raw.trim().trim_end_matches('Z');
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f").map_err(|_| ApiError::InvalidTime {
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_variants() {
        assert_eq!(
            parse_time("15:00:00Z").unwrap(),
            NaiveTime::from_hms_opt(15, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time("04:00:00").unwrap(),
            NaiveTime::from_hms_opt(4, 0, 0).unwrap()
        );
        assert!(parse_time("TBA").is_err());
    }

    #[test]
    fn test_parse_points_accepts_half_points() {
        assert_eq!(parse_points("12.5").unwrap(), 12.5);
        assert_eq!(parse_points("25").unwrap(), 25.0);
        assert!(parse_points("-1").is_err());
        assert!(parse_points("").is_err());
    }

    #[test]
    fn test_seasons_sorted_most_recent_first() {
        let body = r#"{"MRData":{"total":"3","SeasonTable":{"Seasons":[
            {"season":"2022"},{"season":"2023"},{"season":"2024"}]}}}"#;
        let data = Envelope::<SeasonsData>::decode(body).unwrap();
        assert_eq!(data.total().unwrap(), Some(3));

        let values: Vec<String> = data
            .into_options()
            .unwrap()
            .into_iter()
            .map(|season| season.value)
            .collect();
        assert_eq!(values, vec!["2024", "2023", "2022"]);
    }

    #[test]
    fn test_missing_standings_lists_is_no_data() {
        let body = r#"{"MRData":{"StandingsTable":{"season":"1949"}}}"#;
        let data = Envelope::<StandingsData<DriverStandingsList>>::decode(body).unwrap();
        assert!(data.first_list().is_none());
    }

    #[test]
    fn test_missing_mrdata_is_decode_error() {
        let result = Envelope::<DriversData>::decode(r#"{"error":"not found"}"#);
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_missing_position_uses_list_place() {
        let body = r#"{"MRData":{"StandingsTable":{"StandingsLists":[{"DriverStandings":[
            {"position":"1","points":"78","wins":"7",
             "Driver":{"driverId":"villeneuve","givenName":"Jacques","familyName":"Villeneuve","nationality":"Canadian"},
             "Constructors":[{"constructorId":"williams","name":"Williams","nationality":"British"}]},
            {"points":"78","wins":"5",
             "Driver":{"driverId":"michael_schumacher","givenName":"Michael","familyName":"Schumacher","nationality":"German"},
             "Constructors":[{"constructorId":"ferrari","name":"Ferrari","nationality":"Italian"}]}
        ]}]}}}"#;
        let list = Envelope::<StandingsData<DriverStandingsList>>::decode(body)
            .unwrap()
            .first_list()
            .unwrap();
        let standings = list.into_standings().unwrap();
        assert_eq!(standings[1].position, 2);
        assert_eq!(standings[1].driver.driver_id, "michael_schumacher");
    }

    #[test]
    fn test_result_races_without_results_are_skipped() {
        let body = r#"{"MRData":{"RaceTable":{"Races":[
            {"round":"1","raceName":"Bahrain Grand Prix","Results":[
                {"points":"25","position":"1","grid":"1","status":"Finished"}]},
            {"round":"2","raceName":"Saudi Arabian Grand Prix","Results":[]},
            {"round":"3","raceName":"Australian Grand Prix","Results":[
                {"points":"0","position":"19","grid":"1","status":"Brakes"}]}
        ]}}}"#;
        let results = Envelope::<RacesData<ResultRaceRecord>>::decode(body)
            .unwrap()
            .into_results()
            .unwrap();

        let rounds: Vec<u32> = results.iter().map(|r| r.round).collect();
        assert_eq!(rounds, vec![1, 3]);
        assert_eq!(results[1].status, "Brakes");
    }

    #[test]
    fn test_non_numeric_round_fails_whole_schedule() {
        let body = r#"{"MRData":{"RaceTable":{"Races":[
            {"round":"one","raceName":"Bahrain Grand Prix","date":"2024-03-02",
             "Circuit":{"circuitId":"bahrain","circuitName":"Bahrain International Circuit",
                        "Location":{"locality":"Sakhir","country":"Bahrain"}}}
        ]}}}"#;
        let result = Envelope::<RacesData<ScheduledRaceRecord>>::decode(body)
            .unwrap()
            .into_schedule();
        assert!(matches!(
            result,
            Err(ApiError::InvalidNumber { field: "round", .. })
        ));
    }
}
