use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::lookups::{DayOfWeek, Season, TimeOfDay};
use crate::models::StagingRecord;
use crate::utils::constants::HOURLY_FACT_TABLE;
use crate::validation::{Relation, Value};

/// One row of `fct_hourly_rentals`.
///
/// Carries every staging column plus three categorical labels. A label is `None`
/// when its source code is null or outside its domain; the test suite reports those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRentalFact {
    pub record_id: u32,
    pub date: NaiveDate,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub hour: Option<i32>,
    pub season_id: Option<i32>,
    pub season_name: Option<String>,
    pub weekday_id: Option<i32>,
    pub day_name: Option<String>,
    pub time_of_day: Option<String>,
    pub weather_id: Option<i32>,
    pub is_holiday: Option<bool>,
    pub is_workingday: Option<bool>,
    pub temp_celsius: Option<f64>,
    pub feels_like_celsius: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub windspeed_kmh: Option<f64>,
    pub casual_users: Option<i64>,
    pub registered_users: Option<i64>,
    pub total_rentals: Option<i64>,
}

pub const HOURLY_FACT_COLUMNS: [&str; 20] = [
    "record_id",
    "date",
    "year",
    "month",
    "hour",
    "season_id",
    "season_name",
    "weekday_id",
    "day_name",
    "time_of_day",
    "weather_id",
    "is_holiday",
    "is_workingday",
    "temp_celsius",
    "feels_like_celsius",
    "humidity_percent",
    "windspeed_kmh",
    "casual_users",
    "registered_users",
    "total_rentals",
];

impl HourlyRentalFact {
    pub fn from_staging(record: &StagingRecord) -> Self {
        let season_name = record
            .season_id
            .and_then(Season::from_code)
            .map(|s| s.name().to_string());
        let day_name = record
            .weekday_id
            .and_then(DayOfWeek::from_code)
            .map(|d| d.name().to_string());
        let time_of_day = record
            .hour
            .and_then(TimeOfDay::from_hour)
            .map(|t| t.name().to_string());

        Self {
            record_id: record.record_id,
            date: record.date,
            year: record.year,
            month: record.month,
            hour: record.hour,
            season_id: record.season_id,
            season_name,
            weekday_id: record.weekday_id,
            day_name,
            time_of_day,
            weather_id: record.weather_id,
            is_holiday: record.is_holiday,
            is_workingday: record.is_workingday,
            temp_celsius: record.temp_celsius,
            feels_like_celsius: record.feels_like_celsius,
            humidity_percent: record.humidity_percent,
            windspeed_kmh: record.windspeed_kmh,
            casual_users: record.casual_users,
            registered_users: record.registered_users,
            total_rentals: record.total_rentals,
        }
    }

    pub fn is_weekend(&self) -> bool {
        self.weekday_id
            .and_then(DayOfWeek::from_code)
            .is_some_and(|d| d.is_weekend())
    }

    pub fn is_rush_hour(&self) -> bool {
        self.hour
            .and_then(TimeOfDay::from_hour)
            .is_some_and(|t| t.is_rush_hour())
    }

    pub fn casual_share(&self) -> Option<f64> {
        match (self.casual_users, self.total_rentals) {
            (Some(casual), Some(total)) if total > 0 => Some(casual as f64 / total as f64),
            _ => None,
        }
    }
}

impl Relation for HourlyRentalFact {
    const NAME: &'static str = HOURLY_FACT_TABLE;

    fn columns() -> &'static [&'static str] {
        &HOURLY_FACT_COLUMNS
    }

    fn value(&self, column: &str) -> Option<Value> {
        let value: Value = match column {
            "record_id" => self.record_id.into(),
            "date" => self.date.into(),
            "year" => self.year.into(),
            "month" => self.month.into(),
            "hour" => self.hour.into(),
            "season_id" => self.season_id.into(),
            "season_name" => self.season_name.as_deref().into(),
            "weekday_id" => self.weekday_id.into(),
            "day_name" => self.day_name.as_deref().into(),
            "time_of_day" => self.time_of_day.as_deref().into(),
            "weather_id" => self.weather_id.into(),
            "is_holiday" => self.is_holiday.into(),
            "is_workingday" => self.is_workingday.into(),
            "temp_celsius" => self.temp_celsius.into(),
            "feels_like_celsius" => self.feels_like_celsius.into(),
            "humidity_percent" => self.humidity_percent.into(),
            "windspeed_kmh" => self.windspeed_kmh.into(),
            "casual_users" => self.casual_users.into(),
            "registered_users" => self.registered_users.into(),
            "total_rentals" => self.total_rentals.into(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staging(hour: Option<i32>, season: Option<i32>, weekday: Option<i32>) -> StagingRecord {
        StagingRecord {
            record_id: 8,
            date: NaiveDate::from_ymd_opt(2011, 1, 2).unwrap(),
            year: Some(2011),
            month: Some(1),
            hour,
            season_id: season,
            weekday_id: weekday,
            weather_id: Some(2),
            is_holiday: Some(false),
            is_workingday: Some(false),
            temp_celsius: Some(9.84),
            feels_like_celsius: Some(14.395),
            humidity_percent: Some(75.0),
            windspeed_kmh: Some(0.0),
            casual_users: Some(1),
            registered_users: Some(7),
            total_rentals: Some(8),
        }
    }

    #[test]
    fn test_known_row_labels() {
        let fact = HourlyRentalFact::from_staging(&staging(Some(7), Some(1), Some(0)));

        assert_eq!(fact.time_of_day.as_deref(), Some("Morning Rush"));
        assert_eq!(fact.season_name.as_deref(), Some("Spring"));
        assert_eq!(fact.day_name.as_deref(), Some("Sunday"));
        assert!(fact.is_weekend());
        assert!(fact.is_rush_hour());
        assert_eq!(fact.casual_share(), Some(0.125));
    }

    #[test]
    fn test_out_of_domain_codes_yield_null_labels() {
        let fact = HourlyRentalFact::from_staging(&staging(Some(24), Some(0), Some(9)));

        assert_eq!(fact.time_of_day, None);
        assert_eq!(fact.season_name, None);
        assert_eq!(fact.day_name, None);
        assert_eq!(fact.value("season_name"), Some(Value::Null));
        assert_eq!(fact.hour, Some(24));
    }
}
