use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::constants::STAGING_TABLE;
use crate::validation::{Relation, Value};

/// A raw hour with physical units and readable names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingRecord {
    pub record_id: u32,
    pub date: NaiveDate,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub hour: Option<i32>,
    pub season_id: Option<i32>,
    pub weekday_id: Option<i32>,
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

pub const STAGING_COLUMNS: [&str; 17] = [
    "record_id",
    "date",
    "year",
    "month",
    "hour",
    "season_id",
    "weekday_id",
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

impl Relation for StagingRecord {
    const NAME: &'static str = STAGING_TABLE;

    fn columns() -> &'static [&'static str] {
        &STAGING_COLUMNS
    }

    fn value(&self, column: &str) -> Option<Value> {
        let value: Value = match column {
            "record_id" => self.record_id.into(),
            "date" => self.date.into(),
            "year" => self.year.into(),
            "month" => self.month.into(),
            "hour" => self.hour.into(),
            "season_id" => self.season_id.into(),
            "weekday_id" => self.weekday_id.into(),
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
