use serde::{Deserialize, Serialize};

use crate::utils::constants::WEATHER_DIM_TABLE;
use crate::validation::{Relation, Value};

/// One row of `dim_weather`: a weather code, its label, and averages over every hour with that code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDimension {
    pub weather_id: i32,
    pub weather_desc: String,
    pub avg_temp_celsius: Option<f64>,
    pub avg_feels_like_celsius: Option<f64>,
    pub avg_humidity_percent: Option<f64>,
    pub avg_windspeed_kmh: Option<f64>,
    pub observation_count: u32,
}

pub const WEATHER_DIM_COLUMNS: [&str; 7] = [
    "weather_id",
    "weather_desc",
    "avg_temp_celsius",
    "avg_feels_like_celsius",
    "avg_humidity_percent",
    "avg_windspeed_kmh",
    "observation_count",
];

impl Relation for WeatherDimension {
    const NAME: &'static str = WEATHER_DIM_TABLE;

    fn columns() -> &'static [&'static str] {
        &WEATHER_DIM_COLUMNS
    }

    fn value(&self, column: &str) -> Option<Value> {
        let value: Value = match column {
            "weather_id" => self.weather_id.into(),
            "weather_desc" => self.weather_desc.as_str().into(),
            "avg_temp_celsius" => self.avg_temp_celsius.into(),
            "avg_feels_like_celsius" => self.avg_feels_like_celsius.into(),
            "avg_humidity_percent" => self.avg_humidity_percent.into(),
            "avg_windspeed_kmh" => self.avg_windspeed_kmh.into(),
            "observation_count" => self.observation_count.into(),
            _ => return None,
        };
        Some(value)
    }
}
