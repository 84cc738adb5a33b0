use std::collections::BTreeMap;
use tracing::debug;

use crate::models::lookups::weather_description;
use crate::models::{StagingRecord, WeatherDimension};

/// Running mean that skips nulls in both the sum and the count.
#[derive(Debug, Clone, Copy, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Default)]
struct WeatherGroup {
    temp: Mean,
    feels_like: Mean,
    humidity: Mean,
    windspeed: Mean,
    rows: u32,
}

pub struct WeatherDimensionBuilder;

impl WeatherDimensionBuilder {
    pub fn new() -> Self {
        Self
    }

    /// One row per weather code present, keyed on the integer code. Rows come out in
    /// ascending `weather_id` so reruns produce identical files.
    pub fn build(&self, staging: &[StagingRecord]) -> Vec<WeatherDimension> {
        let mut groups: BTreeMap<i32, WeatherGroup> = BTreeMap::new();

        for record in staging {
            let Some(code) = record.weather_id else {
                continue;
            };
            let group = groups.entry(code).or_default();
            group.temp.add(record.temp_celsius);
            group.feels_like.add(record.feels_like_celsius);
            group.humidity.add(record.humidity_percent);
            group.windspeed.add(record.windspeed_kmh);
            group.rows += 1;
        }

        let dimension: Vec<WeatherDimension> = groups
            .into_iter()
            .map(|(code, group)| WeatherDimension {
                weather_id: code,
                weather_desc: weather_description(code).to_string(),
                avg_temp_celsius: group.temp.value(),
                avg_feels_like_celsius: group.feels_like.value(),
                avg_humidity_percent: group.humidity.value(),
                avg_windspeed_kmh: group.windspeed.value(),
                observation_count: group.rows,
            })
            .collect();

        debug!("Built {} weather dimension rows", dimension.len());
        dimension
    }
}

impl Default for WeatherDimensionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
