use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{PipelineError, Result};
use crate::utils::constants::{RAW_TABLE, REQUIRED_RAW_COLUMNS};
use crate::validation::{Relation, Value};

/// One observed hour exactly as it appears in `hour.csv`.
///
/// Codes and counts decode as signed integers so that any out-of-domain number survives
/// the read and is reported by the range checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RawRecord {
    pub instant: u32,
    pub dteday: NaiveDate,

    #[validate(range(min = 1, max = 4))]
    pub season: Option<i32>,

    #[validate(range(min = 0, max = 1))]
    pub yr: Option<i32>,

    #[validate(range(min = 1, max = 12))]
    pub mnth: Option<i32>,

    #[validate(range(min = 0, max = 23))]
    pub hr: Option<i32>,

    #[validate(range(min = 0, max = 1))]
    pub holiday: Option<i32>,

    #[validate(range(min = 0, max = 6))]
    pub weekday: Option<i32>,

    #[validate(range(min = 0, max = 1))]
    pub workingday: Option<i32>,

    #[validate(range(min = 1, max = 4))]
    pub weathersit: Option<i32>,

    // Normalised 0-1 metrics
    #[validate(range(min = 0.0, max = 1.0))]
    pub temp: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub atemp: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub hum: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub windspeed: Option<f64>,

    #[validate(range(min = 0))]
    pub casual: Option<i64>,

    #[validate(range(min = 0))]
    pub registered: Option<i64>,

    #[validate(range(min = 0))]
    pub cnt: Option<i64>,
}

impl RawRecord {
    /// A complete row with every field present.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instant: u32,
        dteday: NaiveDate,
        season: i32,
        yr: i32,
        mnth: i32,
        hr: i32,
        holiday: i32,
        weekday: i32,
        workingday: i32,
        weathersit: i32,
        temp: f64,
        atemp: f64,
        hum: f64,
        windspeed: f64,
        casual: i64,
        registered: i64,
        cnt: i64,
    ) -> Self {
        Self {
            instant,
            dteday,
            season: Some(season),
            yr: Some(yr),
            mnth: Some(mnth),
            hr: Some(hr),
            holiday: Some(holiday),
            weekday: Some(weekday),
            workingday: Some(workingday),
            weathersit: Some(weathersit),
            temp: Some(temp),
            atemp: Some(atemp),
            hum: Some(hum),
            windspeed: Some(windspeed),
            casual: Some(casual),
            registered: Some(registered),
            cnt: Some(cnt),
        }
    }

    /// `cnt` must equal `casual + registered` when all three are present.
    pub fn validate_relationships(&self) -> Result<()> {
        if let (Some(casual), Some(registered), Some(cnt)) = (self.casual, self.registered, self.cnt)
        {
            if casual.checked_add(registered) != Some(cnt) {
                return Err(PipelineError::InvalidFormat(format!(
                    "cnt {} != casual {} + registered {}",
                    cnt, casual, registered
                )));
            }
        }
        Ok(())
    }
}

impl Relation for RawRecord {
    const NAME: &'static str = RAW_TABLE;

    fn columns() -> &'static [&'static str] {
        &REQUIRED_RAW_COLUMNS
    }

    fn value(&self, column: &str) -> Option<Value> {
        let value: Value = match column {
            "instant" => self.instant.into(),
            "dteday" => self.dteday.into(),
            "season" => self.season.into(),
            "yr" => self.yr.into(),
            "mnth" => self.mnth.into(),
            "hr" => self.hr.into(),
            "holiday" => self.holiday.into(),
            "weekday" => self.weekday.into(),
            "workingday" => self.workingday.into(),
            "weathersit" => self.weathersit.into(),
            "temp" => self.temp.into(),
            "atemp" => self.atemp.into(),
            "hum" => self.hum.into(),
            "windspeed" => self.windspeed.into(),
            "casual" => self.casual.into(),
            "registered" => self.registered.into(),
            "cnt" => self.cnt.into(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawRecord {
        let date = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap();
        RawRecord::new(1, date, 1, 0, 1, 0, 0, 6, 0, 1, 0.24, 0.2879, 0.81, 0.0, 3, 13, 16)
    }

    #[test]
    fn test_valid_record() {
        let record = sample();
        assert!(record.validate().is_ok());
        assert!(record.validate_relationships().is_ok());
    }

    #[test]
    fn test_out_of_domain_codes() {
        let mut record = sample();
        record.season = Some(5);
        record.hr = Some(24);

        let errors = record.validate().unwrap_err();
        let fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        assert!(fields.contains(&"season".to_string()));
        assert!(fields.contains(&"hr".to_string()));
    }

    #[test]
    fn test_count_mismatch() {
        let mut record = sample();
        record.cnt = Some(17);
        assert!(record.validate_relationships().is_err());
    }

    #[test]
    fn test_negative_and_wide_codes() {
        let mut record = sample();
        record.hr = Some(-1);
        record.weathersit = Some(300);
        record.casual = Some(-3);

        let errors = record.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("hr"));
        assert!(fields.contains_key("weathersit"));
        assert!(fields.contains_key("casual"));
    }

    #[test]
    fn test_huge_counts_do_not_overflow() {
        let mut record = sample();
        record.casual = Some(i64::MAX);
        record.registered = Some(1);
        record.cnt = Some(16);
        assert!(record.validate_relationships().is_err());

        record.casual = Some(4_000_000_000);
        record.registered = Some(4_000_000_000);
        record.cnt = Some(8_000_000_000);
        assert!(record.validate_relationships().is_ok());
    }

    #[test]
    fn test_relation_values() {
        let mut record = sample();
        record.hum = None;

        assert_eq!(record.value("instant"), Some(Value::Int(1)));
        assert_eq!(record.value("hum"), Some(Value::Null));
        assert_eq!(record.value("nope"), None);
    }
}
