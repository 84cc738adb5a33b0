use tracing::{debug, warn};
use validator::Validate;

use crate::models::{RawRecord, StagingRecord};
use crate::utils::constants::{
    ATEMP_SCALE_CELSIUS, BASE_YEAR, HUMIDITY_SCALE_PERCENT, TEMP_SCALE_CELSIUS,
    WINDSPEED_SCALE_KMH,
};
use crate::validation::DomainViolation;

/// Staged rows plus every domain problem noticed on the way.
#[derive(Debug, Clone, Default)]
pub struct StagingOutput {
    pub records: Vec<StagingRecord>,
    pub violations: Vec<DomainViolation>,
}

pub struct StagingTransformer;

impl StagingTransformer {
    pub fn new() -> Self {
        Self
    }

    /// One staging row per raw row, in input order. Out-of-domain values are carried
    /// through unchanged and reported, never dropped or corrected.
    pub fn transform(&self, raw: &[RawRecord]) -> StagingOutput {
        let mut output = StagingOutput {
            records: Vec::with_capacity(raw.len()),
            violations: Vec::new(),
        };

        for record in raw {
            self.check_domains(record, &mut output.violations);
            output.records.push(self.stage_record(record));
        }

        if !output.violations.is_empty() {
            warn!(
                "{} domain violation(s) found while staging {} rows",
                output.violations.len(),
                raw.len()
            );
        }
        debug!("Staged {} records", output.records.len());

        output
    }

    pub fn stage_record(&self, raw: &RawRecord) -> StagingRecord {
        StagingRecord {
            record_id: raw.instant,
            date: raw.dteday,
            year: raw.yr.map(|y| BASE_YEAR.saturating_add(y)),
            month: raw.mnth,
            hour: raw.hr,
            season_id: raw.season,
            weekday_id: raw.weekday,
            weather_id: raw.weathersit,
            is_holiday: raw.holiday.and_then(flag),
            is_workingday: raw.workingday.and_then(flag),
            temp_celsius: raw.temp.map(|t| t * TEMP_SCALE_CELSIUS),
            feels_like_celsius: raw.atemp.map(|t| t * ATEMP_SCALE_CELSIUS),
            humidity_percent: raw.hum.map(|h| h * HUMIDITY_SCALE_PERCENT),
            windspeed_kmh: raw.windspeed.map(|w| w * WINDSPEED_SCALE_KMH),
            casual_users: raw.casual,
            registered_users: raw.registered,
            total_rentals: raw.cnt,
        }
    }

    fn check_domains(&self, record: &RawRecord, violations: &mut Vec<DomainViolation>) {
        if let Err(errors) = record.validate() {
            let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));

            for (field, field_errors) in fields {
                for error in field_errors.iter() {
                    let value = error
                        .params
                        .get("value")
                        .map(|v| v.to_string())
                        .unwrap_or_default();
                    violations.push(DomainViolation {
                        record_id: record.instant,
                        field: field.to_string(),
                        details: format!("{} failed {} check", value, error.code),
                    });
                }
            }
        }

        if let Err(e) = record.validate_relationships() {
            violations.push(DomainViolation {
                record_id: record.instant,
                field: "cnt".to_string(),
                details: e.to_string(),
            });
        }
    }
}

fn flag(code: i32) -> Option<bool> {
    match code {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

impl Default for StagingTransformer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(instant: u32, hr: i32, weathersit: i32) -> RawRecord {
        let date = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap();
        RawRecord::new(
            instant, date, 1, 1, 1, hr, 0, 6, 0, weathersit, 0.5, 0.4, 0.81, 0.2, 3, 13, 16,
        )
    }

    #[test]
    fn test_unit_conversions() {
        let staged = StagingTransformer::new().stage_record(&raw(1, 0, 1));

        assert_eq!(staged.record_id, 1);
        assert_eq!(staged.year, Some(2012));
        assert!((staged.temp_celsius.unwrap() - 20.5).abs() < 1e-9);
        assert!((staged.feels_like_celsius.unwrap() - 20.0).abs() < 1e-9);
        assert!((staged.humidity_percent.unwrap() - 81.0).abs() < 1e-9);
        assert!((staged.windspeed_kmh.unwrap() - 13.4).abs() < 1e-9);
        assert_eq!(staged.is_holiday, Some(false));
        assert_eq!(staged.total_rentals, Some(16));
    }

    #[test]
    fn test_no_rows_dropped_and_order_kept() {
        let input = vec![raw(3, 1, 1), raw(1, 30, 9), raw(2, 2, 2)];
        let output = StagingTransformer::new().transform(&input);

        let ids: Vec<u32> = output.records.iter().map(|r| r.record_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_domain_violations_are_reported_not_coerced() {
        let input = vec![raw(1, 24, 5)];
        let output = StagingTransformer::new().transform(&input);

        assert_eq!(output.records[0].hour, Some(24));
        assert_eq!(output.records[0].weather_id, Some(5));

        let fields: Vec<&str> = output.violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["hr", "weathersit"]);
        assert!(output.violations.iter().all(|v| v.record_id == 1));
    }

    #[test]
    fn test_count_mismatch_is_a_violation() {
        let mut record = raw(1, 5, 1);
        record.cnt = Some(99);
        let output = StagingTransformer::new().transform(&[record]);

        assert_eq!(output.violations.len(), 1);
        assert_eq!(output.violations[0].field, "cnt");
    }

    #[test]
    fn test_nulls_pass_through() {
        let mut record = raw(1, 5, 1);
        record.temp = None;
        record.holiday = None;
        let output = StagingTransformer::new().transform(&[record]);

        assert_eq!(output.records[0].temp_celsius, None);
        assert_eq!(output.records[0].is_holiday, None);
        assert!(output.violations.is_empty());
    }
}
