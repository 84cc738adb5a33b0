//! Declared data-quality tests, grouped by model and column.
//!
//! A suite is plain data: the built-in one mirrors the project's schema tests, and an
//! alternative can be loaded from a JSON file of the same shape:
//!
//! ```json
//! { "models": [ { "name": "dim_weather", "columns": [
//!     { "name": "weather_id", "tests": ["not_null", "unique"] } ] } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;
use crate::models::lookups::{DAY_NAMES, SEASON_NAMES, TIME_OF_DAY_NAMES, WEATHER_DESCRIPTIONS};
use crate::utils::constants::{HOURLY_FACT_TABLE, RAW_TABLE, STAGING_TABLE, WEATHER_DIM_TABLE};
use crate::validation::assertion::{AcceptedValue, Assertion, Predicate};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub models: Vec<ModelTests>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTests {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnTests>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTests {
    pub name: String,
    #[serde(default)]
    pub tests: Vec<Assertion>,
}

impl ColumnTests {
    fn new(name: &str, tests: Vec<Assertion>) -> Self {
        Self {
            name: name.to_string(),
            tests,
        }
    }
}

impl ModelTests {
    fn new(name: &str, columns: Vec<ColumnTests>) -> Self {
        Self {
            name: name.to_string(),
            columns,
        }
    }

    pub fn test_count(&self) -> usize {
        self.columns.iter().map(|c| c.tests.len()).sum()
    }
}

fn accepted_codes(codes: std::ops::RangeInclusive<i64>) -> Assertion {
    Assertion::AcceptedValues {
        values: codes.map(AcceptedValue::Int).collect(),
    }
}

fn accepted_labels(labels: &[&str]) -> Assertion {
    Assertion::AcceptedValues {
        values: labels.iter().map(|&l| l.into()).collect(),
    }
}

fn unique_with(columns: &[&str]) -> Assertion {
    Assertion::UniqueCombination {
        columns: columns.iter().map(|c| c.to_string()).collect(),
    }
}

fn between(min: f64, max: f64) -> Assertion {
    Assertion::ExpressionIsTrue {
        expression: Predicate::Between { min, max },
    }
}

fn sum_of(columns: &[&str]) -> Assertion {
    Assertion::ExpressionIsTrue {
        expression: Predicate::EqualsSumOf {
            columns: columns.iter().map(|c| c.to_string()).collect(),
        },
    }
}

impl TestSuite {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn model(&self, name: &str) -> Option<&ModelTests> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn test_count(&self) -> usize {
        self.models.iter().map(|m| m.test_count()).sum()
    }

    /// Pre-load checks on the raw table plus schema tests for staging and both marts.
    pub fn builtin() -> Self {
        use Assertion::{NotNull, Unique};

        let mut raw_columns: Vec<ColumnTests> = crate::utils::constants::REQUIRED_RAW_COLUMNS
            .iter()
            .map(|c| ColumnTests::new(c, vec![NotNull]))
            .collect();
        for column in raw_columns.iter_mut() {
            match column.name.as_str() {
                "instant" => column.tests.push(Unique),
                "dteday" => column.tests.push(unique_with(&["hr"])),
                "season" => column.tests.push(accepted_codes(1..=4)),
                "hr" => column.tests.push(between(0.0, 23.0)),
                "weathersit" => column.tests.push(accepted_codes(1..=4)),
                "cnt" => column.tests.push(sum_of(&["casual", "registered"])),
                _ => {}
            }
        }

        let staging = ModelTests::new(
            STAGING_TABLE,
            vec![
                ColumnTests::new("record_id", vec![NotNull, Unique]),
                ColumnTests::new("date", vec![NotNull, unique_with(&["hour"])]),
                ColumnTests::new("hour", vec![NotNull, between(0.0, 23.0)]),
                ColumnTests::new("season_id", vec![NotNull, accepted_codes(1..=4)]),
                ColumnTests::new("weekday_id", vec![NotNull, accepted_codes(0..=6)]),
                ColumnTests::new("weather_id", vec![NotNull, accepted_codes(1..=4)]),
                ColumnTests::new("humidity_percent", vec![between(0.0, 100.0)]),
                ColumnTests::new(
                    "total_rentals",
                    vec![NotNull, sum_of(&["casual_users", "registered_users"])],
                ),
            ],
        );

        let weather = ModelTests::new(
            WEATHER_DIM_TABLE,
            vec![
                ColumnTests::new("weather_id", vec![NotNull, Unique, accepted_codes(1..=4)]),
                ColumnTests::new(
                    "weather_desc",
                    vec![NotNull, accepted_labels(&WEATHER_DESCRIPTIONS)],
                ),
                ColumnTests::new("avg_temp_celsius", vec![NotNull]),
            ],
        );

        let facts = ModelTests::new(
            HOURLY_FACT_TABLE,
            vec![
                ColumnTests::new("record_id", vec![NotNull, Unique]),
                ColumnTests::new("date", vec![NotNull, unique_with(&["hour"])]),
                ColumnTests::new("hour", vec![NotNull, between(0.0, 23.0)]),
                ColumnTests::new("season_name", vec![NotNull, accepted_labels(&SEASON_NAMES)]),
                ColumnTests::new("day_name", vec![NotNull, accepted_labels(&DAY_NAMES)]),
                ColumnTests::new(
                    "time_of_day",
                    vec![NotNull, accepted_labels(&TIME_OF_DAY_NAMES)],
                ),
                ColumnTests::new("weather_id", vec![NotNull, accepted_codes(1..=4)]),
                ColumnTests::new(
                    "total_rentals",
                    vec![
                        NotNull,
                        Assertion::ExpressionIsTrue {
                            expression: Predicate::AtLeast { min: 0.0 },
                        },
                        sum_of(&["casual_users", "registered_users"]),
                    ],
                ),
            ],
        );

        Self {
            models: vec![
                ModelTests::new(RAW_TABLE, raw_columns),
                staging,
                weather,
                facts,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_suite_covers_every_model() {
        let suite = TestSuite::builtin();

        for name in [RAW_TABLE, STAGING_TABLE, WEATHER_DIM_TABLE, HOURLY_FACT_TABLE] {
            let model = suite.model(name).expect("model declared");
            assert!(model.test_count() > 0, "{} has no tests", name);
        }
        assert!(suite.model("unknown").is_none());
    }

    #[test]
    fn test_raw_suite_checks_every_column_for_nulls() {
        let suite = TestSuite::builtin();
        let raw = suite.model(RAW_TABLE).unwrap();

        assert_eq!(raw.columns.len(), 17);
        assert!(raw.columns.iter().all(|c| c.tests[0] == Assertion::NotNull));
    }

    #[test]
    fn test_hour_slots_are_declared_unique() {
        let suite = TestSuite::builtin();
        let slot = |model: &str, date: &str, hour: &str| {
            suite
                .model(model)
                .and_then(|m| m.columns.iter().find(|c| c.name == date))
                .is_some_and(|c| c.tests.contains(&unique_with(&[hour])))
        };

        assert!(slot(RAW_TABLE, "dteday", "hr"));
        assert!(slot(STAGING_TABLE, "date", "hour"));
        assert!(slot(HOURLY_FACT_TABLE, "date", "hour"));
    }

    #[test]
    fn test_suite_round_trips_through_json_file() -> Result<()> {
        let suite = TestSuite::builtin();
        let mut file = NamedTempFile::new()?;
        write!(file, "{}", serde_json::to_string_pretty(&suite)?)?;

        let loaded = TestSuite::from_json_file(file.path())?;
        assert_eq!(loaded.test_count(), suite.test_count());
        assert_eq!(loaded, suite);
        Ok(())
    }

    #[test]
    fn test_partial_suite_from_json() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"{{"models": [{{"name": "dim_weather", "columns": [{{"name": "weather_id", "tests": ["unique"]}}]}}]}}"#
        )?;

        let suite = TestSuite::from_json_file(file.path())?;
        assert_eq!(suite.models.len(), 1);
        assert_eq!(suite.test_count(), 1);
        Ok(())
    }
}
