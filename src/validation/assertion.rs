use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::validation::value::{Relation, Value};

/// A named check declared against one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assertion {
    NotNull,
    Unique,
    /// The tested column together with `columns` identifies at most one row.
    UniqueCombination { columns: Vec<String> },
    AcceptedValues { values: Vec<AcceptedValue> },
    ExpressionIsTrue { expression: Predicate },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AcceptedValue {
    Int(i64),
    Text(String),
}

impl AcceptedValue {
    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (AcceptedValue::Int(expected), Value::Int(actual)) => expected == actual,
            (AcceptedValue::Int(expected), Value::Bool(actual)) => *expected == i64::from(*actual),
            (AcceptedValue::Text(expected), Value::Text(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl From<i64> for AcceptedValue {
    fn from(v: i64) -> Self {
        AcceptedValue::Int(v)
    }
}

impl From<&str> for AcceptedValue {
    fn from(v: &str) -> Self {
        AcceptedValue::Text(v.to_string())
    }
}

impl fmt::Display for AcceptedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcceptedValue::Int(i) => write!(f, "{}", i),
            AcceptedValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// Row-level predicate evaluated against the tested column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Between { min: f64, max: f64 },
    AtLeast { min: f64 },
    EqualsSumOf { columns: Vec<String> },
}

impl Predicate {
    /// `Ok(true)` for null operands; `Err` for a column that is missing or not numeric.
    fn evaluate<R: Relation>(&self, row: &R, column: &str) -> Result<bool, String> {
        let Some(x) = numeric(row, column)? else {
            return Ok(true);
        };

        match self {
            Predicate::Between { min, max } => Ok(*min <= x && x <= *max),
            Predicate::AtLeast { min } => Ok(x >= *min),
            Predicate::EqualsSumOf { columns } => {
                let mut sum = 0.0;
                for name in columns {
                    match numeric(row, name)? {
                        Some(v) => sum += v,
                        None => return Ok(true),
                    }
                }
                Ok((x - sum).abs() < 1e-9)
            }
        }
    }

    pub fn describe(&self, column: &str) -> String {
        match self {
            Predicate::Between { min, max } => format!("{} between {} and {}", column, min, max),
            Predicate::AtLeast { min } => format!("{} >= {}", column, min),
            Predicate::EqualsSumOf { columns } => format!("{} = {}", column, columns.join(" + ")),
        }
    }
}

fn numeric<R: Relation>(row: &R, column: &str) -> Result<Option<f64>, String> {
    match row.value(column) {
        None => Err(format!("unknown column '{}'", column)),
        Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| format!("non-numeric column '{}' holds {}", column, value)),
    }
}

/// Result of evaluating one assertion over a whole relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Evaluated { failures: usize },
    Error(String),
}

impl Assertion {
    pub fn name(&self) -> &'static str {
        match self {
            Assertion::NotNull => "not_null",
            Assertion::Unique => "unique",
            Assertion::UniqueCombination { .. } => "unique_combination",
            Assertion::AcceptedValues { .. } => "accepted_values",
            Assertion::ExpressionIsTrue { .. } => "expression_is_true",
        }
    }

    pub fn describe(&self, column: &str) -> String {
        match self {
            Assertion::AcceptedValues { values } => {
                let listed: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!("{} in ({})", column, listed.join(", "))
            }
            Assertion::UniqueCombination { columns } => {
                format!("unique({}, {})", column, columns.join(", "))
            }
            Assertion::ExpressionIsTrue { expression } => expression.describe(column),
            other => format!("{}({})", other.name(), column),
        }
    }

    /// Counts violating rows. Never stops at the first failure.
    pub fn evaluate<R: Relation>(&self, rows: &[R], column: &str) -> Outcome {
        if !R::columns().contains(&column) {
            return Outcome::Error(format!("unknown column '{}' on {}", column, R::NAME));
        }

        match self {
            Assertion::NotNull => Outcome::Evaluated {
                failures: rows
                    .iter()
                    .filter(|row| row.value(column).map_or(true, |v| v.is_null()))
                    .count(),
            },
            Assertion::Unique => {
                let mut seen: HashMap<_, usize> = HashMap::new();
                for key in rows.iter().filter_map(|row| row.value(column)?.key()) {
                    *seen.entry(key).or_default() += 1;
                }
                Outcome::Evaluated {
                    failures: seen.values().filter(|&&n| n > 1).sum(),
                }
            }
            Assertion::UniqueCombination { columns } => {
                let known = R::columns();
                if let Some(missing) = columns.iter().find(|c| !known.contains(&c.as_str())) {
                    return Outcome::Error(format!("unknown column '{}' on {}", missing, R::NAME));
                }

                // Rows with a null anywhere in the key are not compared
                let mut seen: HashMap<Vec<_>, usize> = HashMap::new();
                for row in rows {
                    let key: Option<Vec<_>> = std::iter::once(column)
                        .chain(columns.iter().map(String::as_str))
                        .map(|c| row.value(c).and_then(|v| v.key()))
                        .collect();
                    if let Some(key) = key {
                        *seen.entry(key).or_default() += 1;
                    }
                }
                Outcome::Evaluated {
                    failures: seen.values().filter(|&&n| n > 1).sum(),
                }
            }
            Assertion::AcceptedValues { values } => Outcome::Evaluated {
                failures: rows
                    .iter()
                    .filter_map(|row| row.value(column))
                    .filter(|v| !v.is_null() && !values.iter().any(|a| a.matches(v)))
                    .count(),
            },
            Assertion::ExpressionIsTrue { expression } => {
                let mut failures = 0;
                for row in rows {
                    match expression.evaluate(row, column) {
                        Ok(true) => {}
                        Ok(false) => failures += 1,
                        Err(message) => return Outcome::Error(message),
                    }
                }
                Outcome::Evaluated { failures }
            }
        }
    }
}
