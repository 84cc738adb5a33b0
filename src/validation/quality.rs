//! Row-level quality metrics over a whole relation, rolled up into a weighted score.
//!
//! Complements the declared tests: where a test passes or fails, these metrics say how
//! complete, accurate and consistent a table is, and whether that warrants an alert.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::utils::constants::{
    ACCURACY_WEIGHT, COMPLETENESS_WEIGHT, CONSISTENCY_WEIGHT, DEFAULT_ACCURACY_THRESHOLD,
    DEFAULT_ALERT_THRESHOLD, DEFAULT_COMPLETENESS_THRESHOLD, DEFAULT_CONSISTENCY_THRESHOLD,
    TIMELINESS_WEIGHT,
};
use crate::validation::value::{Relation, Value};

/// Minimum share of good rows per check, and the score below which an alert is raised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct QualityThresholds {
    #[validate(range(min = 0.0, max = 1.0))]
    pub completeness: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    pub accuracy: f64,

    #[validate(range(min = 0.0, max = 1.0))]
    pub consistency: f64,

    /// Unset skips the timeliness check
    #[validate(range(min = 0.0))]
    pub max_age_hours: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub alert_threshold: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            completeness: DEFAULT_COMPLETENESS_THRESHOLD,
            accuracy: DEFAULT_ACCURACY_THRESHOLD,
            consistency: DEFAULT_CONSISTENCY_THRESHOLD,
            max_age_hours: None,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completeness {
    pub null_count: usize,
    pub null_percentage: f64,
    pub is_complete: bool,
}

/// Negative numbers, or dates after the measurement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    pub invalid_count: usize,
    pub is_accurate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeliness {
    pub latest_date: NaiveDate,
    pub hours_delay: f64,
    pub is_timely: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consistency {
    pub inconsistent_rows: usize,
    pub consistency_percentage: f64,
    pub is_consistent: bool,
}

/// A total column that must equal the sum of its parts.
struct SumRule {
    name: &'static str,
    total: &'static str,
    parts: &'static [&'static str],
}

const SUM_RULES: [SumRule; 2] = [
    SumRule {
        name: "user_counts",
        total: "total_rentals",
        parts: &["casual_users", "registered_users"],
    },
    SumRule {
        name: "user_counts",
        total: "cnt",
        parts: &["casual", "registered"],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub model: String,
    pub rows: usize,
    /// Weighted percentage, 0 to 100
    pub quality_score: f64,
    pub alert: bool,
    pub thresholds: QualityThresholds,
    pub completeness: BTreeMap<String, Completeness>,
    pub accuracy: BTreeMap<String, Accuracy>,
    pub timeliness: Option<Timeliness>,
    pub consistency: BTreeMap<String, Consistency>,
}

impl QualityMetrics {
    pub fn measure<R: Relation>(
        rows: &[R],
        thresholds: &QualityThresholds,
        as_of: NaiveDateTime,
    ) -> Self {
        let completeness = R::columns()
            .iter()
            .map(|&column| {
                let null_count = rows
                    .iter()
                    .filter(|row| row.value(column).map_or(true, |v| v.is_null()))
                    .count();
                let null_share = share(null_count, rows.len());
                let entry = Completeness {
                    null_count,
                    null_percentage: percentage(null_share),
                    is_complete: null_share <= 1.0 - thresholds.completeness,
                };
                (column.to_string(), entry)
            })
            .collect();

        let mut accuracy = BTreeMap::new();
        let mut latest_date: Option<NaiveDate> = None;
        for &column in R::columns() {
            let mut checked = 0;
            let mut invalid_count = 0;
            for value in rows.iter().filter_map(|row| row.value(column)) {
                let invalid = match value {
                    Value::Int(i) => i < 0,
                    Value::Float(f) => f < 0.0,
                    Value::Date(d) => {
                        latest_date = latest_date.max(Some(d));
                        d > as_of.date()
                    }
                    _ => continue,
                };
                checked += 1;
                invalid_count += usize::from(invalid);
            }

            if checked > 0 {
                let entry = Accuracy {
                    invalid_count,
                    is_accurate: 1.0 - share(invalid_count, checked) >= thresholds.accuracy,
                };
                accuracy.insert(column.to_string(), entry);
            }
        }

        let timeliness = thresholds.max_age_hours.zip(latest_date).map(|(max_age, latest)| {
            let delay = as_of.signed_duration_since(latest.and_time(NaiveTime::MIN));
            let hours_delay = delay.num_seconds() as f64 / 3600.0;
            Timeliness {
                latest_date: latest,
                hours_delay: round2(hours_delay),
                is_timely: hours_delay <= max_age,
            }
        });

        let mut consistency = BTreeMap::new();
        for rule in SUM_RULES.iter().filter(|r| rule_applies::<R>(r)) {
            let inconsistent_rows = rows.iter().filter(|row| !sums_match(*row, rule)).count();
            let consistent_share = 1.0 - share(inconsistent_rows, rows.len());
            let entry = Consistency {
                inconsistent_rows,
                consistency_percentage: percentage(consistent_share),
                is_consistent: consistent_share >= thresholds.consistency,
            };
            consistency.insert(rule.name.to_string(), entry);
        }

        let mut metrics = Self {
            model: R::NAME.to_string(),
            rows: rows.len(),
            quality_score: 0.0,
            alert: false,
            thresholds: *thresholds,
            completeness,
            accuracy,
            timeliness,
            consistency,
        };
        metrics.quality_score = metrics.score();
        metrics.alert = metrics.quality_score < thresholds.alert_threshold * 100.0;
        metrics
    }

    /// Weighted share of passing checks per category. Without a timeliness check its
    /// weight is spread over the other categories.
    fn score(&self) -> f64 {
        let mut parts = vec![
            (
                COMPLETENESS_WEIGHT,
                passing(self.completeness.values().map(|c| c.is_complete)),
            ),
            (
                ACCURACY_WEIGHT,
                passing(self.accuracy.values().map(|a| a.is_accurate)),
            ),
            (
                CONSISTENCY_WEIGHT,
                passing(self.consistency.values().map(|c| c.is_consistent)),
            ),
        ];
        if let Some(timeliness) = &self.timeliness {
            parts.push((TIMELINESS_WEIGHT, passing(std::iter::once(timeliness.is_timely))));
        }

        let weight: f64 = parts.iter().map(|(w, _)| w).sum();
        let weighted: f64 = parts.iter().map(|(w, s)| w * s).sum();
        percentage(weighted / weight)
    }

    /// One line per check that missed its threshold.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (column, c) in self.completeness.iter().filter(|(_, c)| !c.is_complete) {
            issues.push(format!("{}: {}% null values", column, c.null_percentage));
        }
        for (column, a) in self.accuracy.iter().filter(|(_, a)| !a.is_accurate) {
            issues.push(format!("{}: {} invalid values", column, a.invalid_count));
        }
        if let Some(t) = self.timeliness.as_ref().filter(|t| !t.is_timely) {
            issues.push(format!("data delay: {} hours", t.hours_delay));
        }
        for (name, c) in self.consistency.iter().filter(|(_, c)| !c.is_consistent) {
            issues.push(format!("{}: {} inconsistent rows", name, c.inconsistent_rows));
        }
        issues
    }
}

fn rule_applies<R: Relation>(rule: &SumRule) -> bool {
    std::iter::once(&rule.total)
        .chain(rule.parts)
        .all(|c| R::columns().contains(c))
}

// A null anywhere in the rule counts as inconsistent
fn sums_match<R: Relation>(row: &R, rule: &SumRule) -> bool {
    let number = |column: &str| row.value(column).and_then(|v| v.as_f64());
    let Some(total) = number(rule.total) else {
        return false;
    };
    let mut sum = 0.0;
    for part in rule.parts {
        match number(part) {
            Some(v) => sum += v,
            None => return false,
        }
    }
    (total - sum).abs() < 1e-9
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn passing(flags: impl Iterator<Item = bool>) -> f64 {
    let (ok, total) = flags.fold((0, 0), |(ok, total), flag| (ok + usize::from(flag), total + 1));
    if total == 0 {
        1.0
    } else {
        share(ok, total)
    }
}

fn percentage(fraction: f64) -> f64 {
    round2(fraction * 100.0)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
