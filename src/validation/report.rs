use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::Result;
use crate::validation::quality::QualityMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
}

impl TestStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
            TestStatus::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionResult {
    pub model: String,
    pub column: String,
    pub test: String,
    pub description: String,
    pub status: TestStatus,
    pub failures: usize,
    pub message: Option<String>,
}

/// A value outside its documented domain, found while staging a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainViolation {
    pub record_id: u32,
    pub field: String,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub generated_at: DateTime<Utc>,
    pub passed: bool,
    pub rows_tested: BTreeMap<String, usize>,
    pub results: Vec<AssertionResult>,
    /// Violation counts per staging field
    pub domain_violations: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityMetrics>,
}

impl ValidationReport {
    pub fn new(
        rows_tested: BTreeMap<String, usize>,
        results: Vec<AssertionResult>,
        violations: &[DomainViolation],
    ) -> Self {
        let mut domain_violations = BTreeMap::new();
        for violation in violations {
            *domain_violations.entry(violation.field.clone()).or_insert(0) += 1;
        }

        let passed = results.iter().all(|r| r.status == TestStatus::Pass);

        Self {
            generated_at: Utc::now(),
            passed,
            rows_tested,
            results,
            domain_violations,
            quality: None,
        }
    }

    /// Attach quality metrics. They feed alerting only and never change `passed`.
    pub fn with_quality(mut self, quality: QualityMetrics) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn quality_alert(&self) -> bool {
        self.quality.as_ref().is_some_and(|q| q.alert)
    }

    pub fn failing(&self) -> impl Iterator<Item = &AssertionResult> {
        self.results.iter().filter(|r| r.status != TestStatus::Pass)
    }

    pub fn failed_count(&self) -> usize {
        self.failing().count()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Human-readable summary listing every failing assertion
    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Data Quality Report ===\n");
        for (model, rows) in &self.rows_tested {
            summary.push_str(&format!("{}: {} rows\n", model, rows));
        }

        let passed = self.results.len() - self.failed_count();
        summary.push_str(&format!(
            "\nAssertions: {} total, {} passed, {} failed\n",
            self.results.len(),
            passed,
            self.failed_count()
        ));

        if self.failed_count() > 0 {
            summary.push_str("\nFailing assertions:\n");
            for (i, result) in self.failing().enumerate() {
                summary.push_str(&format!(
                    "  {}. [{}] {}.{} {} ({}): {} row(s)",
                    i + 1,
                    result.status.label(),
                    result.model,
                    result.column,
                    result.test,
                    result.description,
                    result.failures
                ));
                if let Some(message) = &result.message {
                    summary.push_str(&format!(" - {}", message));
                }
                summary.push('\n');
            }
        }

        if !self.domain_violations.is_empty() {
            summary.push_str("\nDomain violations found while staging:\n");
            for (field, count) in &self.domain_violations {
                summary.push_str(&format!("  {}: {}\n", field, count));
            }
        }

        if let Some(quality) = &self.quality {
            summary.push_str(&format!(
                "\nQuality score ({}): {:.2}% (alert below {:.0}%)\n",
                quality.model,
                quality.quality_score,
                quality.thresholds.alert_threshold * 100.0
            ));
            for issue in quality.issues() {
                summary.push_str(&format!("  - {}\n", issue));
            }
        }

        summary.push_str(&format!(
            "\nOverall: {}\n",
            if self.passed { "PASS" } else { "FAIL" }
        ));

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(column: &str, status: TestStatus, failures: usize) -> AssertionResult {
        AssertionResult {
            model: "dim_weather".to_string(),
            column: column.to_string(),
            test: "unique".to_string(),
            description: format!("unique({})", column),
            status,
            failures,
            message: None,
        }
    }

    #[test]
    fn test_report_aggregates_failures() {
        let violations = vec![
            DomainViolation {
                record_id: 1,
                field: "hr".to_string(),
                details: "24".to_string(),
            },
            DomainViolation {
                record_id: 2,
                field: "hr".to_string(),
                details: "25".to_string(),
            },
        ];
        let report = ValidationReport::new(
            BTreeMap::from([("dim_weather".to_string(), 4)]),
            vec![
                result("weather_id", TestStatus::Pass, 0),
                result("weather_desc", TestStatus::Fail, 3),
            ],
            &violations,
        );

        assert!(!report.passed);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.domain_violations.get("hr"), Some(&2));

        let summary = report.generate_summary();
        assert!(summary.contains("1 failed"));
        assert!(summary.contains("dim_weather.weather_desc unique"));
        assert!(summary.contains("Overall: FAIL"));
    }

    #[test]
    fn test_errors_fail_the_run() {
        let report = ValidationReport::new(
            BTreeMap::new(),
            vec![result("missing", TestStatus::Error, 0)],
            &[],
        );
        assert!(!report.passed);
    }

    #[test]
    fn test_quality_alert_does_not_change_outcome() {
        use crate::validation::quality::QualityThresholds;
        use crate::validation::value::{Relation, Value};

        struct Flag(Option<bool>);
        impl Relation for Flag {
            const NAME: &'static str = "flags";
            fn columns() -> &'static [&'static str] {
                &["flag"]
            }
            fn value(&self, column: &str) -> Option<Value> {
                (column == "flag").then(|| self.0.into())
            }
        }

        let rows = vec![Flag(None), Flag(Some(true))];
        let as_of = chrono::NaiveDate::from_ymd_opt(2012, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let quality = QualityMetrics::measure(&rows, &QualityThresholds::default(), as_of);

        let report = ValidationReport::new(
            BTreeMap::new(),
            vec![result("weather_id", TestStatus::Pass, 0)],
            &[],
        )
        .with_quality(quality);

        assert!(report.passed);
        assert!(report.quality_alert());
        let summary = report.generate_summary();
        assert!(summary.contains("Quality score (flags): 62.50%"));
        assert!(summary.contains("flag: 50% null values"));
    }

    #[test]
    fn test_report_serializes_status_snake_case() -> Result<()> {
        let report = ValidationReport::new(
            BTreeMap::new(),
            vec![result("weather_id", TestStatus::Pass, 0)],
            &[],
        );
        let json = serde_json::to_value(&report)?;

        assert_eq!(json["passed"], true);
        assert_eq!(json["results"][0]["status"], "pass");
        Ok(())
    }
}
