use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::validation::assertion::Outcome;
use crate::validation::report::{AssertionResult, DomainViolation, TestStatus, ValidationReport};
use crate::validation::suite::TestSuite;
use crate::validation::value::Relation;

/// Runs a [`TestSuite`] model by model and collects every result.
pub struct TestRunner {
    suite: TestSuite,
    results: Vec<AssertionResult>,
    rows_tested: BTreeMap<String, usize>,
}

impl TestRunner {
    pub fn new(suite: TestSuite) -> Self {
        Self {
            suite,
            results: Vec::new(),
            rows_tested: BTreeMap::new(),
        }
    }

    /// Evaluate the tests declared for `R::NAME`. Models without tests are skipped.
    pub fn test_model<R: Relation>(&mut self, rows: &[R]) -> &mut Self {
        let Some(model) = self.suite.model(R::NAME) else {
            debug!("No tests declared for {}", R::NAME);
            return self;
        };

        self.rows_tested.insert(R::NAME.to_string(), rows.len());

        for column in &model.columns {
            for assertion in &column.tests {
                let (status, failures, message) = match assertion.evaluate(rows, &column.name) {
                    Outcome::Evaluated { failures: 0 } => (TestStatus::Pass, 0, None),
                    Outcome::Evaluated { failures } => (TestStatus::Fail, failures, None),
                    Outcome::Error(message) => (TestStatus::Error, 0, Some(message)),
                };

                if status != TestStatus::Pass {
                    warn!(
                        "{} {}.{} {}: {} failing row(s)",
                        status.label(),
                        R::NAME,
                        column.name,
                        assertion.name(),
                        failures
                    );
                }

                self.results.push(AssertionResult {
                    model: R::NAME.to_string(),
                    column: column.name.clone(),
                    test: assertion.name().to_string(),
                    description: assertion.describe(&column.name),
                    status,
                    failures,
                    message,
                });
            }
        }

        debug!("Tested {} ({} rows)", R::NAME, rows.len());
        self
    }

    /// Models declared in the suite that no relation was tested against.
    pub fn untested_models(&self) -> Vec<&str> {
        self.suite
            .models
            .iter()
            .map(|m| m.name.as_str())
            .filter(|name| !self.rows_tested.contains_key(*name))
            .collect()
    }

    pub fn finish(mut self, violations: &[DomainViolation]) -> ValidationReport {
        let untested: Vec<String> = self
            .untested_models()
            .into_iter()
            .map(str::to_string)
            .collect();
        for name in untested {
            self.results.push(AssertionResult {
                model: name.clone(),
                column: String::new(),
                test: "model_exists".to_string(),
                description: format!("model {} is produced by the pipeline", name),
                status: TestStatus::Error,
                failures: 0,
                message: Some(format!("no model named '{}'", name)),
            });
        }

        ValidationReport::new(self.rows_tested, self.results, violations)
    }
}
