pub mod assertion;
pub mod quality;
pub mod report;
pub mod runner;
pub mod suite;
pub mod value;

pub use assertion::{AcceptedValue, Assertion, Outcome, Predicate};
pub use quality::{QualityMetrics, QualityThresholds};
pub use report::{AssertionResult, DomainViolation, TestStatus, ValidationReport};
pub use runner::TestRunner;
pub use suite::{ColumnTests, ModelTests, TestSuite};
pub use value::{Relation, Value, ValueKey};
