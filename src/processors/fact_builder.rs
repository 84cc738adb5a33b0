use tracing::debug;

use crate::models::{HourlyRentalFact, StagingRecord};

pub struct HourlyFactBuilder;

impl HourlyFactBuilder {
    pub fn new() -> Self {
        Self
    }

    /// One fact per staging row, same order.
    pub fn build(&self, staging: &[StagingRecord]) -> Vec<HourlyRentalFact> {
        let facts: Vec<HourlyRentalFact> =
            staging.iter().map(HourlyRentalFact::from_staging).collect();
        debug!("Built {} hourly rental facts", facts.len());
        facts
    }
}

impl Default for HourlyFactBuilder {
    fn default() -> Self {
        Self::new()
    }
}
