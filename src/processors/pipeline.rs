use crate::error::Result;
use crate::models::{HourlyRentalFact, RawRecord, StagingRecord, WeatherDimension};
use crate::processors::{HourlyFactBuilder, StagingTransformer, WeatherDimensionBuilder};
use crate::readers::{is_zip_archive, ArchiveReader, RawReader};
use crate::utils::constants::DEFAULT_ZIP_MEMBER;
use crate::utils::progress::ProgressReporter;
use crate::validation::{
    QualityMetrics, QualityThresholds, TestRunner, TestSuite, ValidationReport,
};
use chrono::Utc;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Every table the pipeline derived in one run, plus the quality report over them.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub raw_count: usize,
    pub staging: Vec<StagingRecord>,
    pub dim_weather: Vec<WeatherDimension>,
    pub facts: Vec<HourlyRentalFact>,
    pub report: ValidationReport,
}

/// Raw ingestion, staging, marts, then the test suite over all four tables.
#[derive(Debug, Clone)]
pub struct Pipeline {
    suite: TestSuite,
    thresholds: QualityThresholds,
    zip_member: String,
    use_mmap: bool,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            suite: TestSuite::builtin(),
            thresholds: QualityThresholds::default(),
            zip_member: DEFAULT_ZIP_MEMBER.to_string(),
            use_mmap: false,
        }
    }

    pub fn with_suite(mut self, suite: TestSuite) -> Self {
        self.suite = suite;
        self
    }

    pub fn with_quality_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_zip_member(mut self, zip_member: impl Into<String>) -> Self {
        self.zip_member = zip_member.into();
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn suite(&self) -> &TestSuite {
        &self.suite
    }

    /// Read the raw table from a CSV file or from the dataset zip archive.
    pub fn read_raw(&self, input: &Path) -> Result<Vec<RawRecord>> {
        if is_zip_archive(input) {
            ArchiveReader::new()
                .with_member(self.zip_member.clone())
                .with_mmap(self.use_mmap)
                .read_archive(input)
        } else {
            RawReader::new().with_mmap(self.use_mmap).read_path(input)
        }
    }

    /// Run every stage against `input`. Blocking stages run off the async runtime.
    pub async fn process(
        &self,
        input: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<PipelineOutput> {
        if let Some(p) = progress {
            p.set_message(&format!("Reading {}...", input.display()));
        }

        let reader = self.clone();
        let path: PathBuf = input.to_path_buf();
        let raw = tokio::task::spawn_blocking(move || reader.read_raw(&path)).await??;
        log_load_verification(&raw);

        if let Some(p) = progress {
            p.set_message("Transforming and testing...");
        }

        let pipeline = self.clone();
        let output = tokio::task::spawn_blocking(move || pipeline.transform(&raw)).await?;
        Ok(output)
    }

    /// Pure part of the run: identical input always yields identical tables.
    pub fn transform(&self, raw: &[RawRecord]) -> PipelineOutput {
        let staged = StagingTransformer::new().transform(raw);
        info!("Staged {} records", staged.records.len());

        let dim_weather = WeatherDimensionBuilder::new().build(&staged.records);
        let facts = HourlyFactBuilder::new().build(&staged.records);
        info!(
            "Built {} weather dimension rows and {} hourly facts",
            dim_weather.len(),
            facts.len()
        );

        let mut runner = TestRunner::new(self.suite.clone());
        runner
            .test_model(raw)
            .test_model(&staged.records)
            .test_model(&dim_weather)
            .test_model(&facts);
        let quality = QualityMetrics::measure(&facts, &self.thresholds, Utc::now().naive_utc());
        if quality.alert {
            warn!(
                "Quality score {:.2}% for {} is below the alert threshold",
                quality.quality_score, quality.model
            );
        }
        let report = runner.finish(&staged.violations).with_quality(quality);

        info!(
            "Data quality: {} of {} assertions passed",
            report.results.len() - report.failed_count(),
            report.results.len()
        );

        PipelineOutput {
            raw_count: raw.len(),
            staging: staged.records,
            dim_weather,
            facts,
            report,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Post-load sanity figures for the raw table.
pub fn log_load_verification(raw: &[RawRecord]) {
    let distinct: HashSet<u32> = raw.iter().map(|r| r.instant).collect();
    let min_date = raw.iter().map(|r| r.dteday).min();
    let max_date = raw.iter().map(|r| r.dteday).max();
    let total = raw
        .iter()
        .filter_map(|r| r.cnt)
        .fold(0i64, |acc, cnt| acc.saturating_add(cnt));

    info!("Loaded {} raw records ({} distinct ids)", raw.len(), distinct.len());
    match (min_date, max_date) {
        (Some(min), Some(max)) => info!("Date range: {} to {}", min, max),
        _ => info!("Date range: empty"),
    }
    info!("Total rentals: {}", total);
}
