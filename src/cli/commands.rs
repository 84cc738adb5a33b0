use crate::analyzers::RentalAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::{OutputFormat, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::processors::{Pipeline, PipelineOutput};
use crate::utils::constants::{HOURLY_FACT_TABLE, WEATHER_DIM_TABLE};
use crate::utils::filename::{default_report_filename, output_file_path};
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::validation::TestSuite;
use crate::writers::{CsvWriter, ParquetWriter};
use std::path::Path;
use tracing::info;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let mut config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            input,
            output_dir,
            format,
            compression,
            chunk_size,
            tests_file,
            validate_only,
            fail_on_test_failure,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(format) = format {
                config.format = format;
            }
            if let Some(compression) = compression {
                config.compression = compression;
            }
            if let Some(size) = chunk_size {
                config.chunk_size = size.max(1);
            }
            if tests_file.is_some() {
                config.tests_file = tests_file;
            }

            println!("Running bike-share pipeline...");
            println!("Input: {}", input.display());
            println!("Output directory: {}", config.output_dir.display());

            let progress = ProgressReporter::with_stages("Starting...", 3, false);
            progress.stage(1, "Extracting and transforming...");
            let output = build_pipeline(&config)?
                .process(&input, Some(&progress))
                .await?;

            if output.report.quality_alert() {
                progress.println(&quality_alert_line(&output));
            }

            progress.stage(2, "Writing quality report...");
            std::fs::create_dir_all(&config.output_dir)?;
            let report_path = config.output_dir.join(default_report_filename());
            output.report.write_json(&report_path)?;
            info!("Quality report written to {}", report_path.display());

            if validate_only {
                progress.finish_with_message("Validation complete - no tables written");
            } else {
                progress.stage(3, "Materialising mart tables...");
                write_tables(&config, &output)?;
                progress.finish_with_message(&format!(
                    "Wrote {} facts and {} weather rows",
                    output.facts.len(),
                    output.dim_weather.len()
                ));
            }

            println!("\n{}", output.report.generate_summary());
            println!("Quality report: {}", report_path.display());

            if fail_on_test_failure && !output.report.passed {
                return Err(PipelineError::AssertionsFailed {
                    failed: output.report.failed_count(),
                });
            }
        }

        Commands::Validate { input, tests_file } => {
            if tests_file.is_some() {
                config.tests_file = tests_file;
            }

            println!("Validating bike-share data...");
            println!("Input: {}", input.display());

            let progress = ProgressReporter::new_spinner("Validating data...", false);
            let output = build_pipeline(&config)?
                .process(&input, Some(&progress))
                .await?;
            if output.report.quality_alert() {
                progress.println(&quality_alert_line(&output));
            }
            progress.finish_with_message("Validation complete");

            println!("\n{}", output.report.generate_summary());

            if output.report.passed {
                println!("✅ All data passed validation checks");
            } else {
                println!(
                    "⚠️  Found {} failing assertions",
                    output.report.failed_count()
                );
                return Err(PipelineError::AssertionsFailed {
                    failed: output.report.failed_count(),
                });
            }
        }

        Commands::Info {
            file,
            sample,
            analysis_limit,
        } => {
            println!("Analyzing Parquet file: {}", file.display());

            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;

            let analyzer = RentalAnalyzer::new();
            let stats = analyzer.analyze_parquet_with_limit(&file, analysis_limit)?;

            println!("\n{}", stats.detailed_summary());

            println!("\nFile Details:");
            println!("{}", file_info.summary());

            if sample > 0 {
                println!("\nSample Records (showing {} records):", sample);
                match writer.read_hourly_facts(&file, sample) {
                    Ok(facts) => {
                        for (i, fact) in facts.iter().enumerate() {
                            println!(
                                "{}. #{} {} {:02}:00 {} / {} / {}: {} rentals",
                                i + 1,
                                fact.record_id,
                                fact.date,
                                fact.hour.unwrap_or_default(),
                                fact.season_name.as_deref().unwrap_or("-"),
                                fact.day_name.as_deref().unwrap_or("-"),
                                fact.time_of_day.as_deref().unwrap_or("-"),
                                fact.total_rentals.unwrap_or_default()
                            );
                        }
                    }
                    Err(e) => println!("Error reading sample data: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn build_pipeline(config: &PipelineConfig) -> Result<Pipeline> {
    let suite = match &config.tests_file {
        Some(path) => {
            info!("Loading test suite from {}", path.display());
            TestSuite::from_json_file(path)?
        }
        None => TestSuite::builtin(),
    };

    Ok(Pipeline::new()
        .with_suite(suite)
        .with_quality_thresholds(config.quality)
        .with_zip_member(config.zip_member.clone())
        .with_mmap(config.use_mmap))
}

fn quality_alert_line(output: &PipelineOutput) -> String {
    match &output.report.quality {
        Some(quality) => format!(
            "🚨 Data quality alert: score {:.2}% is below {:.0}%",
            quality.quality_score,
            quality.thresholds.alert_threshold * 100.0
        ),
        None => String::new(),
    }
}

/// Full overwrite of both mart tables in the configured format.
pub fn write_tables(config: &PipelineConfig, output: &PipelineOutput) -> Result<()> {
    let dir: &Path = &config.output_dir;
    std::fs::create_dir_all(dir)?;

    let extension = config.format.extension();
    let dim_path = output_file_path(dir, WEATHER_DIM_TABLE, extension);
    let fact_path = output_file_path(dir, HOURLY_FACT_TABLE, extension);

    match config.format {
        OutputFormat::Parquet => {
            let writer = ParquetWriter::new()
                .with_compression(&config.compression)?
                .with_row_group_size(config.row_group_size);

            writer.write_weather_dimension(&output.dim_weather, &dim_path)?;
            writer.write_hourly_facts(&output.facts, &fact_path, config.chunk_size)?;

            let file_info = writer.get_file_info(&fact_path)?;
            println!("\n{}:\n{}", fact_path.display(), file_info.summary());
        }
        OutputFormat::Csv => {
            let writer = CsvWriter::new();
            writer.write_rows(&output.dim_weather, &dim_path)?;
            writer.write_rows(&output.facts, &fact_path)?;
        }
    }

    info!(
        "Wrote {} and {}",
        dim_path.display(),
        fact_path.display()
    );
    Ok(())
}
