use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bikeshare-elt")]
#[command(about = "Hourly bike-share ELT: staging, marts and data-quality tests")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Configuration file [default: bikeshare.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline and materialise the mart tables
    Run {
        #[arg(short, long, help = "Input hour.csv or dataset zip archive")]
        input: PathBuf,

        #[arg(short, long, help = "Output directory [default: output]")]
        output_dir: Option<PathBuf>,

        #[arg(short, long, value_enum, help = "Output format [default: parquet]")]
        format: Option<OutputFormat>,

        #[arg(short, long, help = "Parquet compression [default: snappy]")]
        compression: Option<String>,

        #[arg(long, help = "Rows per write batch [default: 1000]")]
        chunk_size: Option<usize>,

        #[arg(long, help = "JSON test suite replacing the built-in one")]
        tests_file: Option<PathBuf>,

        #[arg(long, default_value = "false", help = "Test only; write no tables")]
        validate_only: bool,

        #[arg(
            long,
            default_value = "false",
            help = "Exit with an error when any assertion fails"
        )]
        fail_on_test_failure: bool,
    },

    /// Transform and test the input without writing tables
    Validate {
        #[arg(short, long, help = "Input hour.csv or dataset zip archive")]
        input: PathBuf,

        #[arg(long, help = "JSON test suite replacing the built-in one")]
        tests_file: Option<PathBuf>,
    },

    /// Summarise a fct_hourly_rentals Parquet file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "0")]
        sample: usize,

        #[arg(
            long,
            default_value = "0",
            help = "Maximum records to analyze (0 = all records)"
        )]
        analysis_limit: usize,
    },
}
