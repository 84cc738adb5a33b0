use crate::error::Result;
use crate::utils::constants::{
    COMPRESSION_SNAPPY, DEFAULT_CHUNK_SIZE, DEFAULT_CONFIG_FILE, DEFAULT_OUTPUT_DIR,
    DEFAULT_ROW_GROUP_SIZE, DEFAULT_ZIP_MEMBER, ENV_PREFIX,
};
use crate::validation::QualityThresholds;
use clap::ValueEnum;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Parquet,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Settings shared by every command.
///
/// Resolved lowest to highest precedence: built-in defaults, the TOML file
/// (`bikeshare.toml` in the working directory unless `--config` names one),
/// `BIKESHARE_*` environment variables, then command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub compression: String,

    #[validate(range(min = 1))]
    pub chunk_size: usize,

    #[validate(range(min = 1))]
    pub row_group_size: usize,

    pub use_mmap: bool,
    pub zip_member: String,
    pub tests_file: Option<PathBuf>,

    /// `[quality]` table in the TOML file
    pub quality: QualityThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: OutputFormat::Parquet,
            compression: COMPRESSION_SNAPPY.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            use_mmap: false,
            zip_member: DEFAULT_ZIP_MEMBER.to_string(),
            tests_file: None,
            quality: QualityThresholds::default(),
        }
    }
}

impl PipelineConfig {
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_layers(path, true, ENV_PREFIX),
            None => Self::load_layers(Path::new(DEFAULT_CONFIG_FILE), false, ENV_PREFIX),
        }
    }

    fn load_layers(file: &Path, required: bool, env_prefix: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(Config::try_from(&PipelineConfig::default())?)
            .add_source(File::from(file).required(required))
            .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
            .build()?;

        let config: PipelineConfig = settings.try_deserialize()?;
        config.validate()?;
        config.quality.validate()?;

        debug!("Resolved configuration: {:?}", config);
        Ok(config)
    }
}
