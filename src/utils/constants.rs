/// Table names as they appear in reports and output files
pub const RAW_TABLE: &str = "bikeshare_raw";
pub const STAGING_TABLE: &str = "stg_bikeshare";
pub const WEATHER_DIM_TABLE: &str = "dim_weather";
pub const HOURLY_FACT_TABLE: &str = "fct_hourly_rentals";

/// Columns the raw CSV header must carry
pub const REQUIRED_RAW_COLUMNS: [&str; 17] = [
    "instant",
    "dteday",
    "season",
    "yr",
    "mnth",
    "hr",
    "holiday",
    "weekday",
    "workingday",
    "weathersit",
    "temp",
    "atemp",
    "hum",
    "windspeed",
    "casual",
    "registered",
    "cnt",
];

/// Member looked up inside the dataset zip archive
pub const DEFAULT_ZIP_MEMBER: &str = "hour.csv";

/// Normalisation divisors used by the source dataset
pub const TEMP_SCALE_CELSIUS: f64 = 41.0;
pub const ATEMP_SCALE_CELSIUS: f64 = 50.0;
pub const HUMIDITY_SCALE_PERCENT: f64 = 100.0;
pub const WINDSPEED_SCALE_KMH: f64 = 67.0;

/// `yr` is an offset from the first year of the dataset
pub const BASE_YEAR: i32 = 2011;

/// Days between 0001-01-01 (CE) and 1970-01-01, for Arrow Date32 columns
pub const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_CONFIG_FILE: &str = "bikeshare.toml";
pub const ENV_PREFIX: &str = "BIKESHARE";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";

/// Data quality thresholds, as fractions of rows
pub const DEFAULT_COMPLETENESS_THRESHOLD: f64 = 0.95;
pub const DEFAULT_ACCURACY_THRESHOLD: f64 = 0.90;
pub const DEFAULT_CONSISTENCY_THRESHOLD: f64 = 0.95;
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.90;

/// Quality score weights; timeliness only counts when a maximum age is configured
pub const COMPLETENESS_WEIGHT: f64 = 0.3;
pub const ACCURACY_WEIGHT: f64 = 0.3;
pub const TIMELINESS_WEIGHT: f64 = 0.2;
pub const CONSISTENCY_WEIGHT: f64 = 0.2;
