use chrono::Local;
use std::path::{Path, PathBuf};

/// `<dir>/<table>.<ext>`; each run overwrites the previous materialisation.
pub fn output_file_path(dir: &Path, table: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", table, extension))
}

/// Quality report name with format: quality_report_{YYYYMMDD_HHMMSS}.json
pub fn default_report_filename() -> String {
    format!("quality_report_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_path() {
        let path = output_file_path(Path::new("output"), "dim_weather", "parquet");
        assert_eq!(path, PathBuf::from("output/dim_weather.parquet"));
    }

    #[test]
    fn test_default_report_filename() {
        let filename = default_report_filename();

        assert!(filename.starts_with("quality_report_"));
        assert!(filename.ends_with(".json"));
        // quality_report_ + YYYYMMDD_HHMMSS + .json
        assert_eq!(filename.len(), 15 + 15 + 5);
        assert_eq!(filename.as_bytes()[23], b'_');
    }
}
