use crate::error::Result;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use crate::validation::Relation;

/// Plain CSV export of any mart table. Nulls become empty cells.
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// The header row is always written, even for an empty table.
    pub fn write_rows<T: Serialize + Relation>(&self, rows: &[T], path: &Path) -> Result<()> {
        let file = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, File::create(path)?);
        let mut writer = csv::Writer::from_writer(file);

        if rows.is_empty() {
            writer.write_record(T::columns())?;
        }

        for row in rows {
            writer.serialize(row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        HourlyRentalFact, WeatherDimension, HOURLY_FACT_COLUMNS, WEATHER_DIM_COLUMNS,
    };
    use tempfile::NamedTempFile;

    #[test]
    fn test_header_matches_table_columns() -> Result<()> {
        let rows = vec![WeatherDimension {
            weather_id: 3,
            weather_desc: "Light Rain/Snow".to_string(),
            avg_temp_celsius: Some(16.5),
            avg_feels_like_celsius: None,
            avg_humidity_percent: Some(83.0),
            avg_windspeed_kmh: Some(14.2),
            observation_count: 1419,
        }];
        let temp_file = NamedTempFile::new()?;

        CsvWriter::new().write_rows(&rows, temp_file.path())?;
        let content = std::fs::read_to_string(temp_file.path())?;
        let mut lines = content.lines();

        assert_eq!(lines.next(), Some(WEATHER_DIM_COLUMNS.join(",").as_str()));
        assert_eq!(lines.next(), Some("3,Light Rain/Snow,16.5,,83.0,14.2,1419"));
        Ok(())
    }

    #[test]
    fn test_empty_table_keeps_its_header() -> Result<()> {
        let temp_file = NamedTempFile::new()?;

        CsvWriter::new().write_rows::<HourlyRentalFact>(&[], temp_file.path())?;
        let content = std::fs::read_to_string(temp_file.path())?;

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec![HOURLY_FACT_COLUMNS.join(",")]);
        Ok(())
    }
}
