use crate::error::{PipelineError, Result};
use crate::models::RawRecord;
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, RAW_TABLE, REQUIRED_RAW_COLUMNS};
use csv::{ReaderBuilder, StringRecord, Trim};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads `hour.csv` into [`RawRecord`]s.
///
/// The header is checked for every required column before any row is decoded. A row
/// whose `instant` or `dteday` is empty, or any cell that does not parse as its column
/// type, aborts the read with a schema error naming the data line. Integers outside a
/// column's domain still decode and are left to the range checks.
pub struct RawReader {
    use_mmap: bool,
}

impl RawReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn read_path(&self, path: &Path) -> Result<Vec<RawRecord>> {
        if self.use_mmap {
            self.read_mmap(path)
        } else {
            let file = File::open(path)?;
            self.read_from(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file))
        }
    }

    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Vec<RawRecord>> {
        self.read_from(bytes)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<RawRecord>> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        check_required_columns(&headers)?;

        let mut records = Vec::new();
        for (index, result) in csv_reader.deserialize::<RawRecord>().enumerate() {
            let record = result.map_err(|e| {
                if e.is_io_error() {
                    PipelineError::Csv(e)
                } else {
                    PipelineError::schema(RAW_TABLE, format!("data row {}: {}", index + 1, e))
                }
            })?;
            records.push(record);
        }

        Ok(records)
    }

    fn read_mmap(&self, path: &Path) -> Result<Vec<RawRecord>> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        self.read_bytes(&mmap)
    }
}

impl Default for RawReader {
    fn default() -> Self {
        Self::new()
    }
}

fn check_required_columns(headers: &StringRecord) -> Result<()> {
    let missing: Vec<String> = REQUIRED_RAW_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::MissingColumns {
            table: RAW_TABLE.to_string(),
            columns: missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "instant,dteday,season,yr,mnth,hr,holiday,weekday,workingday,weathersit,temp,atemp,hum,windspeed,casual,registered,cnt";

    fn sample_csv() -> String {
        format!(
            "{}\n1,2011-01-01,1,0,1,0,0,6,0,1,0.24,0.2879,0.81,0,3,13,16\n2,2011-01-01,1,0,1,1,0,6,0,1,0.22,0.2727,0.8,0,8,32,40\n",
            HEADER
        )
    }

    #[test]
    fn test_read_bytes() -> Result<()> {
        let records = RawReader::new().read_bytes(sample_csv().as_bytes())?;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].instant, 1);
        assert_eq!(records[0].dteday, NaiveDate::from_ymd_opt(2011, 1, 1).unwrap());
        assert_eq!(records[1].hr, Some(1));
        assert_eq!(records[1].cnt, Some(40));
        Ok(())
    }

    #[test]
    fn test_read_path_buffered_and_mmap_agree() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(sample_csv().as_bytes())?;
        file.flush()?;

        let buffered = RawReader::new().read_path(file.path())?;
        let mapped = RawReader::new().with_mmap(true).read_path(file.path())?;
        assert_eq!(buffered, mapped);
        Ok(())
    }

    #[test]
    fn test_empty_cells_become_null() -> Result<()> {
        let csv = format!("{}\n7,2011-01-01,,0,1,5,0,6,0,1,,0.3,0.5,0.1,1,2,3\n", HEADER);
        let records = RawReader::new().read_bytes(csv.as_bytes())?;

        assert_eq!(records[0].season, None);
        assert_eq!(records[0].temp, None);
        assert_eq!(records[0].atemp, Some(0.3));
        Ok(())
    }

    #[test]
    fn test_out_of_range_numbers_still_decode() -> Result<()> {
        let csv = format!(
            "{}\n3,2011-01-01,-2,0,1,-1,0,6,0,300,0.2,0.2,0.8,0,-3,13,10\n",
            HEADER
        );
        let records = RawReader::new().read_bytes(csv.as_bytes())?;

        assert_eq!(records[0].season, Some(-2));
        assert_eq!(records[0].hr, Some(-1));
        assert_eq!(records[0].weathersit, Some(300));
        assert_eq!(records[0].casual, Some(-3));
        Ok(())
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let csv = "instant,dteday,season\n1,2011-01-01,1\n";
        let err = RawReader::new().read_bytes(csv.as_bytes()).unwrap_err();

        match err {
            PipelineError::MissingColumns { table, columns } => {
                assert_eq!(table, RAW_TABLE);
                assert!(columns.contains(&"cnt".to_string()));
                assert!(!columns.contains(&"season".to_string()));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_wrong_type_is_schema_error() {
        let csv = format!("{}\n1,2011-01-01,spring,0,1,0,0,6,0,1,0.2,0.2,0.8,0,3,13,16\n", HEADER);
        let err = RawReader::new().read_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
    }

    #[test]
    fn test_empty_instant_is_schema_error() {
        let csv = format!("{}\n,2011-01-01,1,0,1,0,0,6,0,1,0.2,0.2,0.8,0,3,13,16\n", HEADER);
        let err = RawReader::new().read_bytes(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("data row 1"));
    }
}
