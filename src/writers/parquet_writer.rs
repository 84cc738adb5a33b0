use crate::error::{PipelineError, Result};
use crate::models::{HourlyRentalFact, WeatherDimension};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE, HOURLY_FACT_TABLE, UNIX_EPOCH_DAYS_FROM_CE,
};
use arrow::array::*;
use arrow::datatypes::{ArrowPrimitiveType, DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::any::Any;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(PipelineError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    fn properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }

    /// Overwrites `path` with the full weather dimension.
    pub fn write_weather_dimension(&self, rows: &[WeatherDimension], path: &Path) -> Result<()> {
        let schema = weather_schema();
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(self.properties()))?;

        if !rows.is_empty() {
            writer.write(&weather_batch(rows, schema)?)?;
        }

        writer.close()?;
        Ok(())
    }

    /// Overwrites `path` with the full fact table, converting `batch_size` rows at a time.
    pub fn write_hourly_facts(
        &self,
        facts: &[HourlyRentalFact],
        path: &Path,
        batch_size: usize,
    ) -> Result<()> {
        let schema = fact_schema();
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(self.properties()))?;

        for chunk in facts.chunks(batch_size.max(1)) {
            let batch = fact_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        Ok(())
    }

    /// Read facts back from a Parquet file. A `limit` of 0 reads every row.
    pub fn read_hourly_facts(&self, path: &Path, limit: usize) -> Result<Vec<HourlyRentalFact>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(8192)
            .build()?;

        let mut facts = Vec::new();
        for batch_result in reader {
            let batch = batch_result?;
            facts.extend(batch_to_facts(&batch)?);

            if limit > 0 && facts.len() >= limit {
                facts.truncate(limit);
                break;
            }
        }

        Ok(facts)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        // Per-column codec as recorded in the file, not this writer's setting
        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            metadata.row_group(0).column(0).compression()
        } else {
            self.compression
        };

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn weather_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("weather_id", DataType::Int32, false),
        Field::new("weather_desc", DataType::Utf8, false),
        Field::new("avg_temp_celsius", DataType::Float64, true),
        Field::new("avg_feels_like_celsius", DataType::Float64, true),
        Field::new("avg_humidity_percent", DataType::Float64, true),
        Field::new("avg_windspeed_kmh", DataType::Float64, true),
        Field::new("observation_count", DataType::UInt32, false),
    ]))
}

fn fact_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("record_id", DataType::UInt32, false),
        Field::new("date", DataType::Date32, false),
        Field::new("year", DataType::Int32, true),
        Field::new("month", DataType::Int32, true),
        Field::new("hour", DataType::Int32, true),
        Field::new("season_id", DataType::Int32, true),
        Field::new("season_name", DataType::Utf8, true),
        Field::new("weekday_id", DataType::Int32, true),
        Field::new("day_name", DataType::Utf8, true),
        Field::new("time_of_day", DataType::Utf8, true),
        Field::new("weather_id", DataType::Int32, true),
        Field::new("is_holiday", DataType::Boolean, true),
        Field::new("is_workingday", DataType::Boolean, true),
        Field::new("temp_celsius", DataType::Float64, true),
        Field::new("feels_like_celsius", DataType::Float64, true),
        Field::new("humidity_percent", DataType::Float64, true),
        Field::new("windspeed_kmh", DataType::Float64, true),
        Field::new("casual_users", DataType::Int64, true),
        Field::new("registered_users", DataType::Int64, true),
        Field::new("total_rentals", DataType::Int64, true),
    ]))
}

fn weather_batch(rows: &[WeatherDimension], schema: Arc<Schema>) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.weather_id))),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.weather_desc.as_str()),
        )),
        Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.avg_temp_celsius))),
        Arc::new(Float64Array::from_iter(
            rows.iter().map(|r| r.avg_feels_like_celsius),
        )),
        Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.avg_humidity_percent))),
        Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.avg_windspeed_kmh))),
        Arc::new(UInt32Array::from_iter_values(
            rows.iter().map(|r| r.observation_count),
        )),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}

fn fact_batch(facts: &[HourlyRentalFact], schema: Arc<Schema>) -> Result<RecordBatch> {
    let dates = facts
        .iter()
        .map(|f| f.date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE);

    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from_iter_values(facts.iter().map(|f| f.record_id))),
        Arc::new(Date32Array::from_iter_values(dates)),
        Arc::new(Int32Array::from_iter(facts.iter().map(|f| f.year))),
        Arc::new(Int32Array::from_iter(facts.iter().map(|f| f.month))),
        Arc::new(Int32Array::from_iter(facts.iter().map(|f| f.hour))),
        Arc::new(Int32Array::from_iter(facts.iter().map(|f| f.season_id))),
        Arc::new(StringArray::from_iter(
            facts.iter().map(|f| f.season_name.as_deref()),
        )),
        Arc::new(Int32Array::from_iter(facts.iter().map(|f| f.weekday_id))),
        Arc::new(StringArray::from_iter(facts.iter().map(|f| f.day_name.as_deref()))),
        Arc::new(StringArray::from_iter(
            facts.iter().map(|f| f.time_of_day.as_deref()),
        )),
        Arc::new(Int32Array::from_iter(facts.iter().map(|f| f.weather_id))),
        Arc::new(BooleanArray::from_iter(facts.iter().map(|f| f.is_holiday))),
        Arc::new(BooleanArray::from_iter(facts.iter().map(|f| f.is_workingday))),
        Arc::new(Float64Array::from_iter(facts.iter().map(|f| f.temp_celsius))),
        Arc::new(Float64Array::from_iter(
            facts.iter().map(|f| f.feels_like_celsius),
        )),
        Arc::new(Float64Array::from_iter(facts.iter().map(|f| f.humidity_percent))),
        Arc::new(Float64Array::from_iter(facts.iter().map(|f| f.windspeed_kmh))),
        Arc::new(Int64Array::from_iter(facts.iter().map(|f| f.casual_users))),
        Arc::new(Int64Array::from_iter(facts.iter().map(|f| f.registered_users))),
        Arc::new(Int64Array::from_iter(facts.iter().map(|f| f.total_rentals))),
    ];

    Ok(RecordBatch::try_new(schema, columns)?)
}

fn column<'a, T: Any>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| {
            PipelineError::schema(
                HOURLY_FACT_TABLE,
                format!("missing or mistyped column '{}'", name),
            )
        })
}

fn primitive<T: ArrowPrimitiveType>(array: &PrimitiveArray<T>, i: usize) -> Option<T::Native> {
    array.is_valid(i).then(|| array.value(i))
}

fn text(array: &StringArray, i: usize) -> Option<String> {
    array.is_valid(i).then(|| array.value(i).to_string())
}

fn flag(array: &BooleanArray, i: usize) -> Option<bool> {
    array.is_valid(i).then(|| array.value(i))
}

fn batch_to_facts(batch: &RecordBatch) -> Result<Vec<HourlyRentalFact>> {
    let record_id = column::<UInt32Array>(batch, "record_id")?;
    let dates = column::<Date32Array>(batch, "date")?;
    let year = column::<Int32Array>(batch, "year")?;
    let month = column::<Int32Array>(batch, "month")?;
    let hour = column::<Int32Array>(batch, "hour")?;
    let season_id = column::<Int32Array>(batch, "season_id")?;
    let season_name = column::<StringArray>(batch, "season_name")?;
    let weekday_id = column::<Int32Array>(batch, "weekday_id")?;
    let day_name = column::<StringArray>(batch, "day_name")?;
    let time_of_day = column::<StringArray>(batch, "time_of_day")?;
    let weather_id = column::<Int32Array>(batch, "weather_id")?;
    let is_holiday = column::<BooleanArray>(batch, "is_holiday")?;
    let is_workingday = column::<BooleanArray>(batch, "is_workingday")?;
    let temp = column::<Float64Array>(batch, "temp_celsius")?;
    let feels_like = column::<Float64Array>(batch, "feels_like_celsius")?;
    let humidity = column::<Float64Array>(batch, "humidity_percent")?;
    let windspeed = column::<Float64Array>(batch, "windspeed_kmh")?;
    let casual = column::<Int64Array>(batch, "casual_users")?;
    let registered = column::<Int64Array>(batch, "registered_users")?;
    let total = column::<Int64Array>(batch, "total_rentals")?;

    let mut facts = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let date = NaiveDate::from_num_days_from_ce_opt(dates.value(i) + UNIX_EPOCH_DAYS_FROM_CE)
            .ok_or_else(|| PipelineError::schema(HOURLY_FACT_TABLE, "date out of range"))?;

        facts.push(HourlyRentalFact {
            record_id: record_id.value(i),
            date,
            year: primitive(year, i),
            month: primitive(month, i),
            hour: primitive(hour, i),
            season_id: primitive(season_id, i),
            season_name: text(season_name, i),
            weekday_id: primitive(weekday_id, i),
            day_name: text(day_name, i),
            time_of_day: text(time_of_day, i),
            weather_id: primitive(weather_id, i),
            is_holiday: flag(is_holiday, i),
            is_workingday: flag(is_workingday, i),
            temp_celsius: primitive(temp, i),
            feels_like_celsius: primitive(feels_like, i),
            humidity_percent: primitive(humidity, i),
            windspeed_kmh: primitive(windspeed, i),
            casual_users: primitive(casual, i),
            registered_users: primitive(registered, i),
            total_rentals: primitive(total, i),
        });
    }

    Ok(facts)
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
            avg_rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn fact(id: u32, hour: Option<i32>) -> HourlyRentalFact {
        HourlyRentalFact {
            record_id: id,
            date: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
            year: Some(2011),
            month: Some(1),
            hour,
            season_id: Some(1),
            season_name: Some("Spring".to_string()),
            weekday_id: Some(6),
            day_name: Some("Saturday".to_string()),
            time_of_day: hour.map(|_| "Early Morning".to_string()),
            weather_id: Some(1),
            is_holiday: Some(false),
            is_workingday: None,
            temp_celsius: Some(9.84),
            feels_like_celsius: None,
            humidity_percent: Some(81.0),
            windspeed_kmh: Some(0.0),
            casual_users: Some(3),
            registered_users: Some(13),
            total_rentals: Some(16),
        }
    }

    #[test]
    fn test_facts_read_back_unchanged() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;
        let facts = vec![fact(1, Some(0)), fact(2, None), fact(3, Some(4))];

        writer.write_hourly_facts(&facts, temp_file.path(), 2)?;
        let read = writer.read_hourly_facts(temp_file.path(), 0)?;

        assert_eq!(read, facts);
        Ok(())
    }

    #[test]
    fn test_date_is_days_since_unix_epoch() -> Result<()> {
        let batch = fact_batch(&[fact(1, Some(0))], fact_schema())?;
        let dates = column::<Date32Array>(&batch, "date")?;

        // 2011-01-01
        assert_eq!(dates.value(0), 14975);
        Ok(())
    }

    #[test]
    fn test_read_limit() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;
        let facts: Vec<HourlyRentalFact> = (1..=10).map(|i| fact(i, Some(1))).collect();

        writer.write_hourly_facts(&facts, temp_file.path(), 4)?;
        assert_eq!(writer.read_hourly_facts(temp_file.path(), 3)?.len(), 3);
        Ok(())
    }

    #[test]
    fn test_weather_dimension_file_info() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;
        let rows = vec![WeatherDimension {
            weather_id: 1,
            weather_desc: "Clear/Partly Cloudy".to_string(),
            avg_temp_celsius: Some(20.0),
            avg_feels_like_celsius: None,
            avg_humidity_percent: Some(55.0),
            avg_windspeed_kmh: Some(12.0),
            observation_count: 42,
        }];

        writer.write_weather_dimension(&rows, temp_file.path())?;
        let info = writer.get_file_info(temp_file.path())?;

        assert_eq!(info.total_rows, 1);
        assert!(info.summary().contains("Total rows: 1"));
        Ok(())
    }

    #[test]
    fn test_empty_table_still_written() -> Result<()> {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new()?;

        writer.write_hourly_facts(&[], temp_file.path(), 100)?;
        assert_eq!(writer.get_file_info(temp_file.path())?.total_rows, 0);
        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_hourly_facts(&[fact(1, Some(2))], temp_file.path(), 10);
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli9").is_err());
        Ok(())
    }
}
