pub mod fact;
pub mod lookups;
pub mod raw;
pub mod staging;
pub mod weather;

pub use fact::{HourlyRentalFact, HOURLY_FACT_COLUMNS};
pub use lookups::{DayOfWeek, Season, TimeOfDay, WeatherCondition};
pub use raw::RawRecord;
pub use staging::{StagingRecord, STAGING_COLUMNS};
pub use weather::{WeatherDimension, WEATHER_DIM_COLUMNS};
