pub mod rental_analyzer;

pub use rental_analyzer::{BusyHour, GroupTotals, RentalAnalyzer, RentalStatistics};
