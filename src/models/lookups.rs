//! Fixed code-to-label mappings shared by the mart transforms and the test suite.
//!
//! Every mapping is an immutable constant or a `match`; nothing here is mutated at runtime.

use serde::{Deserialize, Serialize};

pub const SEASON_NAMES: [&str; 4] = ["Spring", "Summer", "Fall", "Winter"];

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const TIME_OF_DAY_NAMES: [&str; 5] = [
    "Early Morning",
    "Morning Rush",
    "Mid-Day",
    "Evening Rush",
    "Night",
];

pub const WEATHER_DESCRIPTIONS: [&str; 4] = [
    "Clear/Partly Cloudy",
    "Mist/Cloudy",
    "Light Rain/Snow",
    "Heavy Rain/Snow/Storm",
];

pub const UNKNOWN_WEATHER: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring = 1,
    Summer = 2,
    Fall = 3,
    Winter = 4,
}

impl Season {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Season::Spring),
            2 => Some(Season::Summer),
            3 => Some(Season::Fall),
            4 => Some(Season::Winter),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        SEASON_NAMES[*self as usize - 1]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl DayOfWeek {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(DayOfWeek::Sunday),
            1 => Some(DayOfWeek::Monday),
            2 => Some(DayOfWeek::Tuesday),
            3 => Some(DayOfWeek::Wednesday),
            4 => Some(DayOfWeek::Thursday),
            5 => Some(DayOfWeek::Friday),
            6 => Some(DayOfWeek::Saturday),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        DAY_NAMES[*self as usize]
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self, DayOfWeek::Saturday | DayOfWeek::Sunday)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    EarlyMorning,
    MorningRush,
    MidDay,
    EveningRush,
    Night,
}

impl TimeOfDay {
    /// Buckets partition 0..=23 with no gaps; anything else has no bucket.
    pub fn from_hour(hour: i32) -> Option<Self> {
        match hour {
            0..=5 => Some(TimeOfDay::EarlyMorning),
            6..=9 => Some(TimeOfDay::MorningRush),
            10..=15 => Some(TimeOfDay::MidDay),
            16..=19 => Some(TimeOfDay::EveningRush),
            20..=23 => Some(TimeOfDay::Night),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        TIME_OF_DAY_NAMES[*self as usize]
    }

    pub fn is_rush_hour(&self) -> bool {
        matches!(self, TimeOfDay::MorningRush | TimeOfDay::EveningRush)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear = 1,
    Mist = 2,
    LightPrecipitation = 3,
    HeavyPrecipitation = 4,
}

impl WeatherCondition {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(WeatherCondition::Clear),
            2 => Some(WeatherCondition::Mist),
            3 => Some(WeatherCondition::LightPrecipitation),
            4 => Some(WeatherCondition::HeavyPrecipitation),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        WEATHER_DESCRIPTIONS[*self as usize - 1]
    }
}

/// Total over every code: unmapped codes describe as "Unknown".
pub fn weather_description(code: i32) -> &'static str {
    WeatherCondition::from_code(code)
        .map(|w| w.description())
        .unwrap_or(UNKNOWN_WEATHER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(0), Some(TimeOfDay::EarlyMorning));
        assert_eq!(TimeOfDay::from_hour(5), Some(TimeOfDay::EarlyMorning));
        assert_eq!(TimeOfDay::from_hour(6), Some(TimeOfDay::MorningRush));
        assert_eq!(TimeOfDay::from_hour(9), Some(TimeOfDay::MorningRush));
        assert_eq!(TimeOfDay::from_hour(10), Some(TimeOfDay::MidDay));
        assert_eq!(TimeOfDay::from_hour(15), Some(TimeOfDay::MidDay));
        assert_eq!(TimeOfDay::from_hour(16), Some(TimeOfDay::EveningRush));
        assert_eq!(TimeOfDay::from_hour(19), Some(TimeOfDay::EveningRush));
        assert_eq!(TimeOfDay::from_hour(20), Some(TimeOfDay::Night));
        assert_eq!(TimeOfDay::from_hour(23), Some(TimeOfDay::Night));
        assert_eq!(TimeOfDay::from_hour(24), None);
    }

    #[test]
    fn test_time_of_day_partition_is_exhaustive() {
        let mut per_bucket = [0usize; 5];
        for hour in 0..=23i32 {
            let bucket = TimeOfDay::from_hour(hour).expect("every hour has a bucket");
            per_bucket[bucket as usize] += 1;
        }
        assert_eq!(per_bucket, [6, 4, 6, 4, 4]);
        assert_eq!(per_bucket.iter().sum::<usize>(), 24);
    }

    #[test]
    fn test_season_and_day_names() {
        assert_eq!(Season::from_code(1).map(|s| s.name()), Some("Spring"));
        assert_eq!(Season::from_code(4).map(|s| s.name()), Some("Winter"));
        assert_eq!(Season::from_code(0), None);
        assert_eq!(Season::from_code(5), None);

        assert_eq!(DayOfWeek::from_code(0).map(|d| d.name()), Some("Sunday"));
        assert_eq!(DayOfWeek::from_code(6).map(|d| d.name()), Some("Saturday"));
        assert_eq!(DayOfWeek::from_code(7), None);
        assert!(DayOfWeek::Saturday.is_weekend());
        assert!(!DayOfWeek::Wednesday.is_weekend());
    }

    #[test]
    fn test_weather_description_fallback() {
        assert_eq!(weather_description(1), "Clear/Partly Cloudy");
        assert_eq!(weather_description(2), "Mist/Cloudy");
        assert_eq!(weather_description(3), "Light Rain/Snow");
        assert_eq!(weather_description(4), "Heavy Rain/Snow/Storm");
        assert_eq!(weather_description(0), "Unknown");
        assert_eq!(weather_description(9), "Unknown");
    }
}
