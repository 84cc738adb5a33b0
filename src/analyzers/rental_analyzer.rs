use crate::error::{PipelineError, Result};
use crate::models::lookups::{weather_description, SEASON_NAMES, TIME_OF_DAY_NAMES};
use crate::models::HourlyRentalFact;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;

const BUSIEST_HOURS_SHOWN: usize = 10;
const PEAK_HOURS_SHOWN: usize = 5;
const WEEKDAY_LABEL: &str = "Weekday";
const WEEKEND_LABEL: &str = "Weekend";

/// Rentals aggregated over one category (a season, a weather label, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotals {
    pub label: String,
    pub hours: usize,
    pub total_rentals: i64,
}

impl GroupTotals {
    pub fn avg_rentals(&self) -> f64 {
        if self.hours == 0 {
            0.0
        } else {
            self.total_rentals as f64 / self.hours as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusyHour {
    pub date: NaiveDate,
    pub hour: Option<i32>,
    pub time_of_day: Option<String>,
    pub total_rentals: i64,
}

#[derive(Debug)]
pub struct RentalStatistics {
    pub total_records: usize,
    pub date_range: (NaiveDate, NaiveDate),
    pub total_rentals: i64,
    pub casual_rentals: i64,
    pub registered_rentals: i64,
    /// Rentals in the morning and evening rush buckets
    pub rush_hour_rentals: i64,
    /// Mean per-hour casual share over hours with rentals
    pub avg_casual_share: Option<f64>,
    pub busiest_hours: Vec<BusyHour>,
    pub by_season: Vec<GroupTotals>,
    pub by_weather: Vec<GroupTotals>,
    pub by_time_of_day: Vec<GroupTotals>,
    pub by_day_type: Vec<GroupTotals>,
    /// Hour of day with its average rentals, highest first
    pub peak_hours: Vec<(i32, f64)>,
}

pub struct RentalAnalyzer;

impl RentalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// `limit` of 0 analyses every row in the file.
    pub fn analyze_parquet_with_limit(&self, path: &Path, limit: usize) -> Result<RentalStatistics> {
        let writer = crate::writers::ParquetWriter::new();
        let facts = writer.read_hourly_facts(path, limit)?;
        self.analyze(&facts)
    }

    pub fn analyze(&self, facts: &[HourlyRentalFact]) -> Result<RentalStatistics> {
        let first = facts
            .first()
            .ok_or_else(|| PipelineError::MissingData("No facts to analyze".to_string()))?;

        let mut min_date = first.date;
        let mut max_date = first.date;
        let mut total_rentals = 0i64;
        let mut casual_rentals = 0i64;
        let mut registered_rentals = 0i64;
        let mut rush_hour_rentals = 0i64;
        let mut casual_share = (0.0f64, 0usize);

        let mut seasons: BTreeMap<String, GroupTotals> = BTreeMap::new();
        let mut weather: BTreeMap<i32, GroupTotals> = BTreeMap::new();
        let mut time_of_day: BTreeMap<String, GroupTotals> = BTreeMap::new();
        let mut day_type = [group(WEEKDAY_LABEL), group(WEEKEND_LABEL)];
        let mut hours: BTreeMap<i32, (i64, usize)> = BTreeMap::new();

        for fact in facts {
            min_date = min_date.min(fact.date);
            max_date = max_date.max(fact.date);

            let rentals = fact.total_rentals.unwrap_or(0);
            total_rentals = total_rentals.saturating_add(rentals);
            casual_rentals = casual_rentals.saturating_add(fact.casual_users.unwrap_or(0));
            registered_rentals =
                registered_rentals.saturating_add(fact.registered_users.unwrap_or(0));

            if fact.is_rush_hour() {
                rush_hour_rentals = rush_hour_rentals.saturating_add(rentals);
            }
            if let Some(share) = fact.casual_share() {
                casual_share.0 += share;
                casual_share.1 += 1;
            }
            if fact.day_name.is_some() {
                add(&mut day_type[usize::from(fact.is_weekend())], rentals);
            }

            if let Some(name) = &fact.season_name {
                add(seasons.entry(name.clone()).or_insert_with(|| group(name)), rentals);
            }
            if let Some(code) = fact.weather_id {
                add(
                    weather
                        .entry(code)
                        .or_insert_with(|| group(weather_description(code))),
                    rentals,
                );
            }
            if let Some(bucket) = &fact.time_of_day {
                add(
                    time_of_day.entry(bucket.clone()).or_insert_with(|| group(bucket)),
                    rentals,
                );
            }
            if let Some(hour) = fact.hour {
                let entry = hours.entry(hour).or_insert((0, 0));
                entry.0 = entry.0.saturating_add(rentals);
                entry.1 += 1;
            }
        }

        let mut busiest: Vec<&HourlyRentalFact> =
            facts.iter().filter(|f| f.total_rentals.is_some()).collect();
        busiest.sort_by(|a, b| {
            b.total_rentals
                .cmp(&a.total_rentals)
                .then_with(|| a.record_id.cmp(&b.record_id))
        });
        let busiest_hours = busiest
            .into_iter()
            .take(BUSIEST_HOURS_SHOWN)
            .map(|f| BusyHour {
                date: f.date,
                hour: f.hour,
                time_of_day: f.time_of_day.clone(),
                total_rentals: f.total_rentals.unwrap_or(0),
            })
            .collect();

        let mut peak_hours: Vec<(i32, f64)> = hours
            .into_iter()
            .map(|(hour, (sum, count))| (hour, sum as f64 / count as f64))
            .collect();
        peak_hours.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        peak_hours.truncate(PEAK_HOURS_SHOWN);

        Ok(RentalStatistics {
            total_records: facts.len(),
            date_range: (min_date, max_date),
            total_rentals,
            casual_rentals,
            registered_rentals,
            rush_hour_rentals,
            avg_casual_share: (casual_share.1 > 0).then(|| casual_share.0 / casual_share.1 as f64),
            busiest_hours,
            by_season: in_label_order(seasons, &SEASON_NAMES),
            by_weather: weather.into_values().collect(),
            by_time_of_day: in_label_order(time_of_day, &TIME_OF_DAY_NAMES),
            by_day_type: day_type.into_iter().filter(|g| g.hours > 0).collect(),
            peak_hours,
        })
    }
}

impl Default for RentalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn group(label: &str) -> GroupTotals {
    GroupTotals {
        label: label.to_string(),
        hours: 0,
        total_rentals: 0,
    }
}

fn add(group: &mut GroupTotals, rentals: i64) {
    group.hours += 1;
    group.total_rentals = group.total_rentals.saturating_add(rentals);
}

/// Canonical labels first in their declared order, anything else after.
fn in_label_order(mut groups: BTreeMap<String, GroupTotals>, order: &[&str]) -> Vec<GroupTotals> {
    let mut sorted: Vec<GroupTotals> = order.iter().filter_map(|l| groups.remove(*l)).collect();
    sorted.extend(groups.into_values());
    sorted
}

fn push_groups(out: &mut String, title: &str, groups: &[GroupTotals]) {
    out.push_str(&format!("\n{}:\n", title));
    for g in groups {
        out.push_str(&format!(
            "- {:<22} {:>10} rentals over {:>6} hours (avg {:.1})\n",
            g.label,
            g.total_rentals,
            g.hours,
            g.avg_rentals()
        ));
    }
}

impl RentalStatistics {
    pub fn summary(&self) -> String {
        let share = |part: i64| {
            if self.total_rentals > 0 {
                part as f64 / self.total_rentals as f64 * 100.0
            } else {
                0.0
            }
        };

        format!(
            "Records: {} hourly facts\n\
            Date Range: {} to {} ({} days)\n\
            Total Rentals: {} ({} casual, {} registered, {:.1}% registered)\n\
            Rush Hour Rentals: {} ({:.1}% of total)\n\
            Average Casual Share per Hour: {}\n\
            Average Rentals per Hour: {:.1}",
            self.total_records,
            self.date_range.0,
            self.date_range.1,
            self.date_range
                .1
                .signed_duration_since(self.date_range.0)
                .num_days()
                + 1,
            self.total_rentals,
            self.casual_rentals,
            self.registered_rentals,
            share(self.registered_rentals),
            self.rush_hour_rentals,
            share(self.rush_hour_rentals),
            self.avg_casual_share
                .map(|s| format!("{:.1}%", s * 100.0))
                .unwrap_or_else(|| "-".to_string()),
            self.total_rentals as f64 / self.total_records as f64
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut out = self.summary();
        out.push('\n');

        out.push_str(&format!("\nTop {} Busiest Hours:\n", self.busiest_hours.len()));
        for (i, busy) in self.busiest_hours.iter().enumerate() {
            let hour = busy
                .hour
                .map(|h| format!("{:02}:00", h))
                .unwrap_or_else(|| "--:--".to_string());
            out.push_str(&format!(
                "{:>2}. {} {} {:<14} {} rentals\n",
                i + 1,
                busy.date,
                hour,
                busy.time_of_day.as_deref().unwrap_or("-"),
                busy.total_rentals
            ));
        }

        push_groups(&mut out, "Rentals by Season", &self.by_season);
        push_groups(&mut out, "Rentals by Weather", &self.by_weather);
        push_groups(&mut out, "Rentals by Time of Day", &self.by_time_of_day);
        push_groups(&mut out, "Weekday vs Weekend", &self.by_day_type);

        out.push_str("\nPeak Hours (average rentals):\n");
        for (hour, avg) in &self.peak_hours {
            out.push_str(&format!("- {:02}:00  {:.1}\n", hour, avg));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StagingRecord;

    fn fact(id: u32, hour: i32, season: i32, weather: i32, total: i64) -> HourlyRentalFact {
        let staging = StagingRecord {
            record_id: id,
            date: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap() + chrono::Duration::days(id as i64),
            year: Some(2011),
            month: Some(1),
            hour: Some(hour),
            season_id: Some(season),
            weekday_id: Some(id as i32 % 7),
            weather_id: Some(weather),
            is_holiday: Some(false),
            is_workingday: Some(true),
            temp_celsius: Some(10.0),
            feels_like_celsius: Some(9.0),
            humidity_percent: Some(50.0),
            windspeed_kmh: Some(5.0),
            casual_users: Some(total / 4),
            registered_users: Some(total - total / 4),
            total_rentals: Some(total),
        };
        HourlyRentalFact::from_staging(&staging)
    }

    fn sample() -> Vec<HourlyRentalFact> {
        vec![
            fact(1, 8, 1, 1, 400),
            fact(2, 17, 2, 1, 600),
            fact(3, 3, 3, 2, 10),
            fact(4, 8, 4, 3, 200),
        ]
    }

    #[test]
    fn test_totals_and_range() -> Result<()> {
        let stats = RentalAnalyzer::new().analyze(&sample())?;

        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.total_rentals, 1210);
        assert_eq!(stats.casual_rentals + stats.registered_rentals, 1210);
        assert_eq!(stats.date_range.0, NaiveDate::from_ymd_opt(2011, 1, 2).unwrap());
        assert_eq!(stats.date_range.1, NaiveDate::from_ymd_opt(2011, 1, 5).unwrap());
        Ok(())
    }

    #[test]
    fn test_groupings() -> Result<()> {
        let stats = RentalAnalyzer::new().analyze(&sample())?;

        let seasons: Vec<&str> = stats.by_season.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(seasons, vec!["Spring", "Summer", "Fall", "Winter"]);

        assert_eq!(stats.by_weather[0].label, "Clear/Partly Cloudy");
        assert_eq!(stats.by_weather[0].total_rentals, 1000);

        let morning = stats
            .by_time_of_day
            .iter()
            .find(|g| g.label == "Morning Rush")
            .unwrap();
        assert_eq!(morning.hours, 2);
        assert!((morning.avg_rentals() - 300.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_busiest_and_peak_hours() -> Result<()> {
        let stats = RentalAnalyzer::new().analyze(&sample())?;

        assert_eq!(stats.busiest_hours[0].total_rentals, 600);
        assert_eq!(stats.busiest_hours[0].hour, Some(17));
        assert_eq!(stats.peak_hours[0].0, 17);
        assert_eq!(stats.peak_hours[1], (8, 300.0));

        let summary = stats.detailed_summary();
        assert!(summary.contains("Busiest Hours"));
        assert!(summary.contains("Evening Rush"));
        Ok(())
    }

    #[test]
    fn test_rush_hour_weekend_and_casual_share() -> Result<()> {
        let stats = RentalAnalyzer::new().analyze(&sample())?;

        // Hours 8, 17 and 8 fall in the rush buckets
        assert_eq!(stats.rush_hour_rentals, 1200);
        // 10 rentals split 2 casual, the rest exactly a quarter
        assert!((stats.avg_casual_share.unwrap() - 0.2375).abs() < 1e-9);

        // Ids 1..=4 land on Monday..Thursday
        let labels: Vec<&str> = stats.by_day_type.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Weekday"]);

        let mut rows = sample();
        rows.push(fact(6, 12, 2, 1, 40));
        let stats = RentalAnalyzer::new().analyze(&rows)?;
        let weekend = stats.by_day_type.iter().find(|g| g.label == "Weekend").unwrap();
        assert_eq!(weekend.total_rentals, 40);
        assert!(stats.detailed_summary().contains("Weekday vs Weekend"));
        Ok(())
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(RentalAnalyzer::new().analyze(&[]).is_err());
    }
}
