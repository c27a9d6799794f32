//! Integration tests for window statistics and daily averages.

use chrono::NaiveDate;
use glucose::config::SourceConfig;
use glucose::dashboard::Dashboard;
use glucose::export::{ChartSeries, SafeRange};
use glucose::stats::{self, Aggregate, DailyAverage, WindowStats};
use glucose::store::ReadingsStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_daily_averages_example() {
    let csv = "date,level\n1/1/2024,100\n1/1/2024,120\n1/2/2024,80\n";
    let store = ReadingsStore::from_reader(csv.as_bytes(), &SourceConfig::default()).unwrap();

    assert_eq!(
        store.daily_averages(),
        vec![
            DailyAverage {
                date: date(2024, 1, 1),
                average_level: 110.0,
                count: 2,
            },
            DailyAverage {
                date: date(2024, 1, 2),
                average_level: 80.0,
                count: 1,
            },
        ]
    );
}

#[test]
fn test_daily_averages_sorted_when_file_is_not() {
    let csv = "date,level\n1/3/2024,90\n1/1/2024,100\n1/3/2024,110\n1/2/2024,80\n";
    let store = ReadingsStore::from_reader(csv.as_bytes(), &SourceConfig::default()).unwrap();

    let daily = store.daily_averages();
    let dates: Vec<NaiveDate> = daily.iter().map(|d| d.date).collect();
    assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);
    assert_eq!(daily[2].average_level, 100.0);
}

#[test]
fn test_empty_window_statistics_are_absent() {
    let csv = "date,level\n1/1/2024,100\n";
    let store = ReadingsStore::from_reader(csv.as_bytes(), &SourceConfig::default()).unwrap();

    let empty = store.readings_by_day(date(2024, 6, 1));
    assert!(empty.is_empty());
    assert_eq!(empty.stats(), None);
    assert_eq!(stats::min(&empty), None);
    assert_eq!(stats::average(&empty), None);
    assert_eq!(stats::max(&empty), None);
    assert_eq!(WindowStats::from_levels(&empty.levels()), None);
}

#[test]
fn test_window_statistics() {
    let csv = "date,level\n3/1/2024,65\n3/2/2024,105\n3/3/2024,85\n4/1/2024,200\n";
    let store = ReadingsStore::from_reader(csv.as_bytes(), &SourceConfig::default()).unwrap();

    let march = store.readings_by_month(date(2024, 3, 20));
    let stats = march.stats().unwrap();
    assert_eq!(stats.min, 65.0);
    assert_eq!(stats.average, 85.0);
    assert_eq!(stats.max, 105.0);
    assert_eq!(stats.count, 3);

    assert_eq!(Aggregate::Min.apply(&march.levels()), Some(stats.min));
    assert_eq!(Aggregate::Average.apply(&march.levels()), Some(stats.average));
}

#[test]
fn test_chart_series_from_window() {
    let csv = "date,time,level\n12/15/2024,08:00,92\n12/15/2024,,135\n12/16/2024,08:00,99\n";
    let store = ReadingsStore::from_reader(csv.as_bytes(), &SourceConfig::default()).unwrap();

    let day = store.readings_by_day(date(2024, 12, 15));
    let series = ChartSeries::from_readings(&day, "Today's Glucose Readings", "Time", "daily_readings", "%m/%d/%Y");

    assert_eq!(series.labels.len(), series.levels.len());
    assert_eq!(series.labels, vec!["12/15/2024, 08:00", "12/15/2024"]);
    assert_eq!(series.levels, vec![92.0, 135.0]);

    let bounds = SafeRange::default().axis_bounds(&series.levels, 5.0);
    assert_eq!(bounds, Some((65.0, 140.0)));
}

#[test]
fn test_dashboard_serializes_absent_values_as_null() {
    let csv = "date,level\n12/15/2024,92\n";
    let store = ReadingsStore::from_reader(csv.as_bytes(), &SourceConfig::default()).unwrap();

    let dashboard = Dashboard::build(&store, date(2024, 12, 15));
    let json = serde_json::to_value(&dashboard).unwrap();

    assert_eq!(json["today"], "2024-12-15");
    assert_eq!(json["day"]["stats"]["average"], 92.0);
    assert!(json["day"]["previous_average"].is_null());
    assert!(json["week"]["previous_average"].is_null());
    assert!(json["month"]["previous_average"].is_null());
}
