//! Integration tests for loading readings files.
//!
//! These tests write real files to a temporary directory and exercise the
//! full path from file to store, including the error policies for missing
//! files, malformed headers and bad rows.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use glucose::config::{ColumnLayout, SourceConfig};
use glucose::error::{GlucoseError, ParseError, SourceError};
use glucose::store::ReadingsStore;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

const THREE_COLUMN: &str = "\
Date,Time,Level
12/01/2024,07:45 AM,92
12/01/2024,12:30 PM,141
12/02/2024,07:50 AM,88
12/15/2024,08:05 AM,97
01/01/2025,09:00 AM,110
";

const TWO_COLUMN: &str = "\
Date,Level
12/01/2024,92
12/01/2024,141
12/02/2024,88
12/15/2024,97
01/01/2025,110
";

#[test]
fn test_two_and_three_column_layouts_agree() {
    let temp_dir = tempdir().unwrap();
    let three = write_file(temp_dir.path(), "three.csv", THREE_COLUMN);
    let two = write_file(temp_dir.path(), "two.csv", TWO_COLUMN);

    let with_time = ReadingsStore::open(&three, &SourceConfig::default()).unwrap();
    let without_time = ReadingsStore::open(&two, &SourceConfig::default()).unwrap();

    assert_eq!(with_time.layout(), ColumnLayout::DateTimeLevel);
    assert_eq!(without_time.layout(), ColumnLayout::DateLevel);
    assert_eq!(with_time.len(), without_time.len());

    for (a, b) in with_time.readings().iter().zip(without_time.readings()) {
        assert_eq!(a.date, b.date);
        assert_eq!(a.level, b.level);
        assert!(a.time.is_some());
        assert!(b.time.is_none());
    }

    // Time never participates in filtering.
    let day = date(2024, 12, 1);
    assert_eq!(
        with_time.readings_by_day(day).levels(),
        without_time.readings_by_day(day).levels()
    );
    assert_eq!(
        with_time.readings_by_month(day).levels(),
        without_time.readings_by_month(day).levels()
    );
}

#[test]
fn test_explicit_layout_matches_auto() {
    let temp_dir = tempdir().unwrap();
    let path = write_file(temp_dir.path(), "three.csv", THREE_COLUMN);

    let auto = ReadingsStore::open(&path, &SourceConfig::default()).unwrap();
    let explicit = ReadingsStore::open(
        &path,
        &SourceConfig::with_layout(ColumnLayout::DateTimeLevel),
    )
    .unwrap();
    assert_eq!(auto, explicit);
}

#[test]
fn test_explicit_two_column_layout_on_three_column_file_is_rejected() {
    // The level column would be read from the time column.
    let temp_dir = tempdir().unwrap();
    let path = write_file(temp_dir.path(), "three.csv", THREE_COLUMN);

    let err = ReadingsStore::open(&path, &SourceConfig::with_layout(ColumnLayout::DateLevel))
        .unwrap_err();
    assert!(matches!(
        err,
        GlucoseError::Parse(ParseError::InvalidLevel { line: 2, .. })
    ));
}

#[test]
fn test_header_only_file_is_empty_store() {
    let temp_dir = tempdir().unwrap();
    let path = write_file(temp_dir.path(), "empty.csv", "date,time,level\n");

    let store = ReadingsStore::open(&path, &SourceConfig::default()).unwrap();
    assert!(store.is_empty());
    assert_eq!(store.date_range(), None);
    assert!(store.daily_averages().is_empty());
    assert!(store.recent_readings(5).is_empty());
    assert!(store.readings_by_month(date(2024, 12, 1)).is_empty());
}

#[test]
fn test_zero_byte_file_is_missing_header() {
    let temp_dir = tempdir().unwrap();
    let path = write_file(temp_dir.path(), "zero.csv", "");

    let err = ReadingsStore::open(&path, &SourceConfig::default()).unwrap_err();
    assert!(matches!(err, GlucoseError::Parse(ParseError::MissingHeader)));
}

#[test]
fn test_missing_file_is_source_not_found() {
    let temp_dir = tempdir().unwrap();
    let err = ReadingsStore::open(temp_dir.path().join("absent.csv"), &SourceConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        GlucoseError::Source(SourceError::NotFound { .. })
    ));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn test_directory_is_io_error() {
    let temp_dir = tempdir().unwrap();
    let err = ReadingsStore::open(temp_dir.path(), &SourceConfig::default()).unwrap_err();
    assert!(matches!(err, GlucoseError::Source(SourceError::Io { .. })));
}

#[test]
fn test_bad_row_rejects_whole_file() {
    let temp_dir = tempdir().unwrap();
    let path = write_file(
        temp_dir.path(),
        "bad.csv",
        "date,level\n12/01/2024,92\n12/02/2024,\n12/03/2024,95\n",
    );

    let err = ReadingsStore::open(&path, &SourceConfig::default()).unwrap_err();
    match err {
        GlucoseError::Parse(ParseError::InvalidLevel { line, value }) => {
            assert_eq!(line, 3);
            assert_eq!(value, "");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_headerless_file_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let path = write_file(temp_dir.path(), "raw.csv", "12/01/2024,92\n12/02/2024,88\n");

    let err = ReadingsStore::open(&path, &SourceConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        GlucoseError::Parse(ParseError::MalformedHeader { .. })
    ));
}

#[test]
fn test_config_file_drives_loading() {
    let temp_dir = tempdir().unwrap();
    let data = write_file(
        temp_dir.path(),
        "readings.tsv",
        "day\tmg_dl\n2024-12-01\t92\n2024-12-02\t88\n",
    );
    let config_path = write_file(
        temp_dir.path(),
        "source.json",
        r#"{ "layout": "date-level", "date_format": "%Y-%m-%d", "delimiter": "\t" }"#,
    );

    let config = SourceConfig::load(&config_path).unwrap();
    let store = ReadingsStore::open(&data, &config).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.readings()[1].date, date(2024, 12, 2));
}

#[test]
fn test_store_shared_across_threads() {
    let store = ReadingsStore::from_reader(TWO_COLUMN.as_bytes(), &SourceConfig::default()).unwrap();
    let store = std::sync::Arc::new(store);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || store.readings_by_month(date(2024, 12, 20)).len())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 4);
    }
}
