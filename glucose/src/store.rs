//! The readings store: load once, query many times.
//!
//! A [`ReadingsStore`] parses an entire readings source at construction and
//! keeps the readings in memory, in file order, for its lifetime. There is no
//! write path. Every query is a pure filter over that snapshot, so a built
//! store can be shared across threads without locking.
//!
//! # Queries
//!
//! | Query                         | Window                                   |
//! |-------------------------------|------------------------------------------|
//! | [`readings_by_day`]           | the given date                           |
//! | [`readings_by_week`]          | `end - 6 ..= end`                        |
//! | [`readings_by_month`]         | `[first of month, first of next month)`  |
//! | [`average_for_previous_day`]  | the day before                           |
//! | [`average_for_previous_week`] | `reference - 13 ..= reference - 7`       |
//! | [`average_for_previous_month`]| the calendar month before                |
//!
//! [`readings_by_day`]: ReadingsStore::readings_by_day
//! [`readings_by_week`]: ReadingsStore::readings_by_week
//! [`readings_by_month`]: ReadingsStore::readings_by_month
//! [`average_for_previous_day`]: ReadingsStore::average_for_previous_day
//! [`average_for_previous_week`]: ReadingsStore::average_for_previous_week
//! [`average_for_previous_month`]: ReadingsStore::average_for_previous_month
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use glucose::{ReadingsStore, SourceConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ReadingsStore::open("glucose_time_data.csv", &SourceConfig::default())?;
//! let today = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
//!
//! for reading in &store.readings_by_day(today) {
//!     println!("{:?} {}", reading.time, reading.level);
//! }
//!
//! match store.average_for_previous_week(today) {
//!     Some(avg) => println!("last week averaged {avg:.1} mg/dL"),
//!     None => println!("no readings last week"),
//! }
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io::{ErrorKind, Read};
use std::path::Path;

use chrono::NaiveDate;

use crate::config::{ColumnLayout, SourceConfig};
use crate::error::{Result, SourceError};
use crate::query::WindowResult;
use crate::reading::Reading;
use crate::source;
use crate::stats::{self, DailyAverage};
use crate::window::{DateWindow, Period};

/// An immutable, in-memory snapshot of glucose readings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingsStore {
    /// All readings in source order.
    readings: Vec<Reading>,
    /// The column layout the readings were loaded with.
    layout: ColumnLayout,
}

impl ReadingsStore {
    /// Opens and parses a readings file.
    ///
    /// The whole file is read into memory and closed before parsing starts.
    ///
    /// # Errors
    ///
    /// - [`SourceError::NotFound`] if `path` does not exist
    /// - [`SourceError::Io`] if it cannot be opened or read
    /// - any parse or configuration error from [`Self::from_reader`]
    pub fn open<P: AsRef<Path>>(path: P, config: &SourceConfig) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::NotFound {
                path: path.to_path_buf(),
            },
            _ => SourceError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let store = Self::from_reader(bytes.as_slice(), config).inspect_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "failed to load readings");
        })?;

        tracing::info!(
            path = %path.display(),
            readings = store.len(),
            layout = ?store.layout,
            "loaded readings"
        );
        Ok(store)
    }

    /// Parses readings from any reader.
    ///
    /// A source with a header and no data rows produces an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ParseError`] for malformed input and
    /// [`crate::error::ConfigError`] if `config` is invalid. No partial store
    /// is ever returned.
    pub fn from_reader<R: Read>(reader: R, config: &SourceConfig) -> Result<Self> {
        let parsed = source::parse(reader, config)?;
        Ok(Self {
            readings: parsed.readings,
            layout: parsed.layout,
        })
    }

    /// Builds a store from readings that were parsed elsewhere.
    ///
    /// The layout is reported as `DateTimeLevel` if any reading has a time
    /// label and `DateLevel` otherwise.
    pub fn from_readings(readings: Vec<Reading>) -> Self {
        let layout = if readings.iter().any(|r| r.time.is_some()) {
            ColumnLayout::DateTimeLevel
        } else {
            ColumnLayout::DateLevel
        };
        Self { readings, layout }
    }

    /// All readings in source order.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Number of readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Returns `true` if the store holds no readings.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// The column layout the store was loaded with.
    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    /// Earliest and latest reading dates, or `None` for an empty store.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.readings.iter().map(|r| r.date).min()?;
        let last = self.readings.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    /// Readings inside an arbitrary window.
    pub fn readings_in_window(&self, window: DateWindow) -> WindowResult<'_> {
        let result = WindowResult::select(window, &self.readings);
        tracing::trace!(
            start = %window.start,
            end = %window.end,
            matched = result.len(),
            "window query"
        );
        result
    }

    /// Readings in the `period` window containing `date`.
    pub fn readings_in(&self, period: Period, date: NaiveDate) -> WindowResult<'_> {
        self.readings_in_window(period.window(date))
    }

    /// Readings dated exactly `date`.
    pub fn readings_by_day(&self, date: NaiveDate) -> WindowResult<'_> {
        self.readings_in(Period::Day, date)
    }

    /// Readings in the 7 days ending on `end`, both ends inclusive.
    pub fn readings_by_week(&self, end: NaiveDate) -> WindowResult<'_> {
        self.readings_in(Period::Week, end)
    }

    /// Readings in the calendar month containing `reference`.
    pub fn readings_by_month(&self, reference: NaiveDate) -> WindowResult<'_> {
        self.readings_in(Period::Month, reference)
    }

    /// The last `n` readings in source order.
    ///
    /// Returns everything when `n` exceeds the number of readings, and nothing
    /// when `n` is zero.
    pub fn recent_readings(&self, n: usize) -> &[Reading] {
        let start = self.readings.len().saturating_sub(n);
        &self.readings[start..]
    }

    /// One average per distinct date, sorted by date ascending.
    pub fn daily_averages(&self) -> Vec<DailyAverage> {
        stats::daily_averages(&self.readings)
    }

    /// Mean level over the `period` window preceding the one that contains
    /// `reference`, or `None` if that window has no readings.
    pub fn average_for_previous(&self, period: Period, reference: NaiveDate) -> Option<f64> {
        self.readings_in_window(period.previous_window(reference))
            .average()
    }

    /// Mean level of the day before `reference`.
    pub fn average_for_previous_day(&self, reference: NaiveDate) -> Option<f64> {
        self.average_for_previous(Period::Day, reference)
    }

    /// Mean level of the trailing week that ends the day before the current
    /// trailing week (ending on `reference`) starts.
    pub fn average_for_previous_week(&self, reference: NaiveDate) -> Option<f64> {
        self.average_for_previous(Period::Week, reference)
    }

    /// Mean level of the calendar month before the one containing `reference`.
    pub fn average_for_previous_month(&self, reference: NaiveDate) -> Option<f64> {
        self.average_for_previous(Period::Month, reference)
    }
}
