//! Windowed query results.
//!
//! Every windowed query on a [`crate::store::ReadingsStore`] returns a
//! [`WindowResult`]: the matching readings, borrowed from the store in file
//! order, together with the date window that selected them. An empty result
//! is a normal outcome, not an error.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! # use chrono::NaiveDate;
//! # use glucose::{ReadingsStore, SourceConfig};
//! # let store = ReadingsStore::open("glucose.csv", &SourceConfig::default())?;
//! # let today = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
//! let week = store.readings_by_week(today);
//! println!(
//!     "{} readings between {} and {}",
//!     week.len(),
//!     week.window().first_day(),
//!     week.window().last_day()
//! );
//! match week.stats() {
//!     Some(stats) => println!("min {} / avg {:.1} / max {}", stats.min, stats.average, stats.max),
//!     None => println!("no readings this week"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::reading::Reading;
use crate::stats::{self, WindowStats};
use crate::window::DateWindow;

/// Readings selected by one date window.
#[derive(Debug, Clone)]
pub struct WindowResult<'a> {
    /// The window that selected these readings.
    window: DateWindow,
    /// Matching readings in original file order.
    readings: Vec<&'a Reading>,
}

impl<'a> WindowResult<'a> {
    /// Creates a result from a window and the readings it selected.
    pub fn new(window: DateWindow, readings: Vec<&'a Reading>) -> Self {
        Self { window, readings }
    }

    /// Selects every reading of `all` that falls inside `window`.
    pub fn select(window: DateWindow, all: &'a [Reading]) -> Self {
        let readings = all.iter().filter(|r| window.contains(r.date)).collect();
        Self::new(window, readings)
    }

    /// Returns the window that produced this result.
    pub fn window(&self) -> DateWindow {
        self.window
    }

    /// Returns the matching readings in file order.
    pub fn readings(&self) -> &[&'a Reading] {
        &self.readings
    }

    /// Number of matching readings.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Returns `true` if no reading fell inside the window.
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Iterates over the matching readings.
    pub fn iter(&self) -> impl Iterator<Item = &'a Reading> + '_ {
        self.readings.iter().copied()
    }

    /// Levels of the matching readings, in order.
    pub fn levels(&self) -> Vec<f64> {
        self.iter().map(|r| r.level).collect()
    }

    /// Min, average and max over the window, or `None` if it is empty.
    pub fn stats(&self) -> Option<WindowStats> {
        WindowStats::from_readings(self.iter())
    }

    /// Mean level over the window, or `None` if it is empty.
    pub fn average(&self) -> Option<f64> {
        stats::average(self.iter())
    }

    /// Clones the matching readings into an owned vector.
    pub fn to_vec(&self) -> Vec<Reading> {
        self.iter().cloned().collect()
    }
}

impl<'r, 'a> IntoIterator for &'r WindowResult<'a> {
    type Item = &'a Reading;
    type IntoIter = std::iter::Copied<std::slice::Iter<'r, &'a Reading>>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter().copied()
    }
}
