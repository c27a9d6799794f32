//! Hand-off types for an external chart renderer.
//!
//! The renderer is not part of this crate. It receives a [`ChartSeries`]:
//! parallel `labels` and `levels` of equal length plus a title, an x-axis
//! label and an output name. Rendering policy is entirely the renderer's.
//!
//! [`SafeRange`] carries the recommended 70–100 mg/dL band that renderers
//! and display shells use for shading and coloring. Queries never consult it.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use glucose::export::ChartSeries;
//! use glucose::{Reading, ReadingsStore};
//!
//! let day = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
//! let store = ReadingsStore::from_readings(vec![
//!     Reading::with_time(day, "08:00", 92.0),
//!     Reading::with_time(day, "13:00", 135.0),
//! ]);
//!
//! let series = ChartSeries::from_readings(
//!     &store.readings_by_day(day),
//!     "Today's Glucose Readings",
//!     "Time",
//!     "daily_readings",
//!     "%m/%d/%Y",
//! );
//! assert_eq!(series.labels, vec!["12/15/2024, 08:00", "12/15/2024, 13:00"]);
//! assert_eq!(series.levels, vec![92.0, 135.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::reading::Reading;

/// Lower bound of the recommended band, mg/dL.
pub const MIN_SAFE_LEVEL_MG_DL: f64 = 70.0;

/// Upper bound of the recommended band, mg/dL.
pub const MAX_SAFE_LEVEL_MG_DL: f64 = 100.0;

/// Everything a chart renderer needs for one line or bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Chart title.
    pub title: String,
    /// X-axis label.
    pub x_label: String,
    /// Base name for the rendered output.
    pub output_name: String,
    /// One label per point: the formatted date, plus `", <time>"` if known.
    pub labels: Vec<String>,
    /// One level per point, parallel to `labels`.
    pub levels: Vec<f64>,
}

impl ChartSeries {
    /// Builds a series from a sequence of readings.
    ///
    /// `labels` and `levels` always have the same length, one entry per
    /// reading, in input order.
    pub fn from_readings<'a, I>(
        readings: I,
        title: impl Into<String>,
        x_label: impl Into<String>,
        output_name: impl Into<String>,
        date_format: &str,
    ) -> Self
    where
        I: IntoIterator<Item = &'a Reading>,
    {
        let (labels, levels): (Vec<String>, Vec<f64>) = readings
            .into_iter()
            .map(|r| (r.label(date_format), r.level))
            .unzip();

        Self {
            title: title.into(),
            x_label: x_label.into(),
            output_name: output_name.into(),
            labels,
            levels,
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns `true` if the series has no points.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Where a level sits relative to a [`SafeRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Zone {
    /// Below the band.
    Low,
    /// Inside the band, bounds included.
    InRange,
    /// Above the band.
    High,
}

/// A recommended glucose band, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeRange {
    /// Lowest level considered in range.
    pub min: f64,
    /// Highest level considered in range.
    pub max: f64,
}

impl Default for SafeRange {
    fn default() -> Self {
        Self {
            min: MIN_SAFE_LEVEL_MG_DL,
            max: MAX_SAFE_LEVEL_MG_DL,
        }
    }
}

impl SafeRange {
    /// Classifies a level against this band.
    pub fn classify(&self, level: f64) -> Zone {
        if level < self.min {
            Zone::Low
        } else if level > self.max {
            Zone::High
        } else {
            Zone::InRange
        }
    }

    /// Y-axis limits that show both the band and every level, widened by
    /// `padding` on each side. `None` when `levels` has no finite value.
    pub fn axis_bounds(&self, levels: &[f64], padding: f64) -> Option<(f64, f64)> {
        let finite = || levels.iter().copied().filter(|v| v.is_finite());
        let lowest = finite().reduce(f64::min)?;
        let highest = finite().reduce(f64::max)?;
        Some((
            self.min.min(lowest) - padding,
            self.max.max(highest) + padding,
        ))
    }

    /// Fraction of `levels` inside the band, or `None` if `levels` is empty.
    #[allow(clippy::cast_precision_loss)] // reading counts are far below 2^52
    pub fn time_in_range(&self, levels: &[f64]) -> Option<f64> {
        if levels.is_empty() {
            return None;
        }
        let in_range = levels
            .iter()
            .filter(|&&v| self.classify(v) == Zone::InRange)
            .count();
        Some(in_range as f64 / levels.len() as f64)
    }
}
