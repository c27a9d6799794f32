//! Aggregation over glucose levels.
//!
//! Aggregates never invent a value for empty input: an empty window has no
//! minimum, average or maximum, and every function here returns `None` for
//! it. Non-finite levels are skipped, so they can only reach this module
//! through [`crate::store::ReadingsStore::from_readings`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::reading::Reading;

/// An aggregation function over a sequence of levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Aggregate {
    /// Arithmetic mean.
    Average,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
}

impl Aggregate {
    /// Applies this aggregate to a slice of levels.
    ///
    /// Non-finite values are ignored. Returns `None` when no finite value is
    /// left.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use glucose::stats::Aggregate;
    ///
    /// let levels = [90.0, 110.0, f64::NAN, 130.0];
    ///
    /// assert_eq!(Aggregate::Average.apply(&levels), Some(110.0));
    /// assert_eq!(Aggregate::Min.apply(&levels), Some(90.0));
    /// assert_eq!(Aggregate::Max.apply(&levels), Some(130.0));
    /// assert_eq!(Aggregate::Average.apply(&[]), None);
    /// ```
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        let valid: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();

        match self {
            Self::Average => mean(&valid),
            Self::Min => valid.into_iter().reduce(f64::min),
            Self::Max => valid.into_iter().reduce(f64::max),
        }
    }

    /// Applies this aggregate to the levels of `readings`.
    pub fn apply_readings<'a, I>(self, readings: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a Reading>,
    {
        let levels: Vec<f64> = readings.into_iter().map(|r| r.level).collect();
        self.apply(&levels)
    }
}

/// Minimum, average and maximum of one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Lowest level.
    pub min: f64,
    /// Mean level.
    pub average: f64,
    /// Highest level.
    pub max: f64,
    /// Number of readings aggregated.
    pub count: usize,
}

impl WindowStats {
    /// Computes statistics over the given levels, or `None` if there are none.
    pub fn from_levels(levels: &[f64]) -> Option<Self> {
        let valid: Vec<f64> = levels.iter().copied().filter(|v| v.is_finite()).collect();

        Some(Self {
            min: valid.iter().copied().reduce(f64::min)?,
            average: mean(&valid)?,
            max: valid.iter().copied().reduce(f64::max)?,
            count: valid.len(),
        })
    }

    /// Computes statistics over the levels of `readings`.
    pub fn from_readings<'a, I>(readings: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Reading>,
    {
        let levels: Vec<f64> = readings.into_iter().map(|r| r.level).collect();
        Self::from_levels(&levels)
    }
}

/// Lowest level among `readings`, or `None` if empty.
pub fn min<'a, I: IntoIterator<Item = &'a Reading>>(readings: I) -> Option<f64> {
    Aggregate::Min.apply_readings(readings)
}

/// Mean level of `readings`, or `None` if empty.
pub fn average<'a, I: IntoIterator<Item = &'a Reading>>(readings: I) -> Option<f64> {
    Aggregate::Average.apply_readings(readings)
}

/// Highest level among `readings`, or `None` if empty.
pub fn max<'a, I: IntoIterator<Item = &'a Reading>>(readings: I) -> Option<f64> {
    Aggregate::Max.apply_readings(readings)
}

/// The mean level of a single calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAverage {
    /// The date summarized.
    pub date: NaiveDate,
    /// Mean level over that date's readings.
    pub average_level: f64,
    /// Number of readings on that date.
    pub count: usize,
}

/// Groups `readings` by date and averages each group.
///
/// Output is sorted by date ascending regardless of input order. Dates whose
/// readings are all non-finite are left out.
pub fn daily_averages<'a, I>(readings: I) -> Vec<DailyAverage>
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut groups: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for reading in readings.into_iter().filter(|r| r.level.is_finite()) {
        groups.entry(reading.date).or_default().push(reading.level);
    }

    groups
        .into_iter()
        .filter_map(|(date, levels)| {
            Some(DailyAverage {
                date,
                average_level: mean(&levels)?,
                count: levels.len(),
            })
        })
        .collect()
}

/// Mean of finite `values`, or `None` if empty.
///
/// Falls back to summing `v / n` when the plain sum overflows, so the mean
/// of finite values is always finite.
#[allow(clippy::cast_precision_loss)] // reading counts are far below 2^52
fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        Some(sum / n)
    } else {
        Some(values.iter().map(|v| v / n).sum())
    }
}
