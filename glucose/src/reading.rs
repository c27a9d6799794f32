//! The glucose reading record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::format_date;

/// One blood-glucose measurement.
///
/// A reading belongs to exactly one calendar date. The optional `time` is a
/// display label copied verbatim from the source and never takes part in
/// filtering or ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Calendar date of the measurement.
    pub date: NaiveDate,
    /// Time-of-day label, when the source layout carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Concentration in mg/dL.
    pub level: f64,
}

impl Reading {
    /// Creates a reading without a time label.
    pub fn new(date: NaiveDate, level: f64) -> Self {
        Self {
            date,
            time: None,
            level,
        }
    }

    /// Creates a reading with a time label.
    pub fn with_time(date: NaiveDate, time: impl Into<String>, level: f64) -> Self {
        Self {
            date,
            time: Some(time.into()),
            level,
        }
    }

    /// Returns the display label for this reading.
    ///
    /// The date is rendered with `date_format`, followed by `", <time>"` when
    /// a time label is present. A format that cannot render a date falls back
    /// to ISO 8601.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use glucose::Reading;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
    /// assert_eq!(Reading::new(date, 95.0).label("%m/%d/%Y"), "03/07/2024");
    /// assert_eq!(
    ///     Reading::with_time(date, "8:15 AM", 95.0).label("%m/%d/%Y"),
    ///     "03/07/2024, 8:15 AM"
    /// );
    /// ```
    pub fn label(&self, date_format: &str) -> String {
        let date = format_date(self.date, date_format).unwrap_or_else(|| self.date.to_string());
        match &self.time {
            Some(time) => format!("{date}, {time}"),
            None => date,
        }
    }
}
