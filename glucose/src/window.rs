//! Date windows: single day, trailing week, calendar month.
//!
//! Every window is a half-open range `[start, end)` of calendar dates. The
//! trailing week ending on `d` is `[d - 6, d + 1)`, which is the inclusive
//! range `d - 6 ..= d`. A calendar month is `[first of month, first of next
//! month)`.
//!
//! The first of the next month is found by anchoring on day 1, stepping 32
//! days forward (always lands in the next month, whatever the month length)
//! and re-anchoring on day 1. This also rolls December into January.
//!
//! Date arithmetic saturates at [`NaiveDate::MIN`] / [`NaiveDate::MAX`] rather
//! than panicking. A window whose exclusive end would lie past
//! [`NaiveDate::MAX`] ends at `MAX` and includes it.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of days in a trailing week.
pub const WEEK_DAYS: u64 = 7;

/// Window granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// A single calendar day.
    Day,
    /// The 7 days ending on (and including) the reference date.
    Week,
    /// The calendar month containing the reference date.
    Month,
}

impl Period {
    /// All periods, shortest first.
    pub const ALL: [Period; 3] = [Period::Day, Period::Week, Period::Month];

    /// Returns the window of this period that contains `date`.
    pub fn window(self, date: NaiveDate) -> DateWindow {
        match self {
            Self::Day => DateWindow::day(date),
            Self::Week => DateWindow::trailing_week(date),
            Self::Month => DateWindow::calendar_month(date),
        }
    }

    /// Returns the window immediately preceding the one that contains `date`.
    ///
    /// - `Day`: the day before `date`.
    /// - `Week`: the trailing week that ends the day before the current
    ///   week starts, i.e. `date - 13 ..= date - 7`.
    /// - `Month`: the calendar month before the one containing `date`.
    pub fn previous_window(self, date: NaiveDate) -> DateWindow {
        let current = self.window(date);
        let before = sub_days(current.start, 1);
        self.window(before)
    }

    /// Lowercase name used in logs and output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A half-open range of calendar dates, `[start, end)`.
///
/// The one exception is a window running to the end of the calendar: it has
/// `end == NaiveDate::MAX` and `includes_end` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    /// First date in the window.
    pub start: NaiveDate,
    /// First date after the window, or its last date when `includes_end`.
    pub end: NaiveDate,
    /// Set when `end` is [`NaiveDate::MAX`] and belongs to the window.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub includes_end: bool,
}

impl DateWindow {
    /// Creates a window from a start date and an exclusive end date.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            includes_end: false,
        }
    }

    /// Creates `[start, end)`, or `[start, MAX]` when `end` is not
    /// representable.
    fn until(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        match end {
            Some(end) => Self::new(start, end),
            None => Self {
                start,
                end: NaiveDate::MAX,
                includes_end: true,
            },
        }
    }

    /// The window holding exactly `date`.
    pub fn day(date: NaiveDate) -> Self {
        Self::until(date, next_day(date))
    }

    /// The inclusive 7-day window ending on `end`.
    pub fn trailing_week(end: NaiveDate) -> Self {
        Self::until(sub_days(end, WEEK_DAYS - 1), next_day(end))
    }

    /// The calendar month containing `date`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use glucose::window::DateWindow;
    ///
    /// let dec = DateWindow::calendar_month(NaiveDate::from_ymd_opt(2024, 12, 15).unwrap());
    /// assert_eq!(dec.start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
    /// assert_eq!(dec.end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    /// ```
    pub fn calendar_month(date: NaiveDate) -> Self {
        Self::until(first_of_month(date), checked_first_of_next_month(date))
    }

    /// Returns whether `date` falls inside this window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && (date < self.end || (self.includes_end && date == self.end))
    }

    /// First date in the window.
    pub fn first_day(&self) -> NaiveDate {
        self.start
    }

    /// Last date in the window (inclusive).
    pub fn last_day(&self) -> NaiveDate {
        if self.includes_end {
            self.end
        } else {
            sub_days(self.end, 1)
        }
    }

    /// Number of calendar days covered.
    pub fn num_days(&self) -> u64 {
        let days = u64::try_from((self.end - self.start).num_days()).unwrap_or(0);
        days + u64::from(self.includes_end)
    }
}

/// Returns day 1 of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    sub_days(date, u64::from(date.day0()))
}

/// Returns day 1 of the month after the one containing `date`.
///
/// Saturates at [`NaiveDate::MAX`] in the last representable month.
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    checked_first_of_next_month(date).unwrap_or(NaiveDate::MAX)
}

fn checked_first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    first_of_month(date)
        .checked_add_days(Days::new(32))
        .map(first_of_month)
}

fn next_day(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(1))
}

fn sub_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}
