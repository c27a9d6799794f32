//! Precomputed views for a display shell.
//!
//! A display shell shows three standard windows (today, this week, this
//! month) with their readings, their min/average/max, and the average of the
//! preceding period for comparison. [`Dashboard::build`] computes all of it
//! once, up front, so the shell never queries the store itself.

use chrono::NaiveDate;
use serde::Serialize;

use crate::export::{ChartSeries, SafeRange};
use crate::reading::Reading;
use crate::stats::WindowStats;
use crate::store::ReadingsStore;
use crate::window::{DateWindow, Period};

/// Everything shown for one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// Which period this is.
    pub period: Period,
    /// The window the readings were selected with.
    pub window: DateWindow,
    /// Readings in the window, file order.
    pub readings: Vec<Reading>,
    /// Min/average/max, `None` when the window is empty.
    pub stats: Option<WindowStats>,
    /// Average of the preceding period, `None` when it had no readings.
    pub previous_average: Option<f64>,
    /// Fraction of readings inside the safe range, `None` when empty.
    pub time_in_range: Option<f64>,
}

impl PeriodSummary {
    fn build(store: &ReadingsStore, period: Period, today: NaiveDate, range: &SafeRange) -> Self {
        let result = store.readings_in(period, today);
        Self {
            period,
            window: result.window(),
            stats: result.stats(),
            previous_average: store.average_for_previous(period, today),
            time_in_range: range.time_in_range(&result.levels()),
            readings: result.to_vec(),
        }
    }

    /// Current average minus the previous period's average, when both exist.
    pub fn change_from_previous(&self) -> Option<f64> {
        Some(self.stats?.average - self.previous_average?)
    }

    /// Chart title shown for this period.
    pub fn chart_title(&self) -> &'static str {
        match self.period {
            Period::Day => "Today's Glucose Readings",
            Period::Week => "Weekly Glucose Readings",
            Period::Month => "Monthly Glucose Readings",
        }
    }

    /// Output name handed to the chart renderer.
    pub fn output_name(&self) -> &'static str {
        match self.period {
            Period::Day => "daily_readings",
            Period::Week => "weekly_readings",
            Period::Month => "monthly_readings",
        }
    }

    /// The chart series for this period.
    pub fn chart(&self, date_format: &str) -> ChartSeries {
        ChartSeries::from_readings(
            &self.readings,
            self.chart_title(),
            "Time",
            self.output_name(),
            date_format,
        )
    }
}

/// The startup snapshot of day, week and month views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// The date all windows are anchored on.
    pub today: NaiveDate,
    /// The band used for `time_in_range`.
    pub safe_range: SafeRange,
    /// Readings on `today`.
    pub day: PeriodSummary,
    /// Readings in the 7 days ending on `today`.
    pub week: PeriodSummary,
    /// Readings in the calendar month of `today`.
    pub month: PeriodSummary,
}

impl Dashboard {
    /// Builds the snapshot with the default safe range.
    pub fn build(store: &ReadingsStore, today: NaiveDate) -> Self {
        Self::build_with_range(store, today, SafeRange::default())
    }

    /// Builds the snapshot with a custom safe range.
    pub fn build_with_range(store: &ReadingsStore, today: NaiveDate, safe_range: SafeRange) -> Self {
        let dashboard = Self {
            today,
            safe_range,
            day: PeriodSummary::build(store, Period::Day, today, &safe_range),
            week: PeriodSummary::build(store, Period::Week, today, &safe_range),
            month: PeriodSummary::build(store, Period::Month, today, &safe_range),
        };
        tracing::debug!(
            %today,
            day = dashboard.day.readings.len(),
            week = dashboard.week.readings.len(),
            month = dashboard.month.readings.len(),
            "built dashboard"
        );
        dashboard
    }

    /// The summary for `period`.
    pub fn period(&self, period: Period) -> &PeriodSummary {
        match period {
            Period::Day => &self.day,
            Period::Week => &self.week,
            Period::Month => &self.month,
        }
    }

    /// Chart series for day, week and month, in that order.
    pub fn charts(&self, date_format: &str) -> Vec<ChartSeries> {
        Period::ALL
            .iter()
            .map(|&p| self.period(p).chart(date_format))
            .collect()
    }
}
