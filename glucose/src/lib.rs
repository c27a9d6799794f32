//! # glucose
//!
//! Read-only store of blood-glucose readings with date-windowed queries.
//!
//! glucose loads a delimited file of dated readings once, keeps them in
//! memory in file order, and answers windowed questions over that snapshot:
//! what was read today, over the trailing week, over the calendar month, and
//! how the previous period averaged. Results are handed to a chart renderer
//! or a display shell through plain data types.
//!
//! ## Key Properties
//!
//! - Eager, all-or-nothing load: a bad row rejects the whole file
//! - Every query is a stable sub-selection in file order
//! - Empty windows yield empty results and `None` statistics, never `0` or `-1`
//! - Calendar-correct month windows (28–31 days, December → January)
//! - No write path; a built store is `Send + Sync`
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use glucose::{ReadingsStore, SourceConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let csv = "date,time,level\n\
//!            12/14/2024,08:00,96\n\
//!            12/15/2024,08:00,88\n\
//!            12/15/2024,19:30,142\n";
//!
//! let store = ReadingsStore::from_reader(csv.as_bytes(), &SourceConfig::default())?;
//! let today = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
//!
//! let day = store.readings_by_day(today);
//! let stats = day.stats().unwrap();
//! assert_eq!((stats.min, stats.average, stats.max), (88.0, 115.0, 142.0));
//!
//! assert_eq!(store.average_for_previous_day(today), Some(96.0));
//! assert_eq!(store.average_for_previous_week(today), None);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`ReadingsStore`] — Loads a source and answers every query
//! - [`Reading`] — One dated measurement with an optional time label
//! - [`SourceConfig`] — Column layout, date format and delimiter
//! - [`WindowResult`] — Readings selected by one window, with statistics
//!
//! ## Modules
//!
//! - [`store`] — Store construction and queries
//! - [`reading`] — The reading record
//! - [`config`] — Source configuration
//! - [`source`] — Delimited-text parsing
//! - [`window`] — Day, trailing-week and calendar-month windows
//! - [`query`] — Window query results
//! - [`stats`] — Min/average/max and daily averages
//! - [`export`] — Chart renderer hand-off and the safe range
//! - [`dashboard`] — Display shell hand-off
//! - [`error`] — Error types

pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod query;
pub mod reading;
pub mod source;
pub mod stats;
pub mod store;
pub mod window;

// Re-export primary API types at crate root for convenience.
pub use config::{ColumnLayout, SourceConfig};
pub use dashboard::{Dashboard, PeriodSummary};
pub use error::{ConfigError, GlucoseError, ParseError, Result, SourceError};
pub use export::{ChartSeries, SafeRange, Zone};
pub use query::WindowResult;
pub use reading::Reading;
pub use stats::{DailyAverage, WindowStats};
pub use store::ReadingsStore;
pub use window::{DateWindow, Period};
