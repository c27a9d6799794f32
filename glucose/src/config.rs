//! Source configuration: column layout, date format and delimiter.
//!
//! A [`SourceConfig`] tells the loader how to read one readings file. It is
//! serde-serializable so the same settings can live in a small JSON file next
//! to the data:
//!
//! ```json
//! { "layout": "date-time-level", "date_format": "%m/%d/%Y", "delimiter": "," }
//! ```
//!
//! Missing fields fall back to [`SourceConfig::default`].

use std::fmt::Write as _;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default date format, e.g. `03/07/2024` (non-padded `3/7/2024` also parses).
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Default field delimiter.
pub const DEFAULT_DELIMITER: char = ',';

/// Column order of a readings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnLayout {
    /// Pick `DateLevel` or `DateTimeLevel` from the header's field count.
    #[default]
    Auto,
    /// `date,level`
    DateLevel,
    /// `date,time,level`
    DateTimeLevel,
}

impl ColumnLayout {
    /// Number of leading fields this layout reads, or `None` for `Auto`.
    pub fn field_count(self) -> Option<usize> {
        match self {
            Self::Auto => None,
            Self::DateLevel => Some(2),
            Self::DateTimeLevel => Some(3),
        }
    }

    /// Index of the level field, or `None` for `Auto`.
    pub fn level_index(self) -> Option<usize> {
        self.field_count().map(|n| n - 1)
    }

    /// Index of the time field, if this layout has one.
    pub fn time_index(self) -> Option<usize> {
        match self {
            Self::DateTimeLevel => Some(1),
            Self::Auto | Self::DateLevel => None,
        }
    }

    /// Resolves this layout against a header with `header_len` fields.
    ///
    /// `Auto` maps 2 fields to `DateLevel` and 3 to `DateTimeLevel`; any other
    /// count is ambiguous. Explicit layouts accept any header with at least as
    /// many fields as they read.
    pub fn resolve(self, header_len: usize) -> Option<Self> {
        match self {
            Self::Auto => match header_len {
                2 => Some(Self::DateLevel),
                3 => Some(Self::DateTimeLevel),
                _ => None,
            },
            explicit => explicit
                .field_count()
                .filter(|&n| header_len >= n)
                .map(|_| explicit),
        }
    }
}

/// How to read a delimited readings source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Column order of the file.
    pub layout: ColumnLayout,
    /// `chrono` strftime format for the date column.
    pub date_format: String,
    /// Field delimiter. Must be a single ASCII character.
    pub delimiter: char,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            layout: ColumnLayout::Auto,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl SourceConfig {
    /// Creates a configuration with the given layout and default date format
    /// and delimiter.
    pub fn with_layout(layout: ColumnLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Loads and validates a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] when the file
    /// cannot be read or decoded, and any error from [`Self::validate`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration.
    ///
    /// The date format must render a calendar date and parse it back to the
    /// same date, and the delimiter must be one ASCII byte other than a quote
    /// or a line terminator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDelimiter`] or
    /// [`ConfigError::InvalidDateFormat`].
    pub fn validate(&self) -> Result<()> {
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(ConfigError::InvalidDelimiter {
                delimiter: self.delimiter,
            }
            .into());
        }

        // A date whose month and day differ catches formats that drop or swap them.
        let sample = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default();
        let rendered = format_date(sample, &self.date_format).ok_or_else(|| {
            ConfigError::InvalidDateFormat {
                format: self.date_format.clone(),
                reason: "format cannot render a calendar date".to_string(),
            }
        })?;

        match NaiveDate::parse_from_str(&rendered, &self.date_format) {
            Ok(parsed) if parsed == sample => Ok(()),
            Ok(parsed) => Err(ConfigError::InvalidDateFormat {
                format: self.date_format.clone(),
                reason: format!("'{rendered}' parses back as {parsed}, not {sample}"),
            }
            .into()),
            Err(e) => Err(ConfigError::InvalidDateFormat {
                format: self.date_format.clone(),
                reason: format!("'{rendered}' does not parse back: {e}"),
            }
            .into()),
        }
    }

    /// Returns the delimiter as the byte the CSV reader expects.
    ///
    /// Only meaningful after [`Self::validate`] succeeded.
    #[allow(clippy::cast_possible_truncation)] // validate() guarantees ASCII
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    /// Parses `text` as a date using the configured format.
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text.trim(), &self.date_format).ok()
    }
}

/// Renders `date` with a strftime `format`, or `None` if the format is invalid
/// for a date (unknown specifier, or one that needs a time of day).
pub fn format_date(date: NaiveDate, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GlucoseError;

    #[test]
    fn test_default_config_is_valid() {
        let config = SourceConfig::default();
        assert_eq!(config.layout, ColumnLayout::Auto);
        assert_eq!(config.date_format, "%m/%d/%Y");
        assert_eq!(config.delimiter, ',');
        config.validate().unwrap();
    }

    #[test]
    fn test_resolve_auto_layout() {
        assert_eq!(ColumnLayout::Auto.resolve(2), Some(ColumnLayout::DateLevel));
        assert_eq!(ColumnLayout::Auto.resolve(3), Some(ColumnLayout::DateTimeLevel));
        assert_eq!(ColumnLayout::Auto.resolve(1), None);
        assert_eq!(ColumnLayout::Auto.resolve(4), None);
    }

    #[test]
    fn test_resolve_explicit_layout() {
        assert_eq!(
            ColumnLayout::DateLevel.resolve(3),
            Some(ColumnLayout::DateLevel)
        );
        assert_eq!(ColumnLayout::DateTimeLevel.resolve(2), None);
        assert_eq!(
            ColumnLayout::DateTimeLevel.resolve(5),
            Some(ColumnLayout::DateTimeLevel)
        );
    }

    #[test]
    fn test_column_indices() {
        assert_eq!(ColumnLayout::DateLevel.level_index(), Some(1));
        assert_eq!(ColumnLayout::DateLevel.time_index(), None);
        assert_eq!(ColumnLayout::DateTimeLevel.level_index(), Some(2));
        assert_eq!(ColumnLayout::DateTimeLevel.time_index(), Some(1));
        assert_eq!(ColumnLayout::Auto.level_index(), None);
    }

    #[test]
    fn test_reject_bad_delimiter() {
        for delimiter in ['"', '\n', 'é'] {
            let config = SourceConfig {
                delimiter,
                ..SourceConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(GlucoseError::Config(ConfigError::InvalidDelimiter { .. }))
            ));
        }
    }

    #[test]
    fn test_reject_bad_date_formats() {
        // Unknown specifier, time-only, and a format that loses the day.
        for format in ["%Q", "%H:%M", "%Y-%m"] {
            let config = SourceConfig {
                date_format: format.to_string(),
                ..SourceConfig::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(GlucoseError::Config(ConfigError::InvalidDateFormat { .. }))
                ),
                "format {format} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_date_accepts_unpadded() {
        let config = SourceConfig::default();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5);
        assert_eq!(config.parse_date("1/5/2024"), expected);
        assert_eq!(config.parse_date("01/05/2024"), expected);
        assert_eq!(config.parse_date(" 01/05/2024 "), expected);
        assert_eq!(config.parse_date("2024-01-05"), None);
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        let config: SourceConfig =
            serde_json::from_str(r#"{ "layout": "date-time-level" }"#).unwrap();
        assert_eq!(config.layout, ColumnLayout::DateTimeLevel);
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
        assert_eq!(config.delimiter, ',');

        let json = serde_json::to_string(&config).unwrap();
        let back: SourceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.json");
        std::fs::write(
            &path,
            r#"{ "layout": "date-level", "date_format": "%Y-%m-%d", "delimiter": ";" }"#,
        )
        .unwrap();

        let config = SourceConfig::load(&path).unwrap();
        assert_eq!(config.layout, ColumnLayout::DateLevel);
        assert_eq!(config.delimiter_byte(), b';');

        let missing = SourceConfig::load(dir.path().join("nope.json"));
        assert!(matches!(
            missing,
            Err(GlucoseError::Config(ConfigError::Read { .. }))
        ));
    }

    #[test]
    fn test_format_date_invalid() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(format_date(date, "%m/%d/%Y").as_deref(), Some("02/29/2024"));
        assert_eq!(format_date(date, "%H"), None);
    }
}
