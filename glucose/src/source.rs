//! Parsing delimited readings sources.
//!
//! A source is one header row followed by data rows in one of the layouts of
//! [`ColumnLayout`]. Fields are trimmed and extra trailing fields are ignored.
//! The first bad row aborts the whole parse: a source is either loaded
//! completely or not at all.
//!
//! ```text
//! date,time,level          date,level
//! 12/01/2024,07:30,92      12/01/2024,92
//! 12/01/2024,12:10,141     12/01/2024,141
//! ```

use std::io::Read;

use csv::StringRecord;

use crate::config::{ColumnLayout, SourceConfig};
use crate::error::{ParseError, Result};
use crate::reading::Reading;

/// The outcome of parsing a source.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSource {
    /// The layout actually used (never `Auto`).
    pub layout: ColumnLayout,
    /// Readings in source order.
    pub readings: Vec<Reading>,
}

/// Parses every reading from `input`.
///
/// A header with no data rows yields an empty reading list.
///
/// # Errors
///
/// - [`ParseError::MissingHeader`] if `input` is empty
/// - [`ParseError::MalformedHeader`] if the header does not fit the layout or
///   looks like a data row
/// - [`ParseError::MissingColumn`], [`ParseError::InvalidDate`],
///   [`ParseError::InvalidLevel`] or [`ParseError::LevelOutOfRange`] for the
///   first bad row
/// - [`ParseError::Csv`] if the input is not valid delimited text
/// - any error from [`SourceConfig::validate`]
pub fn parse<R: Read>(input: R, config: &SourceConfig) -> Result<ParsedSource> {
    config.validate()?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(config.delimiter_byte())
        .from_reader(input);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let layout = resolve_layout(&headers, config)?;

    let mut readings = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        readings.push(parse_record(&record, layout, config)?);
    }

    tracing::debug!(
        rows = readings.len(),
        ?layout,
        "parsed readings source"
    );

    Ok(ParsedSource { layout, readings })
}

/// Checks the header row and resolves the layout it implies.
fn resolve_layout(headers: &StringRecord, config: &SourceConfig) -> Result<ColumnLayout> {
    if headers.is_empty() {
        return Err(ParseError::MissingHeader.into());
    }

    if let Some(first) = headers.get(0)
        && config.parse_date(first).is_some()
    {
        return Err(ParseError::MalformedHeader {
            reason: format!("first field '{first}' is a date; expected a header row"),
        }
        .into());
    }

    let layout = config.layout.resolve(headers.len()).ok_or_else(|| {
        let reason = match config.layout.field_count() {
            Some(needed) => format!(
                "layout {:?} needs {needed} columns, header has {}",
                config.layout,
                headers.len()
            ),
            None => format!(
                "cannot infer layout from {} header columns (expected 2 or 3)",
                headers.len()
            ),
        };
        ParseError::MalformedHeader { reason }
    })?;

    if let Some(needed) = layout.field_count()
        && headers.len() > needed
    {
        tracing::warn!(
            header = ?headers,
            ?layout,
            "header has {} extra column(s); they are ignored",
            headers.len() - needed
        );
    }

    Ok(layout)
}

/// Converts one data row into a [`Reading`].
fn parse_record(
    record: &StringRecord,
    layout: ColumnLayout,
    config: &SourceConfig,
) -> Result<Reading> {
    let line = record.position().map_or(0, csv::Position::line);

    let date_text = field(record, 0, line, "date")?;
    let date = config
        .parse_date(date_text)
        .ok_or_else(|| ParseError::InvalidDate {
            line,
            value: date_text.to_string(),
            format: config.date_format.clone(),
        })?;

    let time = match layout.time_index() {
        Some(index) => {
            let text = field(record, index, line, "time")?;
            (!text.is_empty()).then(|| text.to_string())
        }
        None => None,
    };

    let level_index = layout.level_index().unwrap_or(1);
    let level_text = field(record, level_index, line, "level")?;
    let level: f64 = level_text.parse().map_err(|_| ParseError::InvalidLevel {
        line,
        value: level_text.to_string(),
    })?;
    if !level.is_finite() || level < 0.0 {
        return Err(ParseError::LevelOutOfRange { line, level }.into());
    }

    Ok(Reading { date, time, level })
}

fn field<'r>(
    record: &'r StringRecord,
    index: usize,
    line: u64,
    column: &'static str,
) -> Result<&'r str> {
    record
        .get(index)
        .ok_or_else(|| ParseError::MissingColumn { line, column }.into())
}

fn csv_error(source: csv::Error) -> crate::error::GlucoseError {
    let line = source.position().map(csv::Position::line);
    ParseError::Csv { line, source }.into()
}
