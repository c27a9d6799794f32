//! CLI for the glucose readings store.
//!
//! Loads a readings file and prints windowed views, daily averages, the
//! startup dashboard, or chart series for an external renderer.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use glucose::{
    ChartSeries, ColumnLayout, Dashboard, Period, Reading, ReadingsStore, SourceConfig,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// glucose — Blood-glucose readings store CLI.
#[derive(Parser)]
#[command(name = "glucose", version, about)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

/// How to read the readings file.
#[derive(Args)]
struct SourceArgs {
    /// JSON source configuration; the flags below override its fields.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Column layout of the readings file.
    #[arg(long, global = true)]
    layout: Option<LayoutArg>,

    /// strftime format of the date column and of `--date`.
    #[arg(long, global = true)]
    date_format: Option<String>,

    /// Field delimiter.
    #[arg(long, global = true)]
    delimiter: Option<char>,
}

/// Available CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Display reading counts, date span and layout.
    Info {
        /// Path to the readings file.
        file: PathBuf,
    },

    /// Print the readings of one day, trailing week or calendar month.
    Query {
        /// Path to the readings file.
        file: PathBuf,

        /// Window to select.
        #[arg(long, default_value = "day")]
        period: PeriodArg,

        /// Reference date (defaults to today).
        #[arg(long)]
        date: Option<String>,

        /// Output format.
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Print the most recent readings.
    Recent {
        /// Path to the readings file.
        file: PathBuf,

        /// Number of readings.
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Output format.
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Print one average per day.
    Daily {
        /// Path to the readings file.
        file: PathBuf,

        /// Output format.
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Print min/average/max for today, this week and this month, with the
    /// previous period's average.
    Summary {
        /// Path to the readings file.
        file: PathBuf,

        /// Reference date (defaults to today).
        #[arg(long)]
        date: Option<String>,

        /// Output format.
        #[arg(long, default_value = "csv")]
        format: OutputFormat,
    },

    /// Print a chart series (labels and levels) as JSON.
    Chart {
        /// Path to the readings file.
        file: PathBuf,

        /// Window to chart.
        #[arg(long, default_value = "day")]
        period: PeriodArg,

        /// Reference date (defaults to today).
        #[arg(long)]
        date: Option<String>,

        /// Chart title (defaults to the period's standard title).
        #[arg(long)]
        title: Option<String>,

        /// X-axis label.
        #[arg(long, default_value = "Time")]
        x_label: String,
    },
}

/// Output format for query results.
#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Comma-separated values.
    Csv,
    /// JSON.
    Json,
}

/// Column layout argument.
#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    /// Infer from the header.
    Auto,
    /// `date,level`
    DateLevel,
    /// `date,time,level`
    DateTimeLevel,
}

impl From<LayoutArg> for ColumnLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Auto => ColumnLayout::Auto,
            LayoutArg::DateLevel => ColumnLayout::DateLevel,
            LayoutArg::DateTimeLevel => ColumnLayout::DateTimeLevel,
        }
    }
}

/// Window argument.
#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    /// A single day.
    Day,
    /// The 7 days ending on the reference date.
    Week,
    /// The calendar month of the reference date.
    Month,
}

impl From<PeriodArg> for Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Day => Period::Day,
            PeriodArg::Week => Period::Week,
            PeriodArg::Month => Period::Month,
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Chart axes are padded by this many mg/dL beyond the band and the data.
const AXIS_PADDING: f64 = 5.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = resolve_config(&cli.source).and_then(|config| run(cli.command, &config));

    if let Err(e) = result {
        tracing::debug!("command failed: {e:?}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: &SourceConfig) -> CliResult {
    match command {
        Commands::Info { file } => cmd_info(&file, config),
        Commands::Query {
            file,
            period,
            date,
            format,
        } => cmd_query(&file, config, period.into(), date.as_deref(), &format),
        Commands::Recent {
            file,
            count,
            format,
        } => cmd_recent(&file, config, count, &format),
        Commands::Daily { file, format } => cmd_daily(&file, config, &format),
        Commands::Summary { file, date, format } => {
            cmd_summary(&file, config, date.as_deref(), &format)
        }
        Commands::Chart {
            file,
            period,
            date,
            title,
            x_label,
        } => cmd_chart(&file, config, period.into(), date.as_deref(), title, &x_label),
    }
}

/// Builds the source configuration from `--config` and the override flags.
fn resolve_config(args: &SourceArgs) -> Result<SourceConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SourceConfig::load(path)?,
        None => SourceConfig::default(),
    };

    if let Some(layout) = args.layout {
        config.layout = layout.into();
    }
    if let Some(format) = &args.date_format {
        config.date_format.clone_from(format);
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }

    config.validate()?;
    Ok(config)
}

/// Parses `--date`, or returns today's local date.
fn reference_date(
    date: Option<&str>,
    config: &SourceConfig,
) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(text) => config.parse_date(text).ok_or_else(|| {
            format!(
                "invalid date '{text}' (expected format '{}')",
                config.date_format
            )
            .into()
        }),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Implements `glucose info <file>`.
fn cmd_info(file: &Path, config: &SourceConfig) -> CliResult {
    let store = ReadingsStore::open(file, config)?;
    write_info(&mut io::stdout().lock(), file, &store, config)
}

/// Implements `glucose query <file> --period <p>`.
fn cmd_query(
    file: &Path,
    config: &SourceConfig,
    period: Period,
    date: Option<&str>,
    format: &OutputFormat,
) -> CliResult {
    let store = ReadingsStore::open(file, config)?;
    let reference = reference_date(date, config)?;
    write_query(&mut io::stdout().lock(), &store, config, period, reference, format)
}

/// Implements `glucose recent <file>`.
fn cmd_recent(file: &Path, config: &SourceConfig, count: usize, format: &OutputFormat) -> CliResult {
    let store = ReadingsStore::open(file, config)?;
    write_readings(&mut io::stdout().lock(), store.recent_readings(count), config, format)
}

/// Implements `glucose daily <file>`.
fn cmd_daily(file: &Path, config: &SourceConfig, format: &OutputFormat) -> CliResult {
    let store = ReadingsStore::open(file, config)?;
    write_daily(&mut io::stdout().lock(), &store, config, format)
}

/// Implements `glucose summary <file>`.
fn cmd_summary(
    file: &Path,
    config: &SourceConfig,
    date: Option<&str>,
    format: &OutputFormat,
) -> CliResult {
    let store = ReadingsStore::open(file, config)?;
    let today = reference_date(date, config)?;
    let dashboard = Dashboard::build(&store, today);
    write_summary(&mut io::stdout().lock(), &dashboard, format)
}

/// Implements `glucose chart <file> --period <p>`.
fn cmd_chart(
    file: &Path,
    config: &SourceConfig,
    period: Period,
    date: Option<&str>,
    title: Option<String>,
    x_label: &str,
) -> CliResult {
    let store = ReadingsStore::open(file, config)?;
    let today = reference_date(date, config)?;
    let dashboard = Dashboard::build(&store, today);
    write_chart(
        &mut io::stdout().lock(),
        &dashboard,
        period,
        config,
        title,
        x_label,
    )
}

/// One `date,time,level` output row.
#[derive(Serialize)]
struct ReadingRow<'a> {
    date: String,
    time: &'a str,
    level: f64,
}

impl<'a> ReadingRow<'a> {
    fn new(reading: &'a Reading, config: &SourceConfig) -> Self {
        Self {
            date: display_date(reading.date, config),
            time: reading.time.as_deref().unwrap_or(""),
            level: reading.level,
        }
    }
}

/// One `date,average_level,count` output row.
#[derive(Serialize)]
struct DailyRow {
    date: String,
    average_level: f64,
    count: usize,
}

/// One summary row per period; absent statistics are empty fields.
#[derive(Serialize)]
struct SummaryRow {
    period: Period,
    from: NaiveDate,
    to: NaiveDate,
    count: usize,
    min: Option<f64>,
    average: Option<f64>,
    max: Option<f64>,
    previous_average: Option<f64>,
    time_in_range: Option<f64>,
}

fn write_info<W: Write>(
    out: &mut W,
    file: &Path,
    store: &ReadingsStore,
    config: &SourceConfig,
) -> CliResult {
    writeln!(out, "File: {}", file.display())?;
    writeln!(out, "Layout: {:?}", store.layout())?;
    writeln!(out, "Readings: {}", store.len())?;

    match store.date_range() {
        Some((first, last)) => {
            writeln!(
                out,
                "Span: {} .. {}",
                display_date(first, config),
                display_date(last, config)
            )?;
            writeln!(out, "Days with readings: {}", store.daily_averages().len())?;
            if let Some(stats) = glucose::WindowStats::from_readings(store.readings()) {
                writeln!(
                    out,
                    "Levels: min={} avg={} max={}",
                    fmt_level(stats.min),
                    fmt_level(stats.average),
                    fmt_level(stats.max)
                )?;
            }
        }
        None => writeln!(out, "Span: (no readings)")?,
    }

    Ok(())
}

fn write_query<W: Write>(
    out: &mut W,
    store: &ReadingsStore,
    config: &SourceConfig,
    period: Period,
    reference: NaiveDate,
    format: &OutputFormat,
) -> CliResult {
    let result = store.readings_in(period, reference);
    let window = result.window();

    match format {
        OutputFormat::Csv => {
            writeln!(
                out,
                "# period={period}, from={}, to={}, count={}",
                window.first_day(),
                window.last_day(),
                result.len()
            )?;
            write_readings_csv(out, result.iter(), config)
        }
        OutputFormat::Json => write_json(
            out,
            &serde_json::json!({
                "period": period,
                "window": window,
                "count": result.len(),
                "stats": result.stats(),
                "readings": result.to_vec(),
            }),
        ),
    }
}

fn write_readings<W: Write>(
    out: &mut W,
    readings: &[Reading],
    config: &SourceConfig,
    format: &OutputFormat,
) -> CliResult {
    match format {
        OutputFormat::Csv => write_readings_csv(out, readings, config),
        OutputFormat::Json => write_json(out, readings),
    }
}

fn write_readings_csv<'a, W: Write>(
    out: &mut W,
    readings: impl IntoIterator<Item = &'a Reading>,
    config: &SourceConfig,
) -> CliResult {
    let mut writer = csv_writer(out);
    writer.write_record(["date", "time", "level"])?;
    for reading in readings {
        writer.serialize(ReadingRow::new(reading, config))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_daily<W: Write>(
    out: &mut W,
    store: &ReadingsStore,
    config: &SourceConfig,
    format: &OutputFormat,
) -> CliResult {
    let daily = store.daily_averages();

    match format {
        OutputFormat::Csv => {
            let mut writer = csv_writer(out);
            writer.write_record(["date", "average_level", "count"])?;
            for day in &daily {
                writer.serialize(DailyRow {
                    date: display_date(day.date, config),
                    average_level: day.average_level,
                    count: day.count,
                })?;
            }
            writer.flush()?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, &daily),
    }
}

fn write_summary<W: Write>(out: &mut W, dashboard: &Dashboard, format: &OutputFormat) -> CliResult {
    match format {
        OutputFormat::Csv => {
            writeln!(out, "# today={}", dashboard.today)?;
            let mut writer = csv_writer(out);
            writer.write_record([
                "period",
                "from",
                "to",
                "count",
                "min",
                "average",
                "max",
                "previous_average",
                "time_in_range",
            ])?;
            for period in Period::ALL {
                let summary = dashboard.period(period);
                let stats = summary.stats;
                writer.serialize(SummaryRow {
                    period,
                    from: summary.window.first_day(),
                    to: summary.window.last_day(),
                    count: summary.readings.len(),
                    min: stats.map(|s| s.min),
                    average: stats.map(|s| s.average),
                    max: stats.map(|s| s.max),
                    previous_average: summary.previous_average,
                    time_in_range: summary.time_in_range,
                })?;
            }
            writer.flush()?;
            Ok(())
        }
        OutputFormat::Json => write_json(out, dashboard),
    }
}

fn write_chart<W: Write>(
    out: &mut W,
    dashboard: &Dashboard,
    period: Period,
    config: &SourceConfig,
    title: Option<String>,
    x_label: &str,
) -> CliResult {
    let mut series: ChartSeries = dashboard.period(period).chart(&config.date_format);
    if let Some(title) = title {
        series.title = title;
    }
    x_label.clone_into(&mut series.x_label);

    write_json(
        out,
        &serde_json::json!({
            "series": series,
            "safe_range": dashboard.safe_range,
            "axis_bounds": dashboard.safe_range.axis_bounds(&series.levels, AXIS_PADDING),
        }),
    )
}

/// CSV writer whose header row is written explicitly, so an empty result
/// still prints one.
fn csv_writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().has_headers(false).from_writer(out)
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> CliResult {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Formats `date` with the configured format, falling back to ISO.
fn display_date(date: NaiveDate, config: &SourceConfig) -> String {
    glucose::config::format_date(date, &config.date_format).unwrap_or_else(|| date.to_string())
}

/// Formats a level with at most two decimals.
fn fmt_level(level: f64) -> String {
    let text = format!("{level:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
