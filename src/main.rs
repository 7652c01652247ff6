//! CLI entry point for the air quality tool.
//!
//! Provides subcommands for daily quality aggregation of a readings file,
//! fetching station history from air4thai, and summarizing one parameter
//! over a date range.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use air_quality::analyzers::types::Parameter;
use air_quality::analyzers::view::{ChartKind, ViewFilter, parameter_view};
use air_quality::config::Settings;
use air_quality::fetch::BasicClient;
use air_quality::infra::air4thai::Air4ThaiClient;
use air_quality::output::{print_json, print_pretty, write_station_records};
use air_quality::services::history_api::{
    DEFAULT_PARAMS, HistoryApi, HistoryQuery, split_params,
};
use air_quality::{Dataset, run_daily_quality};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "air_quality")]
#[command(about = "A tool to aggregate and inspect air quality readings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Average a readings CSV per day and label PM2.5 quality
    Quality {
        /// Raw readings CSV with a DATETIMEDATA column
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
    /// Download station history from air4thai into a readings CSV
    Fetch {
        /// Station ID to fetch (repeatable)
        #[arg(short, long = "station", required = true)]
        stations: Vec<String>,

        /// Comma-separated parameter list
        #[arg(short, long, default_value = DEFAULT_PARAMS)]
        params: String,

        /// First day to fetch (YYYY-MM-DD)
        #[arg(long, default_value = "2023-12-29")]
        start: NaiveDate,

        /// Last day to fetch (YYYY-MM-DD)
        #[arg(long, default_value = "2024-03-05")]
        end: NaiveDate,

        /// CSV file to write
        #[arg(short, long, default_value = "air4thai_stations_data.csv")]
        output: String,
    },
    /// Summarize one parameter of a readings CSV over a date range
    View {
        /// Raw readings CSV with a DATETIMEDATA column
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Parameter to chart (O3, WS, TEMP, RH, WD, PM25)
        #[arg(short, long, default_value = "PM25")]
        parameter: Parameter,

        /// Range start (YYYY-MM-DD); defaults to the first reading's day
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Range end (YYYY-MM-DD); defaults to the last reading's day
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Chart type: line, bar or scatter
        #[arg(short, long, default_value = "line")]
        chart: ChartKind,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let settings = Settings::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&settings.log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&settings.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("air_quality.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Quality { input } => {
            let output = run_daily_quality(&input)?;
            info!(output = %output.display(), "Wrote quality table");
        }
        Commands::Fetch {
            stations,
            params,
            start,
            end,
            output,
        } => {
            fetch_stations(&settings, &stations, &params, start, end, &output).await?;
        }
        Commands::View {
            input,
            parameter,
            start,
            end,
            chart,
        } => {
            let dataset = Dataset::load(&input)?;
            let first = dataset.readings().iter().map(|r| r.date()).min();
            let last = dataset.readings().iter().map(|r| r.date()).max();

            let (Some(start), Some(end)) = (start.or(first), end.or(last)) else {
                warn!(input = %input.display(), "No readings to summarize");
                return Ok(());
            };

            let view = parameter_view(
                &dataset,
                &ViewFilter {
                    parameter,
                    start,
                    end,
                    chart,
                },
            );
            print_pretty(&view.summary);
            print_json(&view)?;
        }
    }

    Ok(())
}

/// Fetches each station's history in turn and writes all records to one CSV.
#[tracing::instrument(skip(settings, stations), fields(stations = stations.len()))]
async fn fetch_stations(
    settings: &Settings,
    stations: &[String],
    params: &str,
    start: NaiveDate,
    end: NaiveDate,
    output: &str,
) -> Result<()> {
    let http = BasicClient::with_timeout(settings.http_timeout)?;
    let client = Air4ThaiClient::new(http, settings.history_base_url.clone());

    let params = split_params(params);
    let start = start.format("%Y-%m-%d").to_string();
    let end = end.format("%Y-%m-%d").to_string();

    let mut all_records = Vec::new();
    for station_id in stations {
        let query = HistoryQuery::new(station_id.as_str())
            .with_params(params.clone())
            .with_dates(&start, &end);

        let records = client.station_history(&query).await?;
        info!(station_id = %station_id, rows = records.len(), "Retrieved station data");
        all_records.extend(records);
    }

    if all_records.is_empty() {
        warn!("No data retrieved, nothing written");
        return Ok(());
    }

    write_station_records(output, &params, &all_records)?;
    info!(output, rows = all_records.len(), "Station data saved");
    Ok(())
}
