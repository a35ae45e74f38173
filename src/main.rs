//! CLI entry point for the hotspot supply/demand analyzer.
//!
//! Computes per-hotspot supply hours, offers and status for one hour bucket,
//! writes the result to CSV/JSON and optionally publishes it to S3.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use hotspot_supply::analyzers::status::check_supply;
use hotspot_supply::analyzers::types::MetricsReport;
use hotspot_supply::analyzers::writetos3::{report_key_prefix, write_bytes_to_s3, write_json_to_s3};
use hotspot_supply::bucket::{HourBucket, default_selection};
use hotspot_supply::config::AnalysisConfig;
use hotspot_supply::fetch::auth::ApiKey;
use hotspot_supply::fetch::{BasicClient, HttpClient};
use hotspot_supply::infra::csv_dir::CsvSource;
use hotspot_supply::infra::warehouse::WarehouseClient;
use hotspot_supply::output::{append_metrics, gzip, print_json, print_pretty, print_table, write_json};
use hotspot_supply::services::DataSource;
use hotspot_supply::{classify, compute_bucket, compute_with_trend};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "hotspot_supply")]
#[command(about = "Compare predicted hotspot demand with observed fleet supply", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// How the report is logged once computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One line per hotspot
    Table,
    /// Rust debug pretty-print (logged at debug level)
    Pretty,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute hotspot metrics for one hour bucket
    Compute {
        /// Directory of CSV exports, or base URL of the warehouse gateway
        #[arg(value_name = "DIR_OR_URL")]
        source: String,

        /// Hour of day (0-23); defaults to the latest completed hour, capped at 18
        #[arg(long)]
        hour: Option<u32>,

        /// Day relative to today (0 = today, -1 = yesterday)
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        day_offset: i64,

        /// Also compute the previous hour and add demand trends
        #[arg(long, default_value_t = false)]
        trend: bool,

        /// CSV file to append metric rows to
        #[arg(short, long, default_value = "metrics.csv")]
        output: String,

        /// Optional: write the full JSON report to this path
        #[arg(long)]
        json: Option<String>,

        /// How to log the report
        #[arg(long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Optional: JSON file with analysis settings
        #[arg(short, long)]
        config: Option<String>,

        /// Optional: S3 bucket name to publish the report to (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress the CSV before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Classify a single demand/supply pair
    Classify {
        /// Predicted demand
        #[arg(long, allow_hyphen_values = true)]
        demand: f64,

        /// Net supply hours
        #[arg(long, allow_hyphen_values = true)]
        supply: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/hotspot_supply.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("hotspot_supply.log"));

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
        Commands::Compute {
            source,
            hour,
            day_offset,
            trend,
            output,
            json,
            format,
            config,
            s3_bucket,
            gzip,
        } => {
            let config = match config {
                Some(path) => AnalysisConfig::load(&path)?,
                None => AnalysisConfig::default(),
            };

            let now = Utc::now().with_timezone(&config.timezone);
            let (hour, day_offset) = match hour {
                Some(hour) => (hour, day_offset),
                None => default_selection(&now, day_offset),
            };
            let bucket = HourBucket::resolve(&now, hour, day_offset)?;
            info!(bucket = %bucket, day_of_week = %bucket.day_of_week(), "Showing data");

            let data_source = open_source(&source, &config)?;
            let report = if trend {
                compute_with_trend(data_source.as_ref(), bucket, &config).await?
            } else {
                compute_bucket(data_source.as_ref(), bucket, &config).await?
            };

            match format {
                Format::Table => print_table(&report),
                Format::Pretty => print_pretty(&report),
                Format::Json => print_json(&report)?,
            }
            append_metrics(&output, &report.metrics)
                .with_context(|| format!("failed to write {output}"))?;
            if let Some(path) = &json {
                write_json(path, &report).with_context(|| format!("failed to write {path}"))?;
            }

            if let Some(s3_bucket) = s3_bucket {
                publish(&s3_bucket, &report, gzip).await?;
            }

            info!(
                hotspots = report.summary.hotspots,
                warnings = report.warnings.len(),
                output = %output,
                "Finished computing bucket"
            );
        }
        Commands::Classify { demand, supply } => {
            let status = classify(demand, supply);
            info!(demand, supply, status = %status, color = status.color(), "Classified");

            let limit = AnalysisConfig::default().implausible_supply_hours;
            if let Some(warning) = check_supply("(input)", supply, limit) {
                warn!("{}", warning);
            }
        }
    }

    Ok(())
}

/// Picks the data source from the argument: URLs go to the warehouse
/// gateway, anything else is treated as a CSV directory.
fn open_source(source: &str, config: &AnalysisConfig) -> Result<Box<dyn DataSource>> {
    if !source.starts_with("http") {
        info!(dir = source, "Reading CSV exports");
        return Ok(Box::new(CsvSource::new(source, config.timezone)));
    }

    let http = BasicClient::with_timeouts(Duration::from_secs(30), Duration::from_secs(10))?;
    let http: Box<dyn HttpClient> = match std::env::var("HOTSPOT_WAREHOUSE_TOKEN") {
        Ok(token) => Box::new(ApiKey::bearer(http, &token)?),
        Err(_) => {
            info!("HOTSPOT_WAREHOUSE_TOKEN not set, querying warehouse without credentials");
            Box::new(http)
        }
    };

    info!(url = source, "Querying warehouse gateway");
    Ok(Box::new(WarehouseClient::new(source, http)))
}

/// Uploads the JSON report and the metric CSV for a bucket to S3.
#[tracing::instrument(skip(report), fields(bucket = %report.bucket))]
async fn publish(s3_bucket: &str, report: &MetricsReport, gzip_csv: bool) -> Result<()> {
    let config = aws_config::load_from_env().await;
    let client = aws_sdk_s3::Client::new(&config);
    let prefix = report_key_prefix(&report.bucket);

    write_json_to_s3(&client, s3_bucket, &format!("{prefix}.json"), report).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    for metric in &report.metrics {
        writer.serialize(metric)?;
    }
    let csv_bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV buffer: {e}"))?;

    let (body, key, content_type) = if gzip_csv {
        (gzip(&csv_bytes)?, format!("{prefix}.csv.gz"), "application/gzip")
    } else {
        (csv_bytes, format!("{prefix}.csv"), "text/csv")
    };
    write_bytes_to_s3(&client, s3_bucket, &key, body, content_type).await?;

    info!(s3_bucket, prefix = %prefix, gzip = gzip_csv, "Report published to S3");
    Ok(())
}
