//! Output formatting and persistence for hotspot metrics.
//!
//! Supports pretty-printing, JSON reports, CSV append and gzip packing.

use anyhow::Result;
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::analyzers::types::{HotspotMetric, MetricsReport};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &MetricsReport) {
    debug!("{:#?}", report);
}

/// Logs one line per hotspot with status and trend arrow.
pub fn print_table(report: &MetricsReport) {
    for m in &report.metrics {
        info!(
            hotspot = %m.hotspot_label,
            demand = m.predicted_demand,
            trend = m.trend.map(|t| t.arrow()).unwrap_or(""),
            offers = m.num_offers,
            supply_hours = m.net_supply_hours,
            vehicles = m.num_vehicles,
            status = %m.status,
            "Hotspot"
        );
    }
}

/// Logs a report as pretty-printed JSON.
pub fn print_json(report: &MetricsReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes a report as pretty-printed JSON, replacing any existing file.
pub fn write_json(path: &str, report: &MetricsReport) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    debug!(path, "JSON report written");
    Ok(())
}

/// Appends [`HotspotMetric`] rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_metrics(path: &str, metrics: &[HotspotMetric]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = metrics.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for metric in metrics {
        writer.serialize(metric)?;
    }
    writer.flush()?;

    Ok(())
}

/// Gzip-compresses a byte buffer.
pub fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}
