//! Data types produced by the analysis pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::analyzers::status::StatusCategory;
use crate::analyzers::trend::Trend;
use crate::bucket::HourBucket;

/// Supply and demand figures for one hotspot in one hour bucket.
///
/// Flat so it serializes to a single CSV row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotMetric {
    pub hotspot_label: String,
    pub predicted_demand: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub num_offers: usize,
    pub on_duty_not_on_delivery_hours: f64,
    pub on_duty_on_delivery_hours: f64,
    pub net_supply_hours: f64,
    pub num_vehicles: usize,
    pub status: StatusCategory,
    pub previous_demand: Option<f64>,
    pub trend: Option<Trend>,
    /// Square drawn around the hotspot, as WKT.
    pub geometry: String,
}

/// Non-fatal anomaly found while computing a bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// More supply hours than a one-hour bucket can plausibly hold.
    ImplausibleSupply { hotspot_label: String, hours: f64 },
    /// Samples within radius of more than one hotspot; each went to the nearest.
    AmbiguousAttribution { samples: usize },
    /// Samples older than their same-vehicle predecessor in source order.
    OutOfOrderTelemetry { samples: usize },
    /// Catalog repeated a label; only the first row was kept.
    DuplicateHotspot { hotspot_label: String },
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImplausibleSupply {
                hotspot_label,
                hours,
            } => write!(
                f,
                "unrealistic supply hours ({hours:.2}) for hotspot {hotspot_label}"
            ),
            Self::AmbiguousAttribution { samples } => write!(
                f,
                "{samples} telemetry samples were within range of several hotspots"
            ),
            Self::OutOfOrderTelemetry { samples } => {
                write!(f, "{samples} telemetry samples arrived out of order")
            }
            Self::DuplicateHotspot { hotspot_label } => {
                write!(f, "hotspot {hotspot_label} appears more than once in the catalog")
            }
        }
    }
}

/// Bucket-wide totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub hotspots: usize,
    pub total_predicted_demand: f64,
    pub total_offers: usize,
    pub total_supply_hours: f64,
    pub mean_supply_hours: f64,
    pub status_counts: BTreeMap<StatusCategory, usize>,
}

/// Complete result for one hour bucket.
///
/// `metrics`, `summary` and `warnings` depend only on the input rows.
/// `generated_at` records when the report was built and is not part of the
/// aggregation; a cached report keeps the time of its original computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub bucket: HourBucket,
    pub generated_at: DateTime<Utc>,
    pub metrics: Vec<HotspotMetric>,
    pub summary: ReportSummary,
    pub warnings: Vec<DataQualityWarning>,
}

impl MetricsReport {
    pub fn metric(&self, label: &str) -> Option<&HotspotMetric> {
        self.metrics.iter().find(|m| m.hotspot_label == label)
    }
}
