//! Row types fetched from a data source.
//!
//! The `*Row` structs mirror the flat CSV/JSON shapes returned by the sources;
//! the plain structs are what the analyzers work on.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::spatial::Coordinate;

/// A named micro-region with a predicted per-hour demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub label: String,
    pub center: Coordinate,
    pub predicted_demand: f64,
}

impl Hotspot {
    /// Creates a hotspot, clamping non-positive or missing demand to zero.
    pub fn new(label: impl Into<String>, center: Coordinate, predicted_demand: f64) -> Self {
        Self {
            label: label.into(),
            center,
            predicted_demand: clamp_demand(predicted_demand),
        }
    }
}

fn clamp_demand(demand: f64) -> f64 {
    if demand.is_finite() && demand > 0.0 {
        demand
    } else {
        0.0
    }
}

/// One position report from a vehicle while on duty.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    pub vehicle_id: String,
    pub timestamp: DateTime<Utc>,
    pub position: Coordinate,
    pub on_delivery: bool,
}

/// An externally observed delivery offer.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub offer_id: String,
    pub pickup: Coordinate,
    pub timestamp: DateTime<Utc>,
}

/// Interval during which a vehicle was available for dispatch. Both bounds inclusive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DutyWindow {
    pub vehicle_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DutyWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// A single delivery run of a vehicle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeliveryWindow {
    pub vehicle_id: String,
    pub dispatched_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl DeliveryWindow {
    /// Completion time, else cancellation time. `None` while still running.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.completed_at.or(self.cancelled_at)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.dispatched_at <= at && self.end().is_none_or(|end| at <= end)
    }
}

/// Catalog row as stored by the sources.
#[derive(Debug, Clone, Deserialize)]
pub struct HotspotRow {
    pub date: NaiveDate,
    pub hour: u32,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub predicted_demand: Option<f64>,
}

impl From<HotspotRow> for Hotspot {
    fn from(row: HotspotRow) -> Self {
        Hotspot::new(
            row.label,
            Coordinate::new(row.latitude, row.longitude),
            row.predicted_demand.unwrap_or(0.0),
        )
    }
}

/// Raw telemetry row. `on_delivery` may be absent and derived later from
/// delivery windows.
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryRow {
    pub vehicle_id: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub on_delivery: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfferRow {
    pub offer_id: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<OfferRow> for Offer {
    fn from(row: OfferRow) -> Self {
        Offer {
            offer_id: row.offer_id,
            pickup: Coordinate::new(row.latitude, row.longitude),
            timestamp: row.timestamp,
        }
    }
}
