//! Duty restriction and delivery-state tagging for raw telemetry.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::model::{DeliveryWindow, DutyWindow, TelemetryRow, TelemetrySample};
use crate::spatial::Coordinate;

/// Turns raw rows into samples. Rows without an explicit delivery flag are
/// on delivery when their timestamp falls inside one of the vehicle's
/// delivery windows.
pub fn tag_deliveries(rows: Vec<TelemetryRow>, windows: &[DeliveryWindow]) -> Vec<TelemetrySample> {
    let by_vehicle = group_by_vehicle(windows, |w| w.vehicle_id.as_str());

    rows.into_iter()
        .map(|row| {
            let on_delivery = row.on_delivery.unwrap_or_else(|| {
                by_vehicle
                    .get(row.vehicle_id.as_str())
                    .is_some_and(|ws| ws.iter().any(|w| w.contains(row.timestamp)))
            });

            TelemetrySample {
                position: Coordinate::new(row.latitude, row.longitude),
                vehicle_id: row.vehicle_id,
                timestamp: row.timestamp,
                on_delivery,
            }
        })
        .collect()
}

/// Keeps only samples inside one of their vehicle's duty windows.
pub fn restrict_to_duty(samples: Vec<TelemetrySample>, windows: &[DutyWindow]) -> Vec<TelemetrySample> {
    let by_vehicle = group_by_vehicle(windows, |w| w.vehicle_id.as_str());
    let on_duty = |vehicle: &str, at: DateTime<Utc>| {
        by_vehicle
            .get(vehicle)
            .is_some_and(|ws| ws.iter().any(|w| w.contains(at)))
    };

    samples
        .into_iter()
        .filter(|s| on_duty(s.vehicle_id.as_str(), s.timestamp))
        .collect()
}

fn group_by_vehicle<'a, W>(windows: &'a [W], key: impl Fn(&'a W) -> &'a str) -> HashMap<&'a str, Vec<&'a W>> {
    let mut grouped: HashMap<&str, Vec<&W>> = HashMap::new();
    for window in windows {
        grouped.entry(key(window)).or_default().push(window);
    }
    grouped
}
