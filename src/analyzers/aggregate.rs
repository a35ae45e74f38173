use crate::analyzers::attribution::{Attribution, Attributor};
use crate::config::IntervalPolicy;
use crate::model::{Hotspot, TelemetrySample};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Vehicle-hours credited to one hotspot, split by delivery state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotspotSupply {
    pub idle_hours: f64,
    pub delivery_hours: f64,
    pub vehicles: BTreeSet<String>,
}

impl HotspotSupply {
    pub fn net_hours(&self) -> f64 {
        self.idle_hours + self.delivery_hours
    }

    fn charge(&mut self, vehicle_id: &str, on_delivery: bool, hours: f64) {
        if on_delivery {
            self.delivery_hours += hours;
        } else {
            self.idle_hours += hours;
        }
        if !self.vehicles.contains(vehicle_id) {
            self.vehicles.insert(vehicle_id.to_string());
        }
    }
}

/// Result of folding a bucket's telemetry into per-hotspot supply.
#[derive(Debug, Default)]
pub struct SupplyAggregate {
    /// Keyed by hotspot label. Hotspots without any interval are absent.
    pub by_hotspot: HashMap<String, HotspotSupply>,
    pub ambiguous_samples: usize,
    pub out_of_order_samples: usize,
    pub unattributed_samples: usize,
}

impl SupplyAggregate {
    pub fn get(&self, label: &str) -> Option<&HotspotSupply> {
        self.by_hotspot.get(label)
    }
}

/// Converts telemetry into supply hours per hotspot.
///
/// Samples are grouped by vehicle and sorted by timestamp here, whatever
/// order the source produced. Each sample except a vehicle's last opens an
/// interval ending at the vehicle's next sample; the interval is charged to
/// the starting sample's hotspot and delivery state. Intervals that start
/// outside every hotspot are dropped.
pub fn aggregate_supply(
    hotspots: &[Hotspot],
    samples: &[TelemetrySample],
    radius_m: f64,
    policy: IntervalPolicy,
) -> SupplyAggregate {
    let attributor = Attributor::new(hotspots, radius_m);

    let mut aggregate = SupplyAggregate {
        out_of_order_samples: count_out_of_order(samples),
        ..Default::default()
    };

    let mut by_vehicle: BTreeMap<&str, Vec<(&TelemetrySample, Attribution)>> = BTreeMap::new();
    for sample in samples {
        let attribution = attributor.attribute(&sample.position);
        match attribution {
            Attribution::Unattributed => aggregate.unattributed_samples += 1,
            Attribution::Hotspot { ambiguous: true, .. } => aggregate.ambiguous_samples += 1,
            Attribution::Hotspot { .. } => {}
        }
        by_vehicle
            .entry(sample.vehicle_id.as_str())
            .or_default()
            .push((sample, attribution));
    }

    for (vehicle_id, track) in by_vehicle.iter_mut() {
        track.sort_by_key(|(sample, _)| sample.timestamp);

        for pair in track.windows(2) {
            let (current, attribution) = pair[0];
            let (next, next_attribution) = pair[1];

            let Some(index) = attribution.index() else {
                continue;
            };
            if policy == IntervalPolicy::BothEndpoints && next_attribution.index() != Some(index) {
                continue;
            }

            // Sorted above, so never negative.
            let hours = (next.timestamp - current.timestamp).num_milliseconds() as f64
                / MILLIS_PER_HOUR;

            aggregate
                .by_hotspot
                .entry(hotspots[index].label.clone())
                .or_default()
                .charge(vehicle_id, current.on_delivery, hours);
        }
    }

    debug!(
        samples = samples.len(),
        vehicles = by_vehicle.len(),
        hotspots_with_supply = aggregate.by_hotspot.len(),
        unattributed = aggregate.unattributed_samples,
        ambiguous = aggregate.ambiguous_samples,
        out_of_order = aggregate.out_of_order_samples,
        "Telemetry aggregated"
    );

    aggregate
}

/// Samples whose timestamp precedes the previous sample of the same vehicle
/// in source order.
fn count_out_of_order(samples: &[TelemetrySample]) -> usize {
    let mut last_seen: HashMap<&str, DateTime<Utc>> = HashMap::new();
    let mut count = 0;

    for sample in samples {
        if let Some(previous) = last_seen.insert(&sample.vehicle_id, sample.timestamp) {
            if sample.timestamp < previous {
                count += 1;
            }
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Coordinate;
    use chrono::TimeZone;

    fn at_minute(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 1, minute, second).unwrap()
    }

    fn center_a() -> Coordinate {
        Coordinate::new(34.05, -118.25)
    }

    fn center_b() -> Coordinate {
        Coordinate::new(34.07, -118.25)
    }

    fn nowhere() -> Coordinate {
        Coordinate::new(35.0, -119.0)
    }

    fn hotspots() -> Vec<Hotspot> {
        vec![
            Hotspot::new("A", center_a(), 2.0),
            Hotspot::new("B", center_b(), 1.0),
        ]
    }

    fn sample(vehicle: &str, ts: DateTime<Utc>, at: Coordinate, on_delivery: bool) -> TelemetrySample {
        TelemetrySample {
            vehicle_id: vehicle.to_string(),
            timestamp: ts,
            position: at,
            on_delivery,
        }
    }

    fn run(samples: &[TelemetrySample]) -> SupplyAggregate {
        aggregate_supply(&hotspots(), samples, 420.0, IntervalPolicy::StartSample)
    }

    #[test]
    fn test_single_sample_contributes_nothing() {
        let result = run(&[sample("r1", at_minute(0, 0), center_a(), false)]);
        assert!(result.by_hotspot.is_empty());
    }

    #[test]
    fn test_consecutive_samples_build_hours() {
        let result = run(&[
            sample("r1", at_minute(0, 0), center_a(), false),
            sample("r1", at_minute(15, 0), center_a(), false),
            sample("r1", at_minute(30, 0), center_a(), true),
            sample("r1", at_minute(45, 0), center_a(), true),
        ]);

        let supply = result.get("A").unwrap();
        assert!((supply.idle_hours - 0.5).abs() < 1e-9);
        assert!((supply.delivery_hours - 0.25).abs() < 1e-9);
        assert!((supply.net_hours() - 0.75).abs() < 1e-9);
        assert_eq!(supply.vehicles.len(), 1);
    }

    #[test]
    fn test_interval_charged_to_starting_hotspot() {
        let result = run(&[
            sample("r1", at_minute(0, 0), center_a(), false),
            sample("r1", at_minute(30, 0), center_b(), false),
            sample("r1", at_minute(40, 0), center_b(), false),
        ]);

        assert!((result.get("A").unwrap().net_hours() - 0.5).abs() < 1e-9);
        assert!((result.get("B").unwrap().net_hours() - 10.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_both_endpoints_policy_drops_crossing_interval() {
        let samples = [
            sample("r1", at_minute(0, 0), center_a(), false),
            sample("r1", at_minute(30, 0), center_b(), false),
            sample("r1", at_minute(40, 0), center_b(), false),
        ];
        let result = aggregate_supply(&hotspots(), &samples, 420.0, IntervalPolicy::BothEndpoints);

        assert!(result.get("A").is_none());
        assert!((result.get("B").unwrap().net_hours() - 10.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_unattributed_start_is_dropped() {
        let result = run(&[
            sample("r1", at_minute(0, 0), nowhere(), false),
            sample("r1", at_minute(20, 0), center_a(), false),
            sample("r1", at_minute(30, 0), center_a(), false),
        ]);

        assert!((result.get("A").unwrap().net_hours() - 10.0 / 60.0).abs() < 1e-9);
        assert_eq!(result.unattributed_samples, 1);
    }

    #[test]
    fn test_vehicles_are_not_chained_together() {
        // r1's last sample must not pair with r2's first.
        let result = run(&[
            sample("r1", at_minute(0, 0), center_a(), false),
            sample("r1", at_minute(10, 0), center_a(), false),
            sample("r2", at_minute(50, 0), center_a(), false),
        ]);

        let supply = result.get("A").unwrap();
        assert!((supply.net_hours() - 10.0 / 60.0).abs() < 1e-9);
        assert_eq!(supply.vehicles.len(), 1);
    }

    #[test]
    fn test_out_of_order_input_is_sorted_and_reported() {
        let result = run(&[
            sample("r1", at_minute(30, 0), center_a(), false),
            sample("r1", at_minute(0, 0), center_a(), false),
            sample("r1", at_minute(45, 0), center_a(), false),
        ]);

        assert_eq!(result.out_of_order_samples, 1);
        let supply = result.get("A").unwrap();
        assert!((supply.net_hours() - 0.75).abs() < 1e-9);
        assert!(supply.idle_hours >= 0.0);
    }

    #[test]
    fn test_duplicate_timestamps_add_zero_hours() {
        let result = run(&[
            sample("r1", at_minute(0, 0), center_a(), true),
            sample("r1", at_minute(0, 0), center_a(), true),
            sample("r1", at_minute(30, 0), nowhere(), false),
        ]);

        assert_eq!(result.out_of_order_samples, 0);
        let supply = result.get("A").unwrap();
        assert_eq!(supply.idle_hours, 0.0);
        assert!((supply.delivery_hours - 0.5).abs() < 1e-9);
        assert_eq!(supply.vehicles.len(), 1);
    }

    #[test]
    fn test_distinct_vehicle_count() {
        let result = run(&[
            sample("r1", at_minute(0, 0), center_a(), false),
            sample("r1", at_minute(5, 0), center_a(), true),
            sample("r1", at_minute(10, 0), center_a(), false),
            sample("r2", at_minute(0, 0), center_a(), false),
            sample("r2", at_minute(6, 0), center_a(), false),
            sample("r3", at_minute(0, 0), center_a(), false),
        ]);

        assert_eq!(result.get("A").unwrap().vehicles.len(), 2);
    }

    #[test]
    fn test_partitions_sum_to_net() {
        let result = run(&[
            sample("r1", at_minute(0, 7), center_a(), true),
            sample("r1", at_minute(3, 11), center_a(), false),
            sample("r1", at_minute(9, 59), center_a(), true),
            sample("r1", at_minute(27, 1), center_b(), false),
            sample("r1", at_minute(58, 13), center_b(), true),
            sample("r2", at_minute(1, 1), center_b(), true),
            sample("r2", at_minute(44, 44), center_a(), false),
        ]);

        for supply in result.by_hotspot.values() {
            let sum = supply.idle_hours + supply.delivery_hours;
            assert!((sum - supply.net_hours()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ambiguous_samples_are_counted_once() {
        let overlapping = vec![
            Hotspot::new("A", center_a(), 1.0),
            Hotspot::new("A2", Coordinate::new(34.0501, -118.25), 1.0),
        ];
        let samples = [
            sample("r1", at_minute(0, 0), center_a(), false),
            sample("r1", at_minute(30, 0), center_a(), false),
        ];
        let result = aggregate_supply(&overlapping, &samples, 420.0, IntervalPolicy::StartSample);

        assert_eq!(result.ambiguous_samples, 2);
        assert!((result.get("A").unwrap().net_hours() - 0.5).abs() < 1e-9);
        assert!(result.get("A2").is_none());
    }
}
