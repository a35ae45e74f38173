//! Joins the hotspot catalog with offer counts and supply hours.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::analyzers::aggregate::SupplyAggregate;
use crate::analyzers::status::{StatusCategory, check_supply, classify};
use crate::analyzers::types::{DataQualityWarning, HotspotMetric, ReportSummary};
use crate::analyzers::utility::mean;
use crate::config::AnalysisConfig;
use crate::model::Hotspot;
use crate::spatial::SquareBounds;

/// Drops repeated labels, keeping the first occurrence.
pub fn dedupe_catalog(hotspots: Vec<Hotspot>) -> (Vec<Hotspot>, Vec<DataQualityWarning>) {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();
    let mut unique = Vec::with_capacity(hotspots.len());

    for hotspot in hotspots {
        if seen.insert(hotspot.label.clone()) {
            unique.push(hotspot);
        } else {
            warnings.push(DataQualityWarning::DuplicateHotspot {
                hotspot_label: hotspot.label,
            });
        }
    }

    (unique, warnings)
}

/// Builds one metric per catalog hotspot, ordered by predicted demand
/// descending then label. Missing offers or supply become zero.
///
/// `catalog` must already be free of duplicate labels.
pub fn assemble_metrics(
    catalog: &[Hotspot],
    offers: &HashMap<String, usize>,
    supply: &SupplyAggregate,
    config: &AnalysisConfig,
) -> (Vec<HotspotMetric>, Vec<DataQualityWarning>) {
    let mut warnings = Vec::new();

    let mut metrics: Vec<HotspotMetric> = catalog
        .iter()
        .map(|hotspot| {
            let label = hotspot.label.as_str();
            let (idle, delivering, vehicles) = supply
                .get(label)
                .map(|s| (s.idle_hours, s.delivery_hours, s.vehicles.len()))
                .unwrap_or((0.0, 0.0, 0));
            let net = idle + delivering;

            if let Some(warning) = check_supply(label, net, config.implausible_supply_hours) {
                warnings.push(warning);
            }

            HotspotMetric {
                hotspot_label: hotspot.label.clone(),
                predicted_demand: hotspot.predicted_demand,
                latitude: hotspot.center.latitude,
                longitude: hotspot.center.longitude,
                num_offers: offers.get(label).copied().unwrap_or(0),
                on_duty_not_on_delivery_hours: idle,
                on_duty_on_delivery_hours: delivering,
                net_supply_hours: net,
                num_vehicles: vehicles,
                status: classify(hotspot.predicted_demand, net),
                previous_demand: None,
                trend: None,
                geometry: SquareBounds::around(hotspot.center, config.hotspot_side_m).to_wkt(),
            }
        })
        .collect();

    metrics.sort_by(|a, b| {
        b.predicted_demand
            .total_cmp(&a.predicted_demand)
            .then_with(|| a.hotspot_label.cmp(&b.hotspot_label))
    });

    (metrics, warnings)
}

/// Totals across a bucket's metrics.
pub fn summarize(metrics: &[HotspotMetric]) -> ReportSummary {
    let supply: Vec<f64> = metrics.iter().map(|m| m.net_supply_hours).collect();

    let mut status_counts: BTreeMap<StatusCategory, usize> = BTreeMap::new();
    for metric in metrics {
        *status_counts.entry(metric.status).or_default() += 1;
    }

    ReportSummary {
        hotspots: metrics.len(),
        total_predicted_demand: metrics.iter().map(|m| m.predicted_demand).sum(),
        total_offers: metrics.iter().map(|m| m.num_offers).sum(),
        total_supply_hours: supply.iter().sum(),
        mean_supply_hours: mean(&supply),
        status_counts,
    }
}
