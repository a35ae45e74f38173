use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::analyzers::types::HotspotMetric;

/// Direction of predicted demand relative to the previous hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            Trend::Up
        } else if current < previous {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat => "→",
        }
    }
}

/// Fills `previous_demand` and `trend` on `current` from the preceding
/// bucket. A hotspot missing from `previous` is compared against zero
/// demand and keeps `previous_demand` empty.
pub fn apply_trend(current: &mut [HotspotMetric], previous: &[HotspotMetric]) {
    let earlier: HashMap<&str, f64> = previous
        .iter()
        .map(|m| (m.hotspot_label.as_str(), m.predicted_demand))
        .collect();

    for metric in current.iter_mut() {
        let previous_demand = earlier.get(metric.hotspot_label.as_str()).copied();
        metric.previous_demand = previous_demand;
        metric.trend = Some(Trend::between(
            previous_demand.unwrap_or(0.0),
            metric.predicted_demand,
        ));
    }
}
