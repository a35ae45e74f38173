use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analyzers::types::DataQualityWarning;

/// Supply above this many hours counts as "has supply".
pub const SUPPLY_THRESHOLD_HOURS: f64 = 0.1;

/// Demand at or above this is "high demand".
pub const HIGH_DEMAND: f64 = 2.0;

/// Qualitative supply/demand state of a hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusCategory {
    #[serde(rename = "High Demand No Supply")]
    HighDemandNoSupply,
    #[serde(rename = "Demand No Supply")]
    DemandNoSupply,
    #[serde(rename = "Demand With Supply")]
    DemandWithSupply,
    #[serde(rename = "Supply No Demand")]
    SupplyNoDemand,
    #[serde(rename = "No Activity")]
    NoActivity,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 5] = [
        StatusCategory::HighDemandNoSupply,
        StatusCategory::DemandNoSupply,
        StatusCategory::DemandWithSupply,
        StatusCategory::SupplyNoDemand,
        StatusCategory::NoActivity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StatusCategory::HighDemandNoSupply => "High Demand No Supply",
            StatusCategory::DemandNoSupply => "Demand No Supply",
            StatusCategory::DemandWithSupply => "Demand With Supply",
            StatusCategory::SupplyNoDemand => "Supply No Demand",
            StatusCategory::NoActivity => "No Activity",
        }
    }

    /// Legend colour used by map front ends.
    pub fn color(&self) -> &'static str {
        match self {
            StatusCategory::HighDemandNoSupply => "#FF0000",
            StatusCategory::DemandNoSupply => "#ff4444",
            StatusCategory::DemandWithSupply => "#44aa44",
            StatusCategory::SupplyNoDemand => "#4444ff",
            StatusCategory::NoActivity => "#888888",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a hotspot from its predicted demand and net supply hours.
///
/// First matching row wins:
///
/// | Demand | Supply (h) | Status                |
/// |--------|------------|-----------------------|
/// | >= 2   | <= 0.1     | High Demand No Supply |
/// | > 0    | <= 0.1     | Demand No Supply      |
/// | > 0    | > 0.1      | Demand With Supply    |
/// | <= 0   | > 0.1      | Supply No Demand      |
/// | else   |            | No Activity           |
pub fn classify(demand: f64, supply: f64) -> StatusCategory {
    match (demand, supply) {
        (d, s) if d >= HIGH_DEMAND && s <= SUPPLY_THRESHOLD_HOURS => {
            StatusCategory::HighDemandNoSupply
        }
        (d, s) if d > 0.0 && s <= SUPPLY_THRESHOLD_HOURS => StatusCategory::DemandNoSupply,
        (d, s) if d > 0.0 && s > SUPPLY_THRESHOLD_HOURS => StatusCategory::DemandWithSupply,
        (d, s) if d <= 0.0 && s > SUPPLY_THRESHOLD_HOURS => StatusCategory::SupplyNoDemand,
        _ => StatusCategory::NoActivity,
    }
}

/// Flags supply a single one-hour bucket cannot plausibly hold.
pub fn check_supply(label: &str, supply: f64, limit_hours: f64) -> Option<DataQualityWarning> {
    (supply > limit_hours).then(|| DataQualityWarning::ImplausibleSupply {
        hotspot_label: label.to_string(),
        hours: supply,
    })
}
