use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// How a telemetry interval is charged to a hotspot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalPolicy {
    /// The whole interval goes to the hotspot of its starting sample.
    #[default]
    StartSample,
    /// Charged only when both endpoints attribute to the same hotspot.
    BothEndpoints,
}

/// Tunables for one analysis run.
///
/// Stored as a JSON object on disk; every field is optional:
/// ```json
/// {
///   "telemetry_radius_m": 420.0,
///   "offer_radius_m": 400.0,
///   "timezone": "America/Los_Angeles",
///   "interval_policy": "start_sample"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub telemetry_radius_m: f64,
    pub offer_radius_m: f64,
    /// Side of the square drawn around each hotspot.
    pub hotspot_side_m: f64,
    pub implausible_supply_hours: f64,
    pub timezone: Tz,
    pub interval_policy: IntervalPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            telemetry_radius_m: 420.0,
            offer_radius_m: 400.0,
            hotspot_side_m: 400.0,
            implausible_supply_hours: 24.0,
            timezone: chrono_tz::America::Los_Angeles,
            interval_policy: IntervalPolicy::StartSample,
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{path}'"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid config file '{path}'"))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "telemetry_radius_m": 410.0 }"#).unwrap();

        assert_eq!(config.telemetry_radius_m, 410.0);
        assert_eq!(config.offer_radius_m, 400.0);
        assert_eq!(config.timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(config.interval_policy, IntervalPolicy::StartSample);
    }

    #[test]
    fn test_parses_timezone_and_policy() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{ "timezone": "America/New_York", "interval_policy": "both_endpoints" }"#,
        )
        .unwrap();

        assert_eq!(config.timezone, chrono_tz::America::New_York);
        assert_eq!(config.interval_policy, IntervalPolicy::BothEndpoints);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "implausible_supply_hours": 12.0 }}"#).unwrap();

        let config = AnalysisConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.implausible_supply_hours, 12.0);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(AnalysisConfig::load("/nonexistent/hotspot_config.json").is_err());
    }
}
