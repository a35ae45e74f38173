use async_trait::async_trait;
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::analyzers::duty::{restrict_to_duty, tag_deliveries};
use crate::bucket::HourBucket;
use crate::error::FetchError;
use crate::model::{
    DeliveryWindow, DutyWindow, Hotspot, HotspotRow, Offer, OfferRow, TelemetryRow,
    TelemetrySample,
};
use crate::services::data_source::DataSource;

const HOTSPOTS: &str = "hotspots.csv";
const TELEMETRY: &str = "telemetry.csv";
const OFFERS: &str = "offers.csv";
const DUTY_WINDOWS: &str = "duty_windows.csv";
const DELIVERY_WINDOWS: &str = "delivery_windows.csv";

/// Reads bucket rows from a directory of CSV exports.
///
/// Expected files:
/// - `hotspots.csv`: `date,hour,label,latitude,longitude,predicted_demand`
/// - `telemetry.csv`: `vehicle_id,timestamp,latitude,longitude,on_delivery`
///   (`on_delivery` may be left empty)
/// - `offers.csv`: `offer_id,timestamp,latitude,longitude`
/// - `duty_windows.csv` (optional): `vehicle_id,start,end`
/// - `delivery_windows.csv` (optional):
///   `vehicle_id,dispatched_at,completed_at,cancelled_at`
///
/// Timestamps are RFC 3339. Telemetry and offers are matched to the bucket by
/// their local hour in `timezone`. When a duty window file is present,
/// telemetry outside every window is dropped.
pub struct CsvSource {
    dir: PathBuf,
    timezone: Tz,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>, timezone: Tz) -> Self {
        Self {
            dir: dir.into(),
            timezone,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn optional_rows<T: DeserializeOwned>(&self, name: &str) -> Result<Option<Vec<T>>, FetchError> {
        let path = self.path(name);
        if !path.exists() {
            return Ok(None);
        }
        read_rows(&path).map(Some)
    }
}

/// Deserializes every record of a CSV file.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, FetchError> {
    let path_str = path.display().to_string();
    let file = File::open(path).map_err(|source| FetchError::Io {
        path: path_str.clone(),
        source,
    })?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: T = result.map_err(|source| FetchError::Csv {
            path: path_str.clone(),
            source,
        })?;
        rows.push(record);
    }

    debug!(path = %path_str, rows = rows.len(), "CSV loaded");
    Ok(rows)
}

#[async_trait]
impl DataSource for CsvSource {
    async fn fetch_hotspots(&self, bucket: &HourBucket) -> Result<Vec<Hotspot>, FetchError> {
        let rows: Vec<HotspotRow> = read_rows(&self.path(HOTSPOTS))?;
        Ok(rows
            .into_iter()
            .filter(|row| row.date == bucket.date && row.hour == bucket.hour)
            .map(Hotspot::from)
            .collect())
    }

    async fn fetch_telemetry(
        &self,
        bucket: &HourBucket,
    ) -> Result<Vec<TelemetrySample>, FetchError> {
        let rows: Vec<TelemetryRow> = read_rows(&self.path(TELEMETRY))?;
        let rows: Vec<_> = rows
            .into_iter()
            .filter(|row| bucket.contains(row.timestamp, &self.timezone))
            .collect();

        let deliveries: Vec<DeliveryWindow> =
            self.optional_rows(DELIVERY_WINDOWS)?.unwrap_or_default();
        let samples = tag_deliveries(rows, &deliveries);

        match self.optional_rows::<DutyWindow>(DUTY_WINDOWS)? {
            Some(duty) => Ok(restrict_to_duty(samples, &duty)),
            None => Ok(samples),
        }
    }

    async fn fetch_offers(&self, bucket: &HourBucket) -> Result<Vec<Offer>, FetchError> {
        let rows: Vec<OfferRow> = read_rows(&self.path(OFFERS))?;
        Ok(rows
            .into_iter()
            .filter(|row| bucket.contains(row.timestamp, &self.timezone))
            .map(Offer::from)
            .collect())
    }
}
