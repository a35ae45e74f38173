//! Trait for the external source of hotspot, telemetry and offer rows.

use crate::bucket::HourBucket;
use crate::error::FetchError;
use crate::model::{Hotspot, Offer, TelemetrySample};

/// Abstraction over where a bucket's raw rows come from (a warehouse
/// gateway, a directory of CSV exports, ...).
///
/// Implementations are passed explicitly to the compute functions; nothing
/// in the crate holds a global connection.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Hotspot catalog for the bucket's date and hour.
    async fn fetch_hotspots(&self, bucket: &HourBucket) -> Result<Vec<Hotspot>, FetchError>;

    /// Telemetry within the bucket, already restricted to on-duty windows.
    async fn fetch_telemetry(&self, bucket: &HourBucket)
    -> Result<Vec<TelemetrySample>, FetchError>;

    /// Offers observed during the bucket.
    async fn fetch_offers(&self, bucket: &HourBucket) -> Result<Vec<Offer>, FetchError>;
}
