use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::analyzers::duty::tag_deliveries;
use crate::bucket::HourBucket;
use crate::error::FetchError;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::model::{Hotspot, HotspotRow, Offer, OfferRow, TelemetryRow, TelemetrySample};
use crate::services::data_source::DataSource;

/// Reads bucket rows from an HTTP gateway in front of the data warehouse.
///
/// Each endpoint answers `GET {base_url}/v1/{table}?date=YYYY-MM-DD&hour=H`
/// with a JSON array of rows. Telemetry is expected to be restricted to
/// on-duty windows server side.
pub struct WarehouseClient<C> {
    base_url: String,
    http: C,
}

impl<C: HttpClient> WarehouseClient<C> {
    pub fn new(base_url: impl Into<String>, http: C) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    fn url(&self, table: &str, bucket: &HourBucket) -> String {
        format!(
            "{}/v1/{}?date={}&hour={}",
            self.base_url, table, bucket.date, bucket.hour
        )
    }

    async fn rows<T: DeserializeOwned>(
        &self,
        table: &'static str,
        bucket: &HourBucket,
    ) -> Result<Vec<T>, FetchError> {
        let url = self.url(table, bucket);
        debug!(%url, "Querying warehouse");

        let bytes = fetch_bytes(&self.http, &url).await?;
        serde_json::from_slice(&bytes).map_err(|source| FetchError::Malformed {
            what: table,
            source,
        })
    }
}

#[async_trait]
impl<C: HttpClient> DataSource for WarehouseClient<C> {
    async fn fetch_hotspots(&self, bucket: &HourBucket) -> Result<Vec<Hotspot>, FetchError> {
        let rows: Vec<HotspotRow> = self.rows("hotspots", bucket).await?;
        Ok(rows.into_iter().map(Hotspot::from).collect())
    }

    async fn fetch_telemetry(
        &self,
        bucket: &HourBucket,
    ) -> Result<Vec<TelemetrySample>, FetchError> {
        let rows: Vec<TelemetryRow> = self.rows("telemetry", bucket).await?;
        Ok(tag_deliveries(rows, &[]))
    }

    async fn fetch_offers(&self, bucket: &HourBucket) -> Result<Vec<Offer>, FetchError> {
        let rows: Vec<OfferRow> = self.rows("offers", bucket).await?;
        Ok(rows.into_iter().map(Offer::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;
    use chrono::NaiveDate;

    #[test]
    fn test_url_layout() {
        let client = WarehouseClient::new("https://warehouse.example.com/", BasicClient::new());
        let bucket = HourBucket::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 7).unwrap();

        assert_eq!(
            client.url("telemetry", &bucket),
            "https://warehouse.example.com/v1/telemetry?date=2024-05-01&hour=7"
        );
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_fetch_error() {
        let client = WarehouseClient::new("http://127.0.0.1:9", BasicClient::new());
        let bucket = HourBucket::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 7).unwrap();

        let result = client.fetch_hotspots(&bucket).await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }
}
