use std::collections::HashMap;

use crate::analyzers::analyzer::compute_bucket;
use crate::analyzers::trend::apply_trend;
use crate::analyzers::types::MetricsReport;
use crate::bucket::HourBucket;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::services::data_source::DataSource;
use tracing::debug;

/// Memoizes whole reports per hour bucket.
///
/// Entries are never merged: each bucket maps to exactly the report its own
/// computation produced.
#[derive(Debug, Default)]
pub struct MetricsCache {
    entries: HashMap<HourBucket, MetricsReport>,
}

impl MetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_compute<S: DataSource + ?Sized>(
        &mut self,
        source: &S,
        bucket: HourBucket,
        config: &AnalysisConfig,
    ) -> Result<&MetricsReport, AnalysisError> {
        if self.entries.contains_key(&bucket) {
            debug!(bucket = %bucket, "Metrics cache hit");
        } else {
            let report = compute_bucket(source, bucket, config).await?;
            self.entries.insert(bucket, report);
        }
        Ok(&self.entries[&bucket])
    }

    /// Report for `bucket` with trend filled in from the preceding bucket.
    /// Both buckets are served from the cache when present.
    pub async fn with_trend<S: DataSource + ?Sized>(
        &mut self,
        source: &S,
        bucket: HourBucket,
        config: &AnalysisConfig,
    ) -> Result<MetricsReport, AnalysisError> {
        let previous_bucket = bucket
            .previous()
            .ok_or(AnalysisError::DayOutOfRange(-1))?;

        let previous = self
            .get_or_compute(source, previous_bucket, config)
            .await?
            .metrics
            .clone();
        let mut current = self.get_or_compute(source, bucket, config).await?.clone();

        apply_trend(&mut current.metrics, &previous);
        Ok(current)
    }

    pub fn invalidate(&mut self, bucket: &HourBucket) -> Option<MetricsReport> {
        self.entries.remove(bucket)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
