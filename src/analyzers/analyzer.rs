use crate::analyzers::aggregate::aggregate_supply;
use crate::analyzers::assemble::{assemble_metrics, dedupe_catalog, summarize};
use crate::analyzers::offers::count_offers;
use crate::analyzers::trend::apply_trend;
use crate::analyzers::types::{DataQualityWarning, MetricsReport};
use crate::bucket::HourBucket;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::model::{Hotspot, Offer, TelemetrySample};
use crate::services::data_source::DataSource;
use chrono::Utc;
use tracing::{info, warn};

/// Computes metrics for `hour` on the day `day_offset` days from today in
/// the configured time zone.
pub async fn compute_metrics<S: DataSource + ?Sized>(
    source: &S,
    hour: u32,
    day_offset: i64,
    config: &AnalysisConfig,
) -> Result<MetricsReport, AnalysisError> {
    let now = Utc::now().with_timezone(&config.timezone);
    let bucket = HourBucket::resolve(&now, hour, day_offset)?;
    compute_bucket(source, bucket, config).await
}

/// Fetches one bucket's rows and computes its report.
///
/// Any fetch failure aborts the computation.
#[tracing::instrument(skip_all, fields(bucket = %bucket))]
pub async fn compute_bucket<S: DataSource + ?Sized>(
    source: &S,
    bucket: HourBucket,
    config: &AnalysisConfig,
) -> Result<MetricsReport, AnalysisError> {
    let (hotspots, telemetry, offers) = tokio::try_join!(
        source.fetch_hotspots(&bucket),
        source.fetch_telemetry(&bucket),
        source.fetch_offers(&bucket),
    )?;

    info!(
        hotspots = hotspots.len(),
        samples = telemetry.len(),
        offers = offers.len(),
        "Rows fetched"
    );

    Ok(analyze_bucket(bucket, hotspots, &telemetry, &offers, config))
}

/// Computes the current bucket together with its predecessor and fills in
/// the demand trend.
#[tracing::instrument(skip_all, fields(bucket = %bucket))]
pub async fn compute_with_trend<S: DataSource + ?Sized>(
    source: &S,
    bucket: HourBucket,
    config: &AnalysisConfig,
) -> Result<MetricsReport, AnalysisError> {
    let previous_bucket = bucket
        .previous()
        .ok_or(AnalysisError::DayOutOfRange(-1))?;

    let (mut current, previous) = tokio::try_join!(
        compute_bucket(source, bucket, config),
        compute_bucket(source, previous_bucket, config),
    )?;

    apply_trend(&mut current.metrics, &previous.metrics);
    Ok(current)
}

/// Pure part of the pipeline: attribution, interval aggregation, offer
/// counting, assembly and classification over already fetched rows.
pub fn analyze_bucket(
    bucket: HourBucket,
    hotspots: Vec<Hotspot>,
    telemetry: &[TelemetrySample],
    offers: &[Offer],
    config: &AnalysisConfig,
) -> MetricsReport {
    let (catalog, mut warnings) = dedupe_catalog(hotspots);

    let supply = aggregate_supply(
        &catalog,
        telemetry,
        config.telemetry_radius_m,
        config.interval_policy,
    );
    let offer_counts = count_offers(&catalog, offers, config.offer_radius_m);

    if supply.ambiguous_samples > 0 {
        warnings.push(DataQualityWarning::AmbiguousAttribution {
            samples: supply.ambiguous_samples,
        });
    }
    if supply.out_of_order_samples > 0 {
        warnings.push(DataQualityWarning::OutOfOrderTelemetry {
            samples: supply.out_of_order_samples,
        });
    }

    let (metrics, supply_warnings) = assemble_metrics(&catalog, &offer_counts, &supply, config);
    warnings.extend(supply_warnings);

    for warning in &warnings {
        warn!(bucket = %bucket, "{}", warning);
    }

    let summary = summarize(&metrics);
    info!(
        bucket = %bucket,
        hotspots = summary.hotspots,
        total_supply_hours = summary.total_supply_hours,
        warnings = warnings.len(),
        "Bucket analyzed"
    );

    MetricsReport {
        bucket,
        generated_at: Utc::now(),
        metrics,
        summary,
        warnings,
    }
}
