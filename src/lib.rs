pub mod analyzers;
pub mod bucket;
pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod model;
pub mod output;
pub mod services;
pub mod spatial;

pub use analyzers::analyzer::{analyze_bucket, compute_bucket, compute_metrics, compute_with_trend};
pub use analyzers::status::{StatusCategory, classify};
