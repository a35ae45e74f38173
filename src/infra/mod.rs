//! Concrete [`DataSource`](crate::services::DataSource) adapters.

pub mod csv_dir;
pub mod warehouse;
