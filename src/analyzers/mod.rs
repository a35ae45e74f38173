//! Supply/demand analysis for one hour bucket.
//!
//! Telemetry samples are attributed to nearby hotspots, consecutive samples
//! of each vehicle are folded into supply hours, offers are counted per
//! hotspot, and the results are joined with the demand catalog and
//! classified.

pub mod aggregate;
pub mod analyzer;
pub mod assemble;
pub mod attribution;
pub mod cache;
pub mod duty;
pub mod offers;
pub mod status;
pub mod trend;
pub mod types;
pub mod utility;
pub mod writetos3;
