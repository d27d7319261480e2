//! dashboard-core: metrics registry and shared response types
//!
//! This crate owns the Prometheus registry, the metric definitions the
//! dashboard exports, and the JSON error body used by the server.

pub mod error;
pub mod metrics;
pub mod outcome;
pub mod process;
pub mod registry;

pub use error::RegistryError;
pub use metrics::{DashboardMetrics, HttpMetrics, SystemGauges, SystemSample};
pub use outcome::{ErrorBody, now_rfc3339};
pub use process::ProcessSnapshot;
pub use registry::{Registry, TEXT_CONTENT_TYPE};
