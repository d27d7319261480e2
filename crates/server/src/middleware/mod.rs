//! HTTP middleware

pub mod metrics;
pub mod panic;
pub mod request_id;

pub use metrics::metrics_middleware;
pub use panic::handle_panic;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
