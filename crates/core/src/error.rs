use thiserror::Error;

/// Metrics registry error types
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate metric name: {0}")]
    DuplicateName(String),

    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}
