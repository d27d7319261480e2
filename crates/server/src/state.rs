//! Shared application state

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashboard_core::{DashboardMetrics, RegistryError};

use crate::config::Config;

/// State handed to every handler and the sampler
#[derive(Clone)]
pub struct AppState {
    pub metrics: DashboardMetrics,
    pub started: Instant,
    pub environment: Arc<str>,
}

impl AppState {
    /// Declare all metrics and start the uptime clock
    pub fn new(config: &Config) -> Result<Self, RegistryError> {
        Ok(Self {
            metrics: DashboardMetrics::new(&config.app_name, config.collect_default_metrics)?,
            started: Instant::now(),
            environment: Arc::from(config.environment.as_str()),
        })
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}
