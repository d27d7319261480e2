//! Dashboard metric definitions
//!
//! `DashboardMetrics::new` declares everything the service exports, in the
//! order it appears on `/metrics`: default process metrics, request metrics,
//! then the sampled system gauges.

use std::collections::HashMap;
use std::sync::Arc;

use prometheus::{Gauge, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

use crate::error::RegistryError;
use crate::process;
use crate::registry::Registry;

/// Label names shared by the request counter and histogram
pub const REQUEST_LABELS: [&str; 3] = ["method", "route", "status"];

/// Request duration bucket boundaries, in seconds
pub const DURATION_BUCKETS: [f64; 5] = [0.1, 0.5, 1.0, 2.0, 5.0];

/// Request count, duration and concurrency metrics
#[derive(Clone)]
pub struct HttpMetrics {
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
    in_progress: IntGauge,
}

impl HttpMetrics {
    pub fn register(registry: &Registry) -> Result<Self, RegistryError> {
        let requests_total = registry.register(IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &REQUEST_LABELS,
        )?)?;

        let request_duration = registry.register(HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Duration of HTTP requests in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &REQUEST_LABELS,
        )?)?;

        let in_progress = registry.register(IntGauge::new(
            "http_requests_in_progress",
            "Number of HTTP requests currently being processed",
        )?)?;

        Ok(Self {
            requests_total,
            request_duration,
            in_progress,
        })
    }

    /// Mark a request as entered
    pub fn request_started(&self) {
        self.in_progress.inc();
    }

    /// Record a finished request.
    ///
    /// The in-progress gauge is always decremented, even when the label
    /// lookup fails.
    pub fn request_finished(
        &self,
        method: &str,
        route: &str,
        status: u16,
        elapsed_seconds: f64,
    ) -> Result<(), RegistryError> {
        self.in_progress.dec();

        let status = status.to_string();
        let labels = [method, route, status.as_str()];

        self.requests_total
            .get_metric_with_label_values(&labels)?
            .inc();
        self.request_duration
            .get_metric_with_label_values(&labels)?
            .observe(elapsed_seconds);

        Ok(())
    }

    /// Requests currently being processed
    pub fn in_progress(&self) -> i64 {
        self.in_progress.get()
    }

    /// Count recorded for one label set; 0 if the series does not exist
    pub fn requests_total(&self, method: &str, route: &str, status: u16) -> u64 {
        let status = status.to_string();
        self.requests_total
            .get_metric_with_label_values(&[method, route, status.as_str()])
            .map(|counter| counter.get())
            .unwrap_or(0)
    }

    /// Number of duration observations for one label set
    pub fn duration_count(&self, method: &str, route: &str, status: u16) -> u64 {
        let status = status.to_string();
        self.request_duration
            .get_metric_with_label_values(&[method, route, status.as_str()])
            .map(|histogram| histogram.get_sample_count())
            .unwrap_or(0)
    }
}

/// One round of sampled system values
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemSample {
    pub uptime_seconds: f64,
    pub active_users: i64,
    pub system_load: f64,
    pub memory_bytes: f64,
    pub cpu_percent: f64,
}

/// Gauges overwritten by the periodic sampler
#[derive(Clone)]
pub struct SystemGauges {
    uptime: Gauge,
    active_users: IntGauge,
    system_load: Gauge,
    memory_usage: Gauge,
    cpu_usage: Gauge,
}

impl SystemGauges {
    pub fn register(registry: &Registry) -> Result<Self, RegistryError> {
        Ok(Self {
            uptime: registry.register(Gauge::new(
                "app_uptime_seconds",
                "Application uptime in seconds",
            )?)?,
            active_users: registry.register(IntGauge::new(
                "active_users_total",
                "Number of active users",
            )?)?,
            system_load: registry.register(Gauge::new(
                "system_load_average",
                "System load average",
            )?)?,
            memory_usage: registry.register(Gauge::new(
                "app_memory_usage_bytes",
                "Resident memory of the application process in bytes",
            )?)?,
            cpu_usage: registry.register(Gauge::new(
                "app_cpu_usage_percent",
                "CPU usage of the application process in percent",
            )?)?,
        })
    }

    /// Overwrite every sampled gauge
    pub fn apply(&self, sample: &SystemSample) {
        self.uptime.set(sample.uptime_seconds);
        self.active_users.set(sample.active_users);
        self.system_load.set(sample.system_load);
        self.memory_usage.set(sample.memory_bytes);
        self.cpu_usage.set(sample.cpu_percent);
    }

    pub fn set_uptime(&self, seconds: f64) {
        self.uptime.set(seconds);
    }

    pub fn uptime(&self) -> f64 {
        self.uptime.get()
    }

    pub fn active_users(&self) -> i64 {
        self.active_users.get()
    }

    pub fn system_load(&self) -> f64 {
        self.system_load.get()
    }

    pub fn memory_bytes(&self) -> f64 {
        self.memory_usage.get()
    }

    pub fn cpu_percent(&self) -> f64 {
        self.cpu_usage.get()
    }
}

/// Every metric the dashboard exports, plus the registry that renders them
#[derive(Clone)]
pub struct DashboardMetrics {
    pub registry: Arc<Registry>,
    pub http: HttpMetrics,
    pub system: SystemGauges,
}

impl DashboardMetrics {
    /// Build a registry labelled `app=<app_name>` and declare all metrics.
    ///
    /// `process_metrics` toggles the default `process_*` collector.
    pub fn new(app_name: &str, process_metrics: bool) -> Result<Self, RegistryError> {
        let mut labels = HashMap::new();
        labels.insert("app".to_string(), app_name.to_string());
        let registry = Registry::with_default_labels(labels)?;

        if process_metrics {
            process::register_default_metrics(&registry)?;
        }

        let http = HttpMetrics::register(&registry)?;
        let system = SystemGauges::register(&registry)?;

        Ok(Self {
            registry: Arc::new(registry),
            http,
            system,
        })
    }
}
