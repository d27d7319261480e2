//! Process resource statistics
//!
//! The default process metrics (memory, CPU seconds, file descriptors, start
//! time) come from the Prometheus process collector, which only exists on
//! Linux. Everywhere else registration is a no-op and snapshots are empty.

use crate::error::RegistryError;
use crate::registry::Registry;

/// Point-in-time resource usage of the current process
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessSnapshot {
    pub resident_bytes: f64,
    pub cpu_seconds: f64,
}

/// Register the default `process_*` metrics.
///
/// Returns whether anything was registered.
#[cfg(target_os = "linux")]
pub fn register_default_metrics(registry: &Registry) -> Result<bool, RegistryError> {
    let collector = prometheus::process_collector::ProcessCollector::for_self();
    registry.register_collector(Box::new(collector))?;
    Ok(true)
}

#[cfg(not(target_os = "linux"))]
pub fn register_default_metrics(_registry: &Registry) -> Result<bool, RegistryError> {
    Ok(false)
}

/// Collector used for snapshots, built on first use
#[cfg(target_os = "linux")]
fn self_collector() -> &'static prometheus::process_collector::ProcessCollector {
    use std::sync::OnceLock;

    static COLLECTOR: OnceLock<prometheus::process_collector::ProcessCollector> = OnceLock::new();
    COLLECTOR.get_or_init(prometheus::process_collector::ProcessCollector::for_self)
}

/// Read current resource usage, `None` when the platform has no collector
#[cfg(target_os = "linux")]
pub fn snapshot() -> Option<ProcessSnapshot> {
    use prometheus::core::Collector;

    let families = self_collector().collect();
    if families.is_empty() {
        return None;
    }

    let mut snapshot = ProcessSnapshot::default();
    for family in &families {
        let Some(metric) = family.get_metric().first() else {
            continue;
        };
        match family.get_name() {
            "process_resident_memory_bytes" => {
                snapshot.resident_bytes = metric.get_gauge().get_value();
            }
            "process_cpu_seconds_total" => {
                snapshot.cpu_seconds = metric.get_counter().get_value();
            }
            _ => {}
        }
    }

    Some(snapshot)
}

#[cfg(not(target_os = "linux"))]
pub fn snapshot() -> Option<ProcessSnapshot> {
    None
}

/// Format a byte count as whole mebibytes, e.g. `"42 MB"`
pub fn format_megabytes(bytes: f64) -> String {
    format!("{} MB", megabytes(bytes))
}

/// Whole mebibytes, rounded to nearest
pub fn megabytes(bytes: f64) -> u64 {
    (bytes / 1024.0 / 1024.0).round() as u64
}
