//! Metrics registry
//!
//! Wraps a Prometheus registry with two guarantees the plain registry does
//! not give: a name can only be declared once, and the text snapshot lists
//! metric families in the order they were declared, including families whose
//! label sets have not been written yet.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use prometheus::core::Collector;
use prometheus::proto::{MetricFamily, MetricType};
use prometheus::{Encoder, TextEncoder};

use crate::error::RegistryError;

/// Content type of the text exposition format
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// A declared metric family
#[derive(Debug, Clone)]
struct Declaration {
    name: String,
    help: String,
    kind: MetricType,
}

impl Declaration {
    /// HELP/TYPE header for a family that has no series yet
    fn write_header(&self, out: &mut Vec<u8>) {
        let header = format!(
            "# HELP {name} {help}\n# TYPE {name} {kind}\n",
            name = self.name,
            help = escape_help(&self.help),
            kind = type_name(self.kind),
        );
        out.extend_from_slice(header.as_bytes());
    }
}

/// Process-wide set of metrics, shared by reference with request handling
/// and the sampler.
pub struct Registry {
    inner: prometheus::Registry,
    declared: RwLock<Vec<Declaration>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: prometheus::Registry::new(),
            declared: RwLock::new(Vec::new()),
        }
    }

    /// Create a registry whose series all carry `labels`
    pub fn with_default_labels(labels: HashMap<String, String>) -> Result<Self, RegistryError> {
        Ok(Self {
            inner: prometheus::Registry::new_custom(None, Some(labels))?,
            declared: RwLock::new(Vec::new()),
        })
    }

    /// Register a metric and hand it back for use by the caller.
    ///
    /// Fails with [`RegistryError::DuplicateName`] if any of its names is
    /// already taken.
    pub fn register<C>(&self, collector: C) -> Result<C, RegistryError>
    where
        C: Collector + Clone + 'static,
    {
        self.register_collector(Box::new(collector.clone()))?;
        Ok(collector)
    }

    /// Register a collector that may describe several metric families
    pub fn register_collector(&self, collector: Box<dyn Collector>) -> Result<(), RegistryError> {
        let kinds: HashMap<String, MetricType> = collector
            .collect()
            .iter()
            .map(|family| (family.get_name().to_string(), family.get_field_type()))
            .collect();

        let incoming: Vec<Declaration> = collector
            .desc()
            .into_iter()
            .map(|desc| Declaration {
                name: desc.fq_name.clone(),
                help: desc.help.clone(),
                kind: kinds
                    .get(&desc.fq_name)
                    .copied()
                    .unwrap_or(MetricType::UNTYPED),
            })
            .collect();

        let mut declared = self.declared.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(dup) = incoming
            .iter()
            .find(|new| declared.iter().any(|existing| existing.name == new.name))
        {
            return Err(RegistryError::DuplicateName(dup.name.clone()));
        }

        self.inner.register(collector).map_err(|err| match err {
            prometheus::Error::AlreadyReg => RegistryError::DuplicateName(
                incoming
                    .first()
                    .map(|d| d.name.clone())
                    .unwrap_or_default(),
            ),
            other => RegistryError::Prometheus(other),
        })?;

        declared.extend(incoming);
        Ok(())
    }

    /// Names of all declared metric families, in declaration order
    pub fn metric_names(&self) -> Vec<String> {
        self.declared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|d| d.name.clone())
            .collect()
    }

    /// Render every declared family in the text exposition format
    pub fn render(&self) -> Result<String, RegistryError> {
        let mut gathered: HashMap<String, MetricFamily> = self
            .inner
            .gather()
            .into_iter()
            .map(|family| (family.get_name().to_string(), family))
            .collect();

        let declared = self.declared.read().unwrap_or_else(PoisonError::into_inner);
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();

        for declaration in declared.iter() {
            match gathered.remove(&declaration.name) {
                Some(family) => encoder.encode(std::slice::from_ref(&family), &mut buffer)?,
                None => declaration.write_header(&mut buffer),
            }
        }

        String::from_utf8(buffer).map_err(|e| RegistryError::Encoding(e.to_string()))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn type_name(kind: MetricType) -> &'static str {
    match kind {
        MetricType::COUNTER => "counter",
        MetricType::GAUGE => "gauge",
        MetricType::SUMMARY => "summary",
        MetricType::HISTOGRAM => "histogram",
        MetricType::UNTYPED => "untyped",
    }
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}
