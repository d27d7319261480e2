//! Server configuration

use std::str::FromStr;
use std::time::Duration;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub static_dir: String,
    pub environment: String,
    pub app_name: String,
    pub sample_interval: Duration,
    pub collect_default_metrics: bool,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let env = |key: &str| std::env::var(key).ok();

        Self {
            bind_address: env("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".into()),
            static_dir: env("STATIC_DIR").unwrap_or_else(|| "public".into()),
            environment: env("APP_ENV").unwrap_or_else(|| "development".into()),
            app_name: env("APP_NAME").unwrap_or_else(|| "health-dashboard".into()),
            sample_interval: Duration::from_secs(
                parse_or("SAMPLE_INTERVAL_SECS", env("SAMPLE_INTERVAL_SECS"), 5u64).max(1),
            ),
            collect_default_metrics: parse_or(
                "COLLECT_DEFAULT_METRICS",
                env("COLLECT_DEFAULT_METRICS"),
                true,
            ),
            cors_origins: parse_origins(env("CORS_ORIGINS").as_deref()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".into(),
            static_dir: "public".into(),
            environment: "development".into(),
            app_name: "health-dashboard".into(),
            sample_interval: Duration::from_secs(5),
            collect_default_metrics: true,
            cors_origins: vec!["*".into()],
        }
    }
}

/// Parse `raw`, falling back to `default` (with a warning) when it is malformed
fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, default = ?default, "Invalid value, using default");
            default
        }),
    }
}

/// Comma-separated origin list; empty or unset means any origin
fn parse_origins(raw: Option<&str>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or("*")
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() {
        vec!["*".into()]
    } else {
        origins
    }
}
