//! dashboard-server: health dashboard HTTP server binary entrypoint.

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dashboard_server::config::Config;
use dashboard_server::sampler::Sampler;
use dashboard_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();

    // Declare metrics
    let state = AppState::new(&config).expect("Failed to initialize metrics registry");

    // Log startup info
    if config.collect_default_metrics {
        tracing::info!("Default process metrics enabled");
    } else {
        tracing::warn!("Default process metrics disabled (COLLECT_DEFAULT_METRICS=false)");
    }
    tracing::info!(
        "Sampling system gauges every {}s",
        config.sample_interval.as_secs()
    );

    // Start the sampler; it runs until the process exits
    Sampler::new(state.metrics.system.clone(), state.started).spawn(config.sample_interval);

    // Build application
    let app = dashboard_server::build_app(state, &config);

    // Start server
    let addr: SocketAddr = config.bind_address.parse().expect("Invalid bind address");
    tracing::info!("Health dashboard running on {}", addr);
    tracing::info!("Dashboard: http://{}/", addr);
    tracing::info!("API health: http://{}/api/health", addr);
    tracing::info!("Metrics: http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server shutdown complete");
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
