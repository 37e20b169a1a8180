use std::path::PathBuf;
use std::sync::Arc;

use bartr::config::Configuration;
use bartr::{app, initialize_state, telemetry};
use opentelemetry::global;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let path = std::env::var("CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_default();
    // failures are reported once the subscriber is installed.
    let loaded = Configuration::default().path(path).load();
    let endpoint = loaded
        .as_ref()
        .ok()
        .and_then(|config| config.telemetry.otlp_endpoint.clone());

    // export traces and logs only when a collector is configured.
    let (bridge, logger_provider, tracer_provider) = match endpoint {
        Some(endpoint) => {
            let (bridge, logger_provider) = telemetry::setup_logging(&endpoint)?;
            let tracer_provider = telemetry::setup_tracer(&endpoint)?;
            global::set_tracer_provider(tracer_provider.clone());
            (Some(bridge), Some(logger_provider), Some(tracer_provider))
        },
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(bridge)
        .init();

    let config = Arc::new(loaded.unwrap_or_else(Configuration::fallback));

    let metrics = if config.telemetry.metrics {
        Some(telemetry::setup_metrics_recorder()?)
    } else {
        None
    };

    let state = initialize_state(config.clone(), metrics).await?;

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    tracing::info!(%address, name = %config.name, "server listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutting down");

    if let Some(Err(err)) = tracer_provider.map(|provider| provider.shutdown()) {
        tracing::warn!(error = ?err, "tracer provider did not shut down cleanly");
    }
    if let Some(Err(err)) = logger_provider.map(|provider| provider.shutdown()) {
        tracing::warn!(error = ?err, "logger provider did not shut down cleanly");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to install signal handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
