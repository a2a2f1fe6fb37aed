//! API server entry point.

use std::time::Duration;

use api::config::{Config, LogFormat};
use api::downstream::{self, LocalStores};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Poll interval of the in-process consumers.
const CONSUMER_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    init_tracing(&config);

    let metrics_handle =
        api::routes::metrics::install_recorder().expect("failed to install Prometheus recorder");

    let (state, transport) =
        api::create_default_state(&config).expect("failed to build upstream clients");
    tracing::info!(
        product = %config.product_url,
        recommendation = %config.recommendation_url,
        review = %config.review_url,
        service_address = %config.service_address,
        "upstreams configured"
    );

    let consumers = downstream::spawn(&transport, &LocalStores::default(), CONSUMER_POLL_INTERVAL);

    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting composite server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    for consumer in consumers {
        consumer.abort();
    }
    tracing::info!("server shut down gracefully");
}
