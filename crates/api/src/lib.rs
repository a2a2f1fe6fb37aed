//! HTTP front of the product composite service.
//!
//! Serves the composite read view and accepts composite writes, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod downstream;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use composite::{
    AggregationOrchestrator, CompositeError, HttpProductService, HttpRecommendationService,
    HttpReviewService, ProductService, RecommendationService, ReviewService, WritePropagator,
};
use event_bus::{EventTransport, InMemoryTransport};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::aggregate::AppState;

/// Application state backed by HTTP upstreams and the in-memory transport.
pub type HttpAppState = AppState<
    HttpProductService,
    HttpRecommendationService,
    HttpReviewService,
    InMemoryTransport,
>;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<P, R, V, Tr>(
    state: Arc<AppState<P, R, V, Tr>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    P: ProductService + 'static,
    R: RecommendationService + 'static,
    V: ReviewService + 'static,
    Tr: EventTransport + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/aggregate", post(routes::aggregate::create::<P, R, V, Tr>))
        .route(
            "/aggregate/{item_id}",
            get(routes::aggregate::get::<P, R, V, Tr>)
                .delete(routes::aggregate::delete::<P, R, V, Tr>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state from configuration.
///
/// Returns the transport as well so the caller can attach consumers to it.
pub fn create_default_state(
    config: &Config,
) -> Result<(Arc<HttpAppState>, InMemoryTransport), CompositeError> {
    let transport = InMemoryTransport::new(config.event_partitions);
    let orchestrator =
        AggregationOrchestrator::connect(&config.upstream(), &config.service_address)?;
    let propagator = WritePropagator::new(transport.clone());

    let state = Arc::new(AppState::new(orchestrator, propagator));
    Ok((state, transport))
}
