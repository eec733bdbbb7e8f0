//! HTTP reporting service for the card tester's health records.
//!
//! Serves the active card status records as JSON for the web dashboard,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use card_store::CardStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::data::AppState;

/// Creates the Axum application router with all routes and shared state.
///
/// The report is mounted on `/data` and, for dashboards that still request
/// the old script path, on `/data.php`. Both accept any method.
pub fn create_app<S: CardStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/data", any(routes::data::data::<S>))
        .route("/data.php", any(routes::data::data::<S>))
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

/// Wraps a card store in shared application state.
pub fn create_state<S: CardStore + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store))
}
