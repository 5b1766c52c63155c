//! HTTP and WebSocket server for the order & discount engine.
//!
//! Exposes the storefront endpoints (catalog, cart, checkout), the admin
//! read surface, and a WebSocket channel that pushes freshly minted
//! discount codes, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use engine::{ProductCatalog, StoreEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use notify::NotificationHub;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::store::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::check))
        .route("/products", get(routes::store::list_products))
        .route("/cart", get(routes::store::get_cart))
        .route("/cart/add", post(routes::store::add_to_cart))
        .route("/checkout", post(routes::store::checkout))
        .route("/admin/stats", get(routes::admin::stats))
        .route("/admin/orders", get(routes::admin::orders))
        .route("/ws", get(routes::ws::upgrade))
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

/// Creates the shared application state: the demo catalog wired to one
/// notification hub and one engine instance.
///
/// The hub handed to the engine and the hub kept in the state are the same
/// hub, so WebSocket subscribers see every code the engine mints.
pub fn create_state(mint_every: u64) -> Arc<AppState> {
    let hub = NotificationHub::new();
    let engine = StoreEngine::with_mint_interval(ProductCatalog::demo(), hub.clone(), mint_every);

    Arc::new(AppState {
        engine: Arc::new(engine),
        hub,
    })
}
