//! Imperium HTTP service.
//!
//! # Endpoints
//!
//! - `POST /api/v1/blueprints/calculate` - stats and costs for a module list
//! - `GET|POST /api/v1/players/{player_id}/blueprints`
//! - `GET|PUT|DELETE /api/v1/players/{player_id}/blueprints/{blueprint_id}`
//! - `GET|POST|DELETE /api/v1/players/{player_id}/research`
//! - `GET|POST /api/v1/players/{player_id}/construction`
//! - `DELETE /api/v1/players/{player_id}/construction/{kind}/{entry_id}`
//! - `GET /metrics`, `GET /health/live`, `GET /health/ready`
//!
//! Errors are RFC 9457 problem documents.

pub mod routes;
pub mod scan_loop;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use imperium_service_shared::{health_live, health_ready, metrics_handler, AppState, MetricsLayer};

pub use scan_loop::{run_scan, spawn_scan_loop};

/// Build the full router around `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/blueprints/calculate", post(routes::blueprints::calculate))
        .route(
            "/api/v1/players/{player_id}/blueprints",
            get(routes::blueprints::list).post(routes::blueprints::create),
        )
        .route(
            "/api/v1/players/{player_id}/blueprints/{blueprint_id}",
            get(routes::blueprints::show)
                .put(routes::blueprints::update)
                .delete(routes::blueprints::remove),
        )
        .route(
            "/api/v1/players/{player_id}/research",
            get(routes::research::status)
                .post(routes::research::start)
                .delete(routes::research::cancel),
        )
        .route(
            "/api/v1/players/{player_id}/construction",
            get(routes::construction::list).post(routes::construction::enqueue),
        )
        .route(
            "/api/v1/players/{player_id}/construction/{kind}/{entry_id}",
            delete(routes::construction::cancel),
        )
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(MetricsLayer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
