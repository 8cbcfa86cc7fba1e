//! Liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `ok`, or `not_ready: <reason>`.
    pub status: String,
    pub service: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules_loaded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_loaded: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buildings_loaded: Option<usize>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            modules_loaded: None,
            research_loaded: None,
            buildings_loaded: None,
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {reason}"),
            ..Self::alive(service, version)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// `GET /health/live`
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// `GET /health/ready`: catalogs are non-empty and the database answers.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let status = readiness(&state);
    let code = if status.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status)).into_response()
}

fn readiness(state: &AppState) -> HealthStatus {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");
    let catalog = state.catalog();

    if catalog.modules.is_empty() || catalog.research.is_empty() {
        return HealthStatus::not_ready(service, version, "reference catalogs are empty");
    }
    if let Err(e) = state.store().ping() {
        tracing::warn!(error = %e, "database ping failed");
        return HealthStatus::not_ready(service, version, "database unavailable");
    }

    HealthStatus {
        modules_loaded: Some(catalog.modules.len()),
        research_loaded: Some(catalog.research.len()),
        buildings_loaded: Some(catalog.buildings.len()),
        ..HealthStatus::alive(service, version)
    }
}
