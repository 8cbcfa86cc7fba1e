//! RFC 9457 Problem Details for HTTP APIs.
//!
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use imperium_lib::Error as LibError;

pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";
pub const PROBLEM_GATED: &str = "/problems/gated";
pub const PROBLEM_FORBIDDEN: &str = "/problems/forbidden";
pub const PROBLEM_NOT_FOUND: &str = "/problems/not-found";
pub const PROBLEM_CONFLICT: &str = "/problems/conflict";
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// Error body shared by every endpoint.
///
/// `errors` carries the structured library error (for example the list of
/// missing research) so clients need not parse `detail`.
///
/// ```
/// use axum::http::StatusCode;
/// use imperium_service_shared::{ProblemDetails, PROBLEM_CONFLICT};
///
/// let problem = ProblemDetails::new(PROBLEM_CONFLICT, "Conflict", StatusCode::CONFLICT)
///     .with_detail("player 1 is already researching 3")
///     .with_request_id("req-1");
/// assert_eq!(problem.status, 409);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// The request id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            errors: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// Attach a structured error; values that fail to serialize are dropped.
    pub fn with_errors<T: Serialize>(mut self, errors: &T) -> Self {
        self.errors = serde_json::to_value(errors).ok();
        self
    }

    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_INVALID_REQUEST, "Invalid Request", StatusCode::BAD_REQUEST)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    pub fn not_found(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_NOT_FOUND, "Not Found", StatusCode::NOT_FOUND)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.detail.as_deref().unwrap_or(""))
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(&self)).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Short metric label for a library error.
pub fn error_reason(error: &LibError) -> &'static str {
    match error {
        LibError::Validation(_) | LibError::InvalidQuantity => "validation",
        LibError::Gating(_) => "gated",
        LibError::NotOwned { .. } => "not_owned",
        LibError::Conflict(_) => "conflict",
        LibError::UnknownPlayer(_)
        | LibError::UnknownPlanet(_)
        | LibError::UnknownBlueprint(_)
        | LibError::UnknownBuildingType(_)
        | LibError::UnknownResearch(_)
        | LibError::UnknownQueueEntry { .. } => "unknown",
        _ => "internal",
    }
}

/// Map a library error to its problem response.
///
/// Validation maps to 400, closed gates and foreign records to 403, unknown
/// ids to 404, conflicts to 409. Everything else is a 500 whose detail is not
/// exposed.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::Validation(inner) => ProblemDetails::bad_request(error.to_string(), request_id)
            .with_errors(inner),
        LibError::InvalidQuantity => ProblemDetails::bad_request(error.to_string(), request_id),
        LibError::Gating(inner) => {
            ProblemDetails::new(PROBLEM_GATED, "Gated", StatusCode::FORBIDDEN)
                .with_detail(error.to_string())
                .with_request_id(request_id)
                .with_errors(inner)
        }
        LibError::NotOwned { .. } => {
            ProblemDetails::new(PROBLEM_FORBIDDEN, "Forbidden", StatusCode::FORBIDDEN)
                .with_detail(error.to_string())
                .with_request_id(request_id)
        }
        LibError::Conflict(inner) => {
            ProblemDetails::new(PROBLEM_CONFLICT, "Conflict", StatusCode::CONFLICT)
                .with_detail(error.to_string())
                .with_request_id(request_id)
                .with_errors(inner)
        }
        LibError::UnknownPlayer(_)
        | LibError::UnknownPlanet(_)
        | LibError::UnknownBlueprint(_)
        | LibError::UnknownBuildingType(_)
        | LibError::UnknownResearch(_)
        | LibError::UnknownQueueEntry { .. } => {
            ProblemDetails::not_found(error.to_string(), request_id)
        }
        LibError::CatalogNotFound { .. } | LibError::ProjectDirsUnavailable => {
            ProblemDetails::service_unavailable("reference data is not available", request_id)
        }
        _ => {
            tracing::error!(request_id, error = %error, "internal error");
            ProblemDetails::internal_error("internal error", request_id)
        }
    }
}
