//! Wrapper for successful responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Successful response body with its status code.
///
/// The payload is serialized as-is; the status is not part of the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceResponse<T> {
    pub data: T,
    #[serde(skip)]
    status: Option<u16>,
}

impl<T> ServiceResponse<T> {
    /// 200 OK.
    pub fn new(data: T) -> Self {
        Self { data, status: None }
    }

    /// 201 Created.
    pub fn created(data: T) -> Self {
        Self {
            data,
            status: Some(StatusCode::CREATED.as_u16()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::OK)
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self.data)).into_response()
    }
}
