//! Thin axum handlers over the engine managers.

pub mod blueprints;
pub mod construction;
pub mod research;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use imperium_lib::Error as LibError;
use imperium_service_shared::{from_lib_error, AppState, ProblemDetails, ServiceResponse, Validate};

pub type ApiResult<T> = Result<ServiceResponse<T>, ProblemDetails>;

/// Unwrap a JSON body and run its validation.
pub(crate) fn parse_body<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
    request_id: &str,
) -> Result<T, ProblemDetails> {
    let Json(request) =
        body.map_err(|e| ProblemDetails::bad_request(e.body_text(), request_id))?;
    request.validate(request_id).map_err(|problem| *problem)?;
    Ok(request)
}

pub(crate) fn reject(error: LibError, request_id: &str) -> ProblemDetails {
    let problem = from_lib_error(&error, request_id);
    if problem.status < 500 {
        tracing::info!(request_id, status = problem.status, error = %error, "request rejected");
    }
    problem
}

/// Run a synchronous engine call on the blocking pool.
///
/// The store holds a mutex around one SQLite connection, so engine calls must
/// not run on the async workers. The outer error is a task failure; the inner
/// result is the engine's own.
pub(crate) async fn blocking<T, F>(
    state: &AppState,
    request_id: &str,
    call: F,
) -> Result<imperium_lib::Result<T>, ProblemDetails>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> imperium_lib::Result<T> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || call(&state))
        .await
        .map_err(|e| {
            tracing::error!(request_id, error = %e, "engine task failed");
            ProblemDetails::internal_error("internal error", request_id)
        })
}
