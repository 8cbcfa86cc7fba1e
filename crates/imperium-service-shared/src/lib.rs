//! Shared infrastructure for the Imperium HTTP service.
//!
//! - [`AppState`]: loaded catalogs, the store and the three engine managers
//! - [`ServiceConfig`]: environment-driven service settings
//! - [`health`]: liveness and readiness handlers
//! - [`ProblemDetails`]: RFC 9457 error bodies mapped from library errors
//! - [`ServiceResponse`]: wrapper for successful responses
//! - [`metrics`]: Prometheus recorder and engine counters
//! - [`logging`]: JSON or text tracing setup
//! - [`middleware`]: request ids and HTTP metrics
//! - request bodies with validation for each endpoint
//!
//! Handlers stay thin: parse, validate, call `imperium-lib`, format.

mod config;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::ServiceConfig;
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_blueprint_calculated, record_blueprint_rejected,
    record_construction_queued, record_research_failed, record_research_started, record_scan,
    MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    error_reason, from_lib_error, ProblemDetails, PROBLEM_CONFLICT, PROBLEM_FORBIDDEN,
    PROBLEM_GATED, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST, PROBLEM_NOT_FOUND,
    PROBLEM_SERVICE_UNAVAILABLE,
};
pub use request::{
    CalculateRequest, EnqueueRequest, SaveBlueprintRequest, StartResearchRequest, Validate,
};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
