use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;

use imperium_lib::research::PlayerResearchProgress;
use imperium_lib::{PlayerId, ResearchView};
use imperium_service_shared::{
    error_reason, extract_or_generate_request_id, record_research_failed,
    record_research_started, AppState, ServiceResponse, StartResearchRequest,
};

use super::{blocking, parse_body, reject, ApiResult};

/// `GET /api/v1/players/{player_id}/research`
///
/// Every node visible to the player's faction, classified as locked,
/// available, in progress or completed.
pub async fn status(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
    headers: HeaderMap,
) -> ApiResult<Vec<ResearchView>> {
    let request_id = extract_or_generate_request_id(&headers);
    blocking(&state, request_id.as_str(), move |state| {
        state.research().status(player_id)
    })
    .await?
    .map(ServiceResponse::new)
    .map_err(|e| reject(e, request_id.as_str()))
}

/// `POST /api/v1/players/{player_id}/research`
pub async fn start(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
    headers: HeaderMap,
    body: Result<Json<StartResearchRequest>, JsonRejection>,
) -> ApiResult<PlayerResearchProgress> {
    let request_id = extract_or_generate_request_id(&headers);
    let request = parse_body(body, request_id.as_str())?;

    let result = blocking(&state, request_id.as_str(), move |state| {
        state
            .research()
            .start(player_id, request.research_id, Utc::now())
    })
    .await?;

    match result {
        Ok(row) => {
            let level = state
                .catalog()
                .research
                .get(row.research_type_id)
                .map_or(0, |node| node.research_level);
            record_research_started(level);
            Ok(ServiceResponse::created(row))
        }
        Err(e) => {
            record_research_failed(error_reason(&e));
            Err(reject(e, request_id.as_str()))
        }
    }
}

/// `DELETE /api/v1/players/{player_id}/research`
pub async fn cancel(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
    headers: HeaderMap,
) -> ApiResult<PlayerResearchProgress> {
    let request_id = extract_or_generate_request_id(&headers);
    blocking(&state, request_id.as_str(), move |state| {
        state.research().cancel(player_id)
    })
    .await?
    .map(ServiceResponse::new)
    .map_err(|e| reject(e, request_id.as_str()))
}
