use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;

use imperium_lib::construction::QueueEntryId;
use imperium_lib::{PlayerId, QueueEntry, QueueKind};
use imperium_service_shared::{
    extract_or_generate_request_id, record_construction_queued, AppState, EnqueueRequest,
    ServiceResponse,
};

use super::{blocking, parse_body, reject, ApiResult};

/// `GET /api/v1/players/{player_id}/construction`
pub async fn list(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
    headers: HeaderMap,
) -> ApiResult<Vec<QueueEntry>> {
    let request_id = extract_or_generate_request_id(&headers);
    blocking(&state, request_id.as_str(), move |state| {
        state.construction().entries_for_player(player_id)
    })
    .await?
    .map(ServiceResponse::new)
    .map_err(|e| reject(e, request_id.as_str()))
}

/// `POST /api/v1/players/{player_id}/construction`
///
/// `target_id` names a blueprint for ship orders and a building type for
/// building orders.
pub async fn enqueue(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
    headers: HeaderMap,
    body: Result<Json<EnqueueRequest>, JsonRejection>,
) -> ApiResult<QueueEntry> {
    let request_id = extract_or_generate_request_id(&headers);
    let request = parse_body(body, request_id.as_str())?;

    let entry = blocking(&state, request_id.as_str(), move |state| {
        let construction = state.construction();
        let now = Utc::now();
        match request.kind {
            QueueKind::Ship => construction.enqueue_ship(
                player_id,
                request.planet_id,
                request.target_id,
                request.quantity,
                now,
            ),
            QueueKind::Building => construction.enqueue_building(
                player_id,
                request.planet_id,
                request.target_id,
                request.quantity,
                now,
            ),
        }
    })
    .await?
    .map_err(|e| reject(e, request_id.as_str()))?;

    record_construction_queued(entry.kind, entry.quantity);
    Ok(ServiceResponse::created(entry))
}

/// `DELETE /api/v1/players/{player_id}/construction/{kind}/{entry_id}`
///
/// Only pending orders can be cancelled; the removed order is returned.
pub async fn cancel(
    State(state): State<AppState>,
    Path((player_id, kind, entry_id)): Path<(PlayerId, QueueKind, QueueEntryId)>,
    headers: HeaderMap,
) -> ApiResult<QueueEntry> {
    let request_id = extract_or_generate_request_id(&headers);
    blocking(&state, request_id.as_str(), move |state| {
        state.construction().cancel_entry(player_id, kind, entry_id)
    })
    .await?
    .map(ServiceResponse::new)
    .map_err(|e| reject(e, request_id.as_str()))
}
