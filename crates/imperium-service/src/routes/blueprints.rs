use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use imperium_lib::blueprint::calculate as calculate_report;
use imperium_lib::{
    Blueprint, BlueprintId, BlueprintReport, Error as LibError, PlayerId, ResearchLevels,
};
use imperium_service_shared::{
    error_reason, extract_or_generate_request_id, record_blueprint_calculated,
    record_blueprint_rejected, AppState, CalculateRequest, ProblemDetails, SaveBlueprintRequest,
    ServiceResponse,
};

use super::{blocking, parse_body, reject, ApiResult};

/// A saved blueprint with its report against the owner's current research.
#[derive(Debug, Serialize)]
pub struct BlueprintDetail {
    #[serde(flatten)]
    pub blueprint: Blueprint,
    pub report: BlueprintReport,
}

/// `POST /api/v1/blueprints/calculate`
pub async fn calculate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CalculateRequest>, JsonRejection>,
) -> ApiResult<BlueprintReport> {
    let request_id = extract_or_generate_request_id(&headers);
    let request = parse_body(body, request_id.as_str()).inspect_err(|_| {
        record_blueprint_rejected("validation");
    })?;

    let result = blocking(&state, request_id.as_str(), move |state| {
        match request.player_id {
            Some(player_id) => {
                state
                    .blueprints()
                    .preview(player_id, request.ship_class, &request.modules)
            }
            None => calculate_report(
                request.ship_class,
                &request.modules,
                &state.catalog().modules,
                &ResearchLevels::default(),
            )
            .map_err(LibError::from),
        }
    })
    .await?;

    match result {
        Ok(report) => {
            record_blueprint_calculated(report.ship_class);
            Ok(ServiceResponse::new(report))
        }
        Err(e) => {
            record_blueprint_rejected(error_reason(&e));
            Err(reject(e, request_id.as_str()))
        }
    }
}

/// `GET /api/v1/players/{player_id}/blueprints`
pub async fn list(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
    headers: HeaderMap,
) -> ApiResult<Vec<Blueprint>> {
    let request_id = extract_or_generate_request_id(&headers);
    blocking(&state, request_id.as_str(), move |state| {
        state.blueprints().list(player_id)
    })
    .await?
    .map(ServiceResponse::new)
    .map_err(|e| reject(e, request_id.as_str()))
}

/// `POST /api/v1/players/{player_id}/blueprints`
pub async fn create(
    State(state): State<AppState>,
    Path(player_id): Path<PlayerId>,
    headers: HeaderMap,
    body: Result<Json<SaveBlueprintRequest>, JsonRejection>,
) -> ApiResult<Blueprint> {
    let request_id = extract_or_generate_request_id(&headers);
    let draft = parse_body(body, request_id.as_str())?.into_draft();
    blocking(&state, request_id.as_str(), move |state| {
        state.blueprints().create(player_id, &draft, Utc::now())
    })
    .await?
    .map(ServiceResponse::created)
    .map_err(|e| reject(e, request_id.as_str()))
}

/// `GET /api/v1/players/{player_id}/blueprints/{blueprint_id}`
pub async fn show(
    State(state): State<AppState>,
    Path((player_id, blueprint_id)): Path<(PlayerId, BlueprintId)>,
    headers: HeaderMap,
) -> ApiResult<BlueprintDetail> {
    let request_id = extract_or_generate_request_id(&headers);
    blocking(&state, request_id.as_str(), move |state| {
        let blueprints = state.blueprints();
        let blueprint = blueprints.get(player_id, blueprint_id)?;
        let report = blueprints.report(player_id, blueprint_id)?;
        Ok(BlueprintDetail { blueprint, report })
    })
    .await?
    .map(ServiceResponse::new)
    .map_err(|e| reject(e, request_id.as_str()))
}

/// `PUT /api/v1/players/{player_id}/blueprints/{blueprint_id}`
///
/// Refused with a conflict while ship orders for the blueprint are pending.
pub async fn update(
    State(state): State<AppState>,
    Path((player_id, blueprint_id)): Path<(PlayerId, BlueprintId)>,
    headers: HeaderMap,
    body: Result<Json<SaveBlueprintRequest>, JsonRejection>,
) -> ApiResult<Blueprint> {
    let request_id = extract_or_generate_request_id(&headers);
    let draft = parse_body(body, request_id.as_str())?.into_draft();
    blocking(&state, request_id.as_str(), move |state| {
        state
            .blueprints()
            .update(player_id, blueprint_id, &draft, Utc::now())
    })
    .await?
    .map(ServiceResponse::new)
    .map_err(|e| reject(e, request_id.as_str()))
}

/// `DELETE /api/v1/players/{player_id}/blueprints/{blueprint_id}`
pub async fn remove(
    State(state): State<AppState>,
    Path((player_id, blueprint_id)): Path<(PlayerId, BlueprintId)>,
    headers: HeaderMap,
) -> Result<StatusCode, ProblemDetails> {
    let request_id = extract_or_generate_request_id(&headers);
    blocking(&state, request_id.as_str(), move |state| {
        state.blueprints().delete(player_id, blueprint_id)
    })
    .await?
    .map_err(|e| reject(e, request_id.as_str()))?;
    Ok(StatusCode::NO_CONTENT)
}
