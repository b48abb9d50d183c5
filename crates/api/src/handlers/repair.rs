use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use engine::RepairOutcome;
use store::{RepairRequest, RepairStatus};

use super::{Actor, AppState};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};

#[derive(Deserialize)]
pub struct AdvanceStatusDto {
    pub status: RepairStatus,
}

#[derive(Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<RepairStatus>,
}

/// `POST /ads/:id/repair-request` — 201 when a request is created, 200 when
/// one is already waiting for the repair authority.
pub async fn request(
    ApiPath(ad_id): ApiPath<i64>,
    State(state): State<AppState>,
    Actor(user): Actor,
) -> Result<(StatusCode, Json<RepairRequest>), ApiError> {
    match state.repairs.request_repair(ad_id, user.id).await? {
        RepairOutcome::Created(request) => Ok((StatusCode::CREATED, Json(request))),
        RepairOutcome::AlreadyPending(request) => Ok((StatusCode::OK, Json(request))),
    }
}

pub async fn lookup(
    ApiPath(ad_id): ApiPath<i64>,
    State(state): State<AppState>,
    Actor(user): Actor,
) -> Result<Json<RepairRequest>, ApiError> {
    Ok(Json(state.repairs.lookup_by_ad(ad_id, &user).await?))
}

pub async fn cancel(
    ApiPath(ad_id): ApiPath<i64>,
    State(state): State<AppState>,
    Actor(user): Actor,
) -> Result<StatusCode, ApiError> {
    state.repairs.cancel_request(ad_id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn advance(
    ApiPath(request_id): ApiPath<i64>,
    State(state): State<AppState>,
    Actor(user): Actor,
    ApiJson(payload): ApiJson<AdvanceStatusDto>,
) -> Result<Json<RepairRequest>, ApiError> {
    let updated = state
        .repairs
        .advance_status(request_id, &user, payload.status)
        .await?;
    Ok(Json(updated))
}

pub async fn list(
    State(state): State<AppState>,
    Actor(user): Actor,
    ApiQuery(query): ApiQuery<ListRequestsQuery>,
) -> Result<Json<Vec<RepairRequest>>, ApiError> {
    Ok(Json(state.repairs.list_requests(&user, query.status).await?))
}
