use axum::{extract::State, http::StatusCode, Json};

use engine::AdDraft;
use store::{Ad, AdPatch};

use super::{Actor, AppState};
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};

/// `GET /ads` — equality filters (`plane_age`, `category_id`, `price`) or
/// repeated `sort=<column>,<asc|desc>`.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<Vec<(String, String)>>,
) -> Result<Json<Vec<Ad>>, ApiError> {
    Ok(Json(state.ads.list(&params).await?))
}

pub async fn get(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
) -> Result<Json<Ad>, ApiError> {
    Ok(Json(state.ads.get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Actor(user): Actor,
    ApiJson(draft): ApiJson<AdDraft>,
) -> Result<(StatusCode, Json<Ad>), ApiError> {
    let ad = state.ads.create(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(ad)))
}

pub async fn update(
    ApiPath(id): ApiPath<i64>,
    State(state): State<AppState>,
    Actor(user): Actor,
    ApiJson(patch): ApiJson<AdPatch>,
) -> Result<Json<Ad>, ApiError> {
    Ok(Json(state.ads.update(&user, id, patch).await?))
}
