//! Route handlers and the state they share.

pub mod ads;
pub mod repair;

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use engine::{AdService, RepairWorkflow};
use store::{RecordStore, StoreError, User};

use crate::error::ApiError;

/// Header carrying the id of the user making the request.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub ads: AdService,
    pub repairs: RepairWorkflow,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            ads: AdService::new(store.clone()),
            repairs: RepairWorkflow::new(store.clone()),
            store,
        }
    }
}

/// The user on whose behalf a request runs, resolved from
/// [`USER_ID_HEADER`] through the record store.
#[derive(Debug, Clone)]
pub struct Actor(pub User);

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or(ApiError::Unauthenticated)?;

        match state.store.find_user(user_id).await {
            Ok(user) => Ok(Actor(user)),
            Err(StoreError::NotFound(_)) => Err(ApiError::Unauthenticated),
            Err(err) => Err(ApiError::Engine(err.into())),
        }
    }
}
