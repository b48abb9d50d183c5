//! HTTP error mapping.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use engine::EngineError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable `x-user-id` header, or it names no known user.
    #[error("authentication required")]
    Unauthenticated,

    /// The path, query string or body could not be decoded.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

macro_rules! rejection_into_api_error {
    ($($rejection:ty),+) => {
        $(impl From<$rejection> for ApiError {
            fn from(rejection: $rejection) -> Self {
                Self::Rejected {
                    status: rejection.status(),
                    message: rejection.body_text(),
                }
            }
        })+
    };
}

rejection_into_api_error!(JsonRejection, PathRejection, QueryRejection);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Rejected { status, .. } => *status,
            Self::Engine(err) => match err {
                EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                EngineError::Conflict(_) => StatusCode::CONFLICT,
                EngineError::Authorization(_) => StatusCode::FORBIDDEN,
                EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("request failed: {self}");
            "internal server error".to_owned()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

/// Failures while starting the server.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("database error: {0}")]
    Database(#[from] db::DbError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
