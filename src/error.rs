use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::foods::LookupError;
use crate::session::{SessionError, SessionLimitReached};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error("product {0} not found")]
    ProductNotFound(String),

    #[error("no recipes found for '{0}'")]
    NoRecipes(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    TooManySessions(#[from] SessionLimitReached),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::SessionNotFound(_)
            | AppError::ProductNotFound(_)
            | AppError::NoRecipes(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::Session(_)
            | AppError::Lookup(LookupError::InvalidBarcode(_)) => StatusCode::BAD_REQUEST,
            AppError::Lookup(_) => StatusCode::BAD_GATEWAY,
            AppError::TooManySessions(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, %status, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
