//! Mapping of catalog errors onto HTTP responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use livraria::error::CatalogError;

/// Error returned by every handler. Renders as `{"erro": "<message>"}`.
#[derive(Debug)]
pub struct ApiError(pub CatalogError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CatalogError::Backend(_) | CatalogError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(CatalogError::InvalidInput(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(CatalogError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if !self.0.is_client_error() {
            error!(error = %self.0, "request failed");
        }

        (status, Json(json!({ "erro": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
