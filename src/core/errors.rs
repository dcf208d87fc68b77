use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("index unavailable: {0}")]
    IndexUnavailable(String),
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn index<E: std::fmt::Display>(err: E) -> Self {
        ApiError::IndexUnavailable(err.to_string())
    }

    pub fn model<E: std::fmt::Display>(err: E) -> Self {
        ApiError::ModelUnavailable(err.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::IndexUnavailable(_) | ApiError::ModelUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Config(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
