use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::state::AppState;

/// `POST /chat` with `{"query": "..."}`.
///
/// A missing, non-string or empty query is rejected here. Everything else is
/// answered by the synthesizer with 200, including pipeline failures, which
/// come back as `{"error": ...}`.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let query = body
        .get("query")
        .and_then(Value::as_str)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No query provided".to_string()))?;

    Ok(Json(state.synthesizer.get_response(query).await))
}
