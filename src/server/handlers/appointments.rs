use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Map, Value};

use crate::core::errors::ApiError;

const REQUIRED_FIELDS: [&str; 4] = ["name", "date", "time", "contact"];

/// `POST /book-appointment`. Echoes the four booking fields back; nothing is
/// stored.
pub async fn book_appointment(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let appointment = extract_appointment(&body)
        .ok_or_else(|| ApiError::BadRequest("Missing required fields".to_string()))?;

    tracing::info!("Appointment request accepted");

    Ok(Json(json!({
        "message": "Appointment booked successfully",
        "appointment": appointment,
    })))
}

/// The required fields, values untouched, or `None` if any key is absent.
fn extract_appointment(body: &Value) -> Option<Map<String, Value>> {
    let fields = body.as_object()?;
    REQUIRED_FIELDS
        .iter()
        .map(|key| fields.get(*key).map(|value| (key.to_string(), value.clone())))
        .collect()
}
