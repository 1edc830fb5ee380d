//! Contact-form endpoint.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portfolio::contact::{ContactError, SubmitContactRequest};
use serde_json::{Value, json};

use super::{AppState, ErrorResponse};

/// `POST /api/contact` - validate, store, and forward a submission.
///
/// # Request
///
/// ```json
/// {"name": "Jane", "email": "jane@example.com", "phone": "...", "message": "...", "timestamp": "..."}
/// ```
///
/// Only `name` and `email` are required.
///
/// # Responses
///
/// * `200` - `{"success": true, "data": <Brevo response>}`
/// * `400` - `{"error": "Name and Email are required."}`
/// * Brevo's own status (fallback `502`) - the upstream rejected the
///   forward; its body is passed through under `"error"` so the frontend
///   sees exactly what the marketing API said
pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitContactRequest>,
) -> Result<Json<Value>, Response> {
    match state.contact.submit(payload).await {
        Ok(data) => Ok(Json(json!({ "success": true, "data": data }))),
        Err(ContactError::MissingField(_)) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Name and Email are required.".to_string(),
            }),
        )
            .into_response()),
        Err(ContactError::Upstream { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let error = match serde_json::from_str::<Value>(&body) {
                Ok(value) => value,
                Err(_) => Value::String(body),
            };
            Err((status, Json(json!({ "error": error }))).into_response())
        }
        Err(ContactError::Http(error)) => {
            tracing::error!(%error, "Contact forward never reached Brevo");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "Failed to reach upstream service".to_string(),
                }),
            )
                .into_response())
        }
        Err(error) => {
            tracing::error!(%error, "Contact submission failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                }),
            )
                .into_response())
        }
    }
}
