//! Authorization gate for protected routes.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use super::{AppState, ErrorResponse, session};
use crate::logging::log_security_event;

/// Rejects requests that do not carry a valid session token.
///
/// The token is read via the configured transport only, verified against
/// the signing secret, and its claims stashed in request extensions for the
/// handler. Everything else - no token, wrong transport, bad signature,
/// expired - gets the same `401 {"error": "Unauthorized"}`.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let token = session::extract_token(request.headers(), &state.session);

    match token.and_then(|t| state.auth.verify_session(&t).ok()) {
        Some(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        None => {
            log_security_event(
                "unauthorized_request",
                None,
                &format!("Rejected {} {}", request.method(), request.uri().path()),
            );
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Unauthorized".to_string(),
                }),
            ))
        }
    }
}
