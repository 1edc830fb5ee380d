//! Authentication endpoints.
//!
//! Quick smoke test against a local server:
//!
//! ```text
//! curl -X POST localhost:5000/api/auth/login \
//!   -H 'content-type: application/json' \
//!   -d '{"username": "admin", "password": "hunter22hunter22"}' -i
//! ```
//!
//! With the cookie transport the token rides an HttpOnly `Set-Cookie`; with
//! the bearer transport it comes back in the JSON body instead.

use axum::{
    Json,
    extract::{Extension, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use portfolio::auth::{
    AuthError, LoginRequest, RegisterRequest, SessionClaims, SessionState,
};
use portfolio::mailer::BrevoError;
use serde::{Deserialize, Serialize};

use super::{AppState, ErrorResponse, session};
use crate::config::TokenTransport;
use crate::logging::log_security_event;

// ============================================================================
// Payloads and responses
// ============================================================================

/// Fields are optional so absence maps to our 400, not a deserialize error.
#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordPayload {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub username: String,
    /// Present only with the bearer transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /api/auth/register` - create an administrator account.
///
/// # Request
///
/// ```json
/// {"username": "admin", "email": "admin@example.com", "password": "...", "role": "admin"}
/// ```
///
/// `role` is optional and defaults to `admin`.
///
/// # Responses
///
/// * `201` - `{"message": "Administrator created"}`
/// * `400` - a required field is missing or empty
/// * `409` - username or email already taken
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, Json<ErrorResponse>)> {
    let (Some(username), Some(email), Some(password)) = (
        present(payload.username),
        present(payload.email),
        present(payload.password),
    ) else {
        return Err(bad_request("Missing fields"));
    };

    state
        .auth
        .register(RegisterRequest {
            username,
            email,
            password,
            role: payload.role,
        })
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Administrator created".to_string(),
        }),
    ))
}

/// `POST /api/auth/login` - verify credentials and issue a session token.
///
/// # Responses
///
/// * `200` - `{"ok": true, "username": "..."}` plus a `Set-Cookie` header
///   (cookie transport), or `{"ok": true, "username": "...", "token": "..."}`
///   (bearer transport)
/// * `400` - `{"error": "Missing credentials"}`
/// * `401` - `{"error": "Invalid credentials"}`, identical for unknown
///   username and wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let (Some(username), Some(password)) =
        (present(payload.username), present(payload.password))
    else {
        return Err(bad_request("Missing credentials"));
    };

    let (admin, token) = state
        .auth
        .login(LoginRequest {
            username: username.clone(),
            password,
        })
        .await
        .map_err(|error| {
            if matches!(error, AuthError::InvalidCredentials) {
                log_security_event("login_failed", Some(&username), "Invalid credentials");
            }
            error_response(error)
        })?;

    let response = match state.session.transport {
        TokenTransport::Cookie => (
            [(header::SET_COOKIE, session::session_cookie(&state.session, &token))],
            Json(LoginResponse {
                ok: true,
                username: admin.username,
                token: None,
            }),
        )
            .into_response(),
        TokenTransport::Bearer => Json(LoginResponse {
            ok: true,
            username: admin.username,
            token: Some(token),
        })
        .into_response(),
    };
    Ok(response)
}

/// `POST /api/auth/logout` - end the session on the client.
///
/// Sessions are stateless JWTs, so there is nothing to revoke server-side:
/// the cookie transport answers with a clearing `Set-Cookie`, the bearer
/// transport just acknowledges and the client drops its token. Either way
/// an already-issued token remains valid until it expires.
pub async fn logout(State(state): State<AppState>) -> Response {
    match state.session.transport {
        TokenTransport::Cookie => (
            [(header::SET_COOKIE, session::clearing_cookie(&state.session))],
            Json(OkResponse { ok: true }),
        )
            .into_response(),
        TokenTransport::Bearer => Json(OkResponse { ok: true }).into_response(),
    }
}

/// `GET /api/auth/me` - report who the caller is.
///
/// Never fails: a missing, malformed, or expired token is an answer
/// (`{"authenticated": false}`), not an error. Frontends poll this on load
/// to decide whether to show the admin UI.
///
/// # Response
///
/// ```json
/// {"authenticated": true, "user": {"id": 1, "username": "admin", "role": "admin"}}
/// ```
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Json<MeResponse> {
    let token = session::extract_token(&headers, &state.session);

    match state.auth.session_state(token.as_deref()) {
        SessionState::Authenticated(claims) => Json(MeResponse {
            authenticated: true,
            user: Some(SessionUser {
                id: claims.sub,
                username: claims.username,
                role: claims.role,
            }),
        }),
        SessionState::Anonymous => Json(MeResponse {
            authenticated: false,
            user: None,
        }),
    }
}

/// `POST /api/auth/change-password` - rotate the caller's password.
///
/// Protected: the gate has already verified the session and stashed its
/// claims. The current password is re-verified even so, which bounds what a
/// stolen token alone can do.
///
/// # Responses
///
/// * `200` - `{"ok": true}`
/// * `400` - missing fields, or new password under 8 characters
/// * `401` - `{"error": "Current password incorrect"}`
/// * `404` - the account behind the token no longer exists
pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<Json<OkResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (Some(current), Some(new)) = (
        present(payload.current_password),
        present(payload.new_password),
    ) else {
        return Err(bad_request("Missing fields"));
    };

    state
        .auth
        .change_password(claims.sub, &current, &new)
        .await
        .map_err(|error| match error {
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Current password incorrect".to_string(),
                }),
            ),
            other => error_response(other),
        })?;

    Ok(Json(OkResponse { ok: true }))
}

/// `POST /api/auth/forgot-password` - email a short-lived reset token.
///
/// # Responses
///
/// * `200` - `{"message": "Password reset email sent"}`
/// * `400` - `{"error": "Email is required"}`
/// * `404` - no account with that email
/// * upstream status (fallback `502`) - Brevo refused or was unreachable
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(email) = present(payload.email) else {
        return Err(bad_request("Email is required"));
    };

    let token = state
        .auth
        .forgot_password(&email)
        .await
        .map_err(error_response)?;

    state
        .mailer
        .send_password_reset(&email, &token)
        .await
        .map_err(|error| {
            tracing::error!(%error, "Password reset email failed");
            let status = match error {
                BrevoError::Api { status, .. } => {
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                BrevoError::Http(_) | BrevoError::InvalidApiKey => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                Json(ErrorResponse {
                    error: "Failed to send reset email".to_string(),
                }),
            )
        })?;

    Ok(Json(MessageResponse {
        message: "Password reset email sent".to_string(),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Treats empty strings like absent fields, as the frontend sends both.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Maps service errors to HTTP statuses with client-safe messages.
fn error_response(error: AuthError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        AuthError::DuplicateUsername | AuthError::DuplicateEmail => StatusCode::CONFLICT,
        AuthError::WeakPassword => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials | AuthError::Token(_) => StatusCode::UNAUTHORIZED,
        AuthError::AdminNotFound => StatusCode::NOT_FOUND,
        AuthError::Database(_) | AuthError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.client_message(),
        }),
    )
}
