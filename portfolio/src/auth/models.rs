//! Data models for administrator accounts and sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique administrator identifier (BIGSERIAL in Postgres).
pub type AdminId = i64;

/// Administrator row as stored, including the bcrypt hash.
///
/// Never serialized; the hash stays inside the auth layer. Convert to
/// [`Admin`] before handing the account to anything response-facing.
#[derive(Debug, Clone)]
pub struct AdminRecord {
    pub id: AdminId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Administrator account as exposed to callers. Carries no credential material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<AdminRecord> for Admin {
    fn from(record: AdminRecord) -> Self {
        Admin {
            id: record.id,
            username: record.username,
            email: record.email,
            role: record.role,
            created_at: record.created_at,
        }
    }
}

/// Fields required to insert a new administrator.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Registration request for a new administrator account.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Defaults to `"admin"` when absent.
    pub role: Option<String>,
}

/// Login request with plaintext credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Claims carried by a session token (JWT payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Administrator id
    pub sub: AdminId,
    pub username: String,
    pub role: String,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Claims carried by a password-reset token.
///
/// Distinct shape from [`SessionClaims`] so a reset token can never pass the
/// session gate: decoding it as session claims fails on the missing fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Outcome of inspecting a request's session token, if any.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No token, or a token that failed verification
    Anonymous,
    /// A valid, unexpired session token
    Authenticated(SessionClaims),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn claims(&self) -> Option<&SessionClaims> {
        match self {
            SessionState::Authenticated(claims) => Some(claims),
            SessionState::Anonymous => None,
        }
    }
}
