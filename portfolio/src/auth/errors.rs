//! Error types for administrator authentication.

use thiserror::Error;

/// Errors that can occur during authentication and credential management.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing or verification failed
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Token issuance or verification failed
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Username is already taken
    #[error("Username already exists")]
    DuplicateUsername,

    /// Email is already registered
    #[error("Email already exists")]
    DuplicateEmail,

    /// Unknown username or wrong password. Deliberately a single variant so
    /// callers cannot tell the two causes apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// New password fails the minimum length policy
    #[error("Password too short (min 8)")]
    WeakPassword,

    /// No administrator matches the given id or email
    #[error("Admin not found")]
    AdminNotFound,
}

impl AuthError {
    /// Returns a message safe to send to clients.
    ///
    /// Internal failures (database, hashing, token plumbing) are collapsed to
    /// generic text so connection strings and library internals never leak
    /// into responses.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::Hashing(_) => "Internal server error".to_string(),
            AuthError::Token(_) => "Unauthorized".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
