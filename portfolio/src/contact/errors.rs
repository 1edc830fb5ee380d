//! Error types for contact-form intake.

use thiserror::Error;

use crate::mailer::BrevoError;

/// Errors that can occur while handling a contact-form submission.
#[derive(Debug, Error)]
pub enum ContactError {
    /// A required field is absent or empty
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The upstream marketing API answered with a non-success status
    #[error("Upstream error: status {status}")]
    Upstream {
        status: u16,
        /// Raw upstream response body, JSON when the upstream sent JSON
        body: String,
    },

    /// The upstream marketing API could not be reached at all
    #[error("Upstream request failed: {0}")]
    Http(reqwest::Error),

    /// Mailer failure on our side, such as a misconfigured API key
    #[error("Mailer error: {0}")]
    Mailer(BrevoError),
}

impl From<BrevoError> for ContactError {
    fn from(error: BrevoError) -> Self {
        match error {
            BrevoError::Api { status, body } => ContactError::Upstream { status, body },
            BrevoError::Http(source) => ContactError::Http(source),
            other => ContactError::Mailer(other),
        }
    }
}

/// Result type for contact operations.
pub type ContactResult<T> = Result<T, ContactError>;
