//! Data models for contact-form submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Incoming contact-form payload.
///
/// Every field is optional at the type level so that presence checks happen
/// in the service, which turns an absent `name` or `email` into a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    /// Client-supplied submission time; the server clock is used when absent.
    #[serde(rename = "timestamp")]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Fields required to persist a contact submission.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stored contact submission.
#[derive(Debug, Clone, Serialize)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}
