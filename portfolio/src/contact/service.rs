//! Contact-form intake.
//!
//! Submissions are validated, persisted, and forwarded to Brevo, in that
//! order. Persistence is best-effort: a database failure is logged and the
//! forward still happens, because losing the marketing-list entry is worse
//! for the site owner than losing the local copy.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use super::errors::{ContactError, ContactResult};
use super::models::{NewContact, SubmitContactRequest};
use crate::db::store::ContactStore;
use crate::mailer::BrevoClient;

/// Service handling contact-form submissions.
#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
    brevo: BrevoClient,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>, brevo: BrevoClient) -> Self {
        Self { store, brevo }
    }

    /// Processes one contact-form submission.
    ///
    /// Validates that `name` and `email` are present and non-empty, stores
    /// the submission (best-effort), then upserts the visitor as a Brevo
    /// contact. The stored timestamp is the client-supplied one when given,
    /// otherwise the server clock.
    ///
    /// # Returns
    ///
    /// The upstream response body, which the API layer echoes to the client.
    ///
    /// # Errors
    ///
    /// * [`ContactError::MissingField`] - `name` or `email` absent or empty
    /// * [`ContactError::Upstream`] - Brevo answered with a non-success
    ///   status; carries that status and body
    /// * [`ContactError::Http`] - Brevo could not be reached
    ///
    /// Database failures are logged, never returned.
    pub async fn submit(&self, request: SubmitContactRequest) -> ContactResult<Value> {
        let name = require(&request.name, "name")?;
        let email = require(&request.email, "email")?;

        let created_at = request.submitted_at.unwrap_or_else(Utc::now);
        let insert = self
            .store
            .insert(NewContact {
                name: name.clone(),
                email: email.clone(),
                phone: request.phone.clone(),
                message: request.message.clone(),
                created_at,
            })
            .await;
        match insert {
            Ok(stored) => debug!(id = stored.id, "Contact submission stored"),
            Err(error) => {
                warn!(%error, "Failed to store contact submission, forwarding anyway");
            }
        }

        let data = self
            .brevo
            .upsert_contact(
                &email,
                &name,
                request.phone.as_deref(),
                request.message.as_deref(),
            )
            .await?;

        debug!("Contact forwarded to Brevo");
        Ok(data)
    }
}

fn require(field: &Option<String>, name: &'static str) -> ContactResult<String> {
    match field {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(ContactError::MissingField(name)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::db::store::memory::MemoryContactStore;
    use crate::mailer::{BrevoClient, BrevoConfig};

    /// Client aimed at a port nothing listens on; any send fails fast with a
    /// connect error, which is enough to observe ordering in these tests.
    fn unreachable_brevo() -> BrevoClient {
        BrevoClient::new(&BrevoConfig {
            api_key: "xkeysib-test".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            sender_email: "no-reply@example.com".to_string(),
            sender_name: "Portfolio".to_string(),
        })
        .unwrap()
    }

    fn request(name: Option<&str>, email: Option<&str>) -> SubmitContactRequest {
        SubmitContactRequest {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            phone: None,
            message: Some("Hello".to_string()),
            submitted_at: None,
        }
    }

    #[tokio::test]
    async fn submit_rejects_missing_name_before_any_side_effect() {
        let store = Arc::new(MemoryContactStore::new());
        let service = ContactService::new(store.clone(), unreachable_brevo());

        let result = service.submit(request(None, Some("jane@example.com"))).await;
        assert!(matches!(result, Err(ContactError::MissingField("name"))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn submit_treats_empty_email_as_missing() {
        let store = Arc::new(MemoryContactStore::new());
        let service = ContactService::new(store.clone(), unreachable_brevo());

        let result = service.submit(request(Some("Jane"), Some(""))).await;
        assert!(matches!(result, Err(ContactError::MissingField("email"))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn submit_persists_before_forwarding_and_honors_client_timestamp() {
        let store = Arc::new(MemoryContactStore::new());
        let service = ContactService::new(store.clone(), unreachable_brevo());

        let submitted_at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let result = service
            .submit(SubmitContactRequest {
                submitted_at: Some(submitted_at),
                ..request(Some("Jane"), Some("jane@example.com"))
            })
            .await;

        // The forward fails (nothing is listening), but the row is already in.
        assert!(matches!(result, Err(ContactError::Http(_))));
        let stored = store.submissions();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].created_at, submitted_at);
    }

    #[tokio::test]
    async fn submit_forwards_even_when_the_store_fails() {
        let store = Arc::new(MemoryContactStore::new());
        store.set_failing(true);
        let service = ContactService::new(store.clone(), unreachable_brevo());

        let result = service.submit(request(Some("Jane"), Some("jane@example.com"))).await;

        // A database error never surfaces; the error we see is the forward
        // attempt, proving the service pressed on past the failed insert.
        assert!(matches!(result, Err(ContactError::Http(_))));
        assert!(store.is_empty());
    }
}
