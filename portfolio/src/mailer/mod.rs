//! HTTP client for the Brevo marketing API.
//!
//! Two calls are used: contact upsert (`POST /v3/contacts`) for contact-form
//! submissions, and transactional email (`POST /v3/smtp/email`) for password
//! resets. The base URL is configurable so tests can point the client at a
//! local stub server.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use thiserror::Error;

/// Production Brevo endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.brevo.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from talking to the Brevo API.
#[derive(Debug, Error)]
pub enum BrevoError {
    /// The request never produced a response (connect failure, timeout, ...)
    #[error("Brevo request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Brevo answered with a non-success status
    #[error("Brevo API error: status {status}")]
    Api { status: u16, body: String },

    /// The configured API key cannot be sent as an HTTP header
    #[error("Brevo API key is not a valid header value")]
    InvalidApiKey,
}

/// Settings for constructing a [`BrevoClient`].
#[derive(Debug, Clone)]
pub struct BrevoConfig {
    pub api_key: String,
    pub base_url: String,
    /// From-address for transactional mail
    pub sender_email: String,
    /// From-name for transactional mail
    pub sender_name: String,
}

/// Client for the Brevo REST API.
///
/// Cheap to clone: `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct BrevoClient {
    client: reqwest::Client,
    base_url: String,
    sender_email: String,
    sender_name: String,
}

impl BrevoClient {
    /// Builds a client with the API key baked into default headers.
    ///
    /// # Errors
    ///
    /// Returns [`BrevoError::InvalidApiKey`] when the key contains bytes that
    /// cannot appear in a header, and [`BrevoError::Http`] when the
    /// underlying client fails to build.
    pub fn new(config: &BrevoConfig) -> Result<Self, BrevoError> {
        let mut api_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| BrevoError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("api-key", api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sender_email: config.sender_email.clone(),
            sender_name: config.sender_name.clone(),
        })
    }

    /// Creates or updates a Brevo contact from a contact-form submission.
    ///
    /// Returns the upstream response body on success. Brevo replies `201`
    /// with a body on create and `204` without one on update; the latter
    /// surfaces as [`Value::Null`].
    ///
    /// # Errors
    ///
    /// [`BrevoError::Api`] carries the upstream status and raw body for any
    /// non-success answer so callers can propagate both.
    pub async fn upsert_contact(
        &self,
        email: &str,
        name: &str,
        phone: Option<&str>,
        message: Option<&str>,
    ) -> Result<Value, BrevoError> {
        let payload = contact_payload(email, name, phone, message);
        let response = self
            .client
            .post(format!("{}/v3/contacts", self.base_url))
            .json(&payload)
            .send()
            .await?;

        read_json(response).await
    }

    /// Sends a password-reset email carrying the given reset code.
    ///
    /// # Errors
    ///
    /// Same surface as [`BrevoClient::upsert_contact`].
    pub async fn send_password_reset(
        &self,
        to_email: &str,
        reset_token: &str,
    ) -> Result<(), BrevoError> {
        let payload = reset_email_payload(
            &self.sender_name,
            &self.sender_email,
            to_email,
            reset_token,
        );
        let response = self
            .client
            .post(format!("{}/v3/smtp/email", self.base_url))
            .json(&payload)
            .send()
            .await?;

        read_json(response).await.map(|_| ())
    }
}

/// Collapses a response into its JSON body or an [`BrevoError::Api`].
async fn read_json(response: reqwest::Response) -> Result<Value, BrevoError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        if body.is_empty() {
            return Ok(Value::Null);
        }
        // Non-JSON success bodies are rare but possible; keep them as text.
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(body)),
        }
    } else {
        Err(BrevoError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

/// Body for `POST /v3/contacts`. Optional attributes are omitted, not null.
fn contact_payload(email: &str, name: &str, phone: Option<&str>, message: Option<&str>) -> Value {
    let mut attributes = serde_json::Map::new();
    attributes.insert("NAME".to_string(), json!(name));
    if let Some(phone) = phone {
        attributes.insert("PHONE".to_string(), json!(phone));
    }
    if let Some(message) = message {
        attributes.insert("MESSAGE".to_string(), json!(message));
    }

    json!({
        "email": email,
        "attributes": attributes,
        "updateEnabled": true,
    })
}

/// Body for `POST /v3/smtp/email`.
fn reset_email_payload(sender_name: &str, sender_email: &str, to_email: &str, token: &str) -> Value {
    json!({
        "sender": { "name": sender_name, "email": sender_email },
        "to": [ { "email": to_email } ],
        "subject": "Password reset",
        "htmlContent": format!(
            "<p>Use this code to reset your password: <strong>{token}</strong></p>\
             <p>If you did not request a reset, you can ignore this email.</p>"
        ),
    })
}
