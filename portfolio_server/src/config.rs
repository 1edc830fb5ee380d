//! Server configuration management.
//!
//! Configuration comes from environment variables with sensible defaults
//! everywhere except the two genuine secrets (`JWT_SECRET`, `BREVO_API_KEY`),
//! which are required and fail startup with a hint when absent.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;
use portfolio::db::DatabaseConfig;
use portfolio::mailer::{BrevoConfig, DEFAULT_BASE_URL};
use thiserror::Error;

const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_COOKIE_NAME: &str = "aid";
const DEFAULT_COOKIE_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_BEARER_TTL_SECS: i64 = 60 * 60;
const DEFAULT_RESET_TTL_MINS: i64 = 15;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {var}. {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// How session tokens travel between client and server.
///
/// One deployment uses exactly one transport; the extractor never falls back
/// to the other, so a cookie deployment ignores `Authorization` headers and
/// a bearer deployment ignores cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTransport {
    /// HttpOnly cookie, long-lived (7 days by default)
    Cookie,
    /// `Authorization: Bearer` header, short-lived (1 hour by default)
    Bearer,
}

impl FromStr for TokenTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cookie" => Ok(TokenTransport::Cookie),
            "bearer" => Ok(TokenTransport::Bearer),
            other => Err(format!("'{other}' is not a transport (expected 'cookie' or 'bearer')")),
        }
    }
}

impl fmt::Display for TokenTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenTransport::Cookie => write!(f, "cookie"),
            TokenTransport::Bearer => write!(f, "bearer"),
        }
    }
}

/// Session token policy: transport, cookie attributes, and lifetimes.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub transport: TokenTransport,
    /// Cookie name when the transport is [`TokenTransport::Cookie`]
    pub cookie_name: String,
    /// Sets the `Secure` attribute on issued cookies
    pub cookie_secure: bool,
    pub session_ttl: Duration,
    pub reset_ttl: Duration,
}

/// Secrets used for token signing.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub session: SessionConfig,
    pub brevo: BrevoConfig,
}

impl ServerConfig {
    /// Loads configuration from the environment.
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Takes precedence over `SERVER_BIND`
    /// * `database_url_override` - Takes precedence over `DATABASE_URL`
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingRequired`] when `JWT_SECRET` or `BREVO_API_KEY`
    /// is unset, [`ConfigError::Invalid`] when a value fails to parse.
    pub fn from_env(
        bind_override: Option<String>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind_str = bind_override
            .or_else(|| std::env::var("SERVER_BIND").ok())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_str.parse().map_err(|_| ConfigError::Invalid {
            var: "SERVER_BIND".to_string(),
            reason: format!("'{bind_str}' is not a valid socket address"),
        })?;

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database = database.with_url(url);
        }

        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: format!(
                "Set a random secret of at least {MIN_JWT_SECRET_LEN} characters, \
                 e.g. from: openssl rand -base64 48"
            ),
        })?;

        let transport = parse_env_or("SESSION_TRANSPORT", TokenTransport::Cookie)?;
        let default_ttl_secs = match transport {
            TokenTransport::Cookie => DEFAULT_COOKIE_TTL_SECS,
            TokenTransport::Bearer => DEFAULT_BEARER_TTL_SECS,
        };
        let session = SessionConfig {
            transport,
            cookie_name: env_or("SESSION_COOKIE_NAME", DEFAULT_COOKIE_NAME),
            cookie_secure: parse_env_or("SESSION_COOKIE_SECURE", false)?,
            session_ttl: Duration::seconds(parse_env_or("SESSION_TTL_SECS", default_ttl_secs)?),
            reset_ttl: Duration::minutes(parse_env_or(
                "RESET_TOKEN_TTL_MINS",
                DEFAULT_RESET_TTL_MINS,
            )?),
        };

        let brevo = BrevoConfig {
            api_key: std::env::var("BREVO_API_KEY").map_err(|_| ConfigError::MissingRequired {
                var: "BREVO_API_KEY".to_string(),
                hint: "Create an API key under 'SMTP & API' in the Brevo dashboard".to_string(),
            })?,
            base_url: env_or("BREVO_BASE_URL", DEFAULT_BASE_URL),
            sender_email: env_or("BREVO_SENDER_EMAIL", "no-reply@portfolio.local"),
            sender_name: env_or("BREVO_SENDER_NAME", "Portfolio Site"),
        };

        Ok(Self {
            bind,
            database,
            security: SecurityConfig { jwt_secret },
            session,
            brevo,
        })
    }

    /// Checks cross-field constraints that `from_env` cannot express.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the offending variable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: format!(
                    "must be at least {MIN_JWT_SECRET_LEN} characters, got {}",
                    self.security.jwt_secret.len()
                ),
            });
        }
        if self.session.cookie_name.is_empty() {
            return Err(ConfigError::Invalid {
                var: "SESSION_COOKIE_NAME".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.session.session_ttl <= Duration::zero() {
            return Err(ConfigError::Invalid {
                var: "SESSION_TTL_SECS".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.session.reset_ttl <= Duration::zero() {
            return Err(ConfigError::Invalid {
                var: "RESET_TOKEN_TTL_MINS".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.brevo.api_key.is_empty() {
            return Err(ConfigError::Invalid {
                var: "BREVO_API_KEY".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Token policy for constructing the auth service.
    pub fn auth_config(&self) -> portfolio::AuthConfig {
        portfolio::AuthConfig {
            jwt_secret: self.security.jwt_secret.clone(),
            session_ttl: self.session.session_ttl,
            reset_ttl: self.session.reset_ttl,
        }
    }
}

fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or<T: FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
            var: var.to_string(),
            reason: format!("could not parse '{value}'"),
        }),
        Err(_) => Ok(default),
    }
}
