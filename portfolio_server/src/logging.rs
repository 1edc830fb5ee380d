//! Structured logging setup and helpers.

use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` controls the filter; the default keeps our crates at `info`
/// while quieting the chattier dependencies. Call once at startup.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    tracing::info!("Structured logging initialized");
}

/// Logs a security-relevant event in one greppable shape.
///
/// Used for failed logins and rejected protected-route requests, so an
/// operator can scan for `SECURITY:` lines.
pub fn log_security_event(event_type: &str, username: Option<&str>, message: &str) {
    warn!(
        event_type,
        username = username.unwrap_or("-"),
        "SECURITY: {message}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_events_do_not_panic() {
        log_security_event("login_failed", Some("alice"), "Invalid credentials");
        log_security_event("unauthorized", None, "No valid session token");
    }
}
