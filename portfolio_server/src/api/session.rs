//! Session token transport.
//!
//! A deployment carries its session JWT in exactly one place, per
//! [`TokenTransport`]: an HttpOnly cookie or an `Authorization: Bearer`
//! header. Extraction honors only the configured transport; there is no
//! cross-fallback, so tokens sent the wrong way are simply invisible.

use axum::http::{HeaderMap, header};
use cookie::{Cookie, SameSite};

use crate::config::{SessionConfig, TokenTransport};

/// Renders the `Set-Cookie` value that establishes a session.
///
/// HttpOnly keeps the token away from page scripts, `SameSite=Lax` blocks
/// cross-site POSTs from carrying it, and `Path=/` scopes it to the whole
/// API. `Secure` is added when the deployment says it terminates TLS.
pub fn session_cookie(config: &SessionConfig, token: &str) -> String {
    Cookie::build((config.cookie_name.clone(), token.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.cookie_secure)
        .max_age(cookie::time::Duration::seconds(config.session_ttl.num_seconds()))
        .build()
        .to_string()
}

/// Renders the `Set-Cookie` value that clears the session cookie on logout.
///
/// Attributes must match the ones used at issue time or browsers treat it
/// as a different cookie and keep the original.
pub fn clearing_cookie(config: &SessionConfig) -> String {
    Cookie::build((config.cookie_name.clone(), String::new()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(config.cookie_secure)
        .max_age(cookie::time::Duration::ZERO)
        .build()
        .to_string()
}

/// Pulls the session token out of a request, per the configured transport.
pub fn extract_token(headers: &HeaderMap, config: &SessionConfig) -> Option<String> {
    match config.transport {
        TokenTransport::Bearer => bearer_token(headers),
        TokenTransport::Cookie => cookie_token(headers, &config.cookie_name),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for cookie in Cookie::split_parse(raw).flatten() {
            if cookie.name() == cookie_name {
                return Some(cookie.value().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::Duration;

    use super::*;

    fn session_config(transport: TokenTransport) -> SessionConfig {
        SessionConfig {
            transport,
            cookie_name: "aid".to_string(),
            cookie_secure: false,
            session_ttl: Duration::days(7),
            reset_ttl: Duration::minutes(15),
        }
    }

    #[test]
    fn session_cookie_sets_hardening_attributes() {
        let rendered = session_cookie(&session_config(TokenTransport::Cookie), "tok123");

        assert!(rendered.starts_with("aid=tok123"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=604800"));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn session_cookie_adds_secure_when_configured() {
        let mut config = session_config(TokenTransport::Cookie);
        config.cookie_secure = true;

        assert!(session_cookie(&config, "tok123").contains("Secure"));
    }

    #[test]
    fn clearing_cookie_expires_immediately() {
        let rendered = clearing_cookie(&session_config(TokenTransport::Cookie));

        assert!(rendered.starts_with("aid="));
        assert!(rendered.contains("Max-Age=0"));
        assert!(rendered.contains("HttpOnly"));
    }

    #[test]
    fn cookie_transport_reads_only_the_named_cookie() {
        let config = session_config(TokenTransport::Cookie);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; aid=tok123; lang=en"),
        );

        assert_eq!(extract_token(&headers, &config), Some("tok123".to_string()));

        let mut other = HeaderMap::new();
        other.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(extract_token(&other, &config), None);
    }

    #[test]
    fn cookie_transport_ignores_authorization_headers() {
        let config = session_config(TokenTransport::Cookie);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok123"),
        );

        assert_eq!(extract_token(&headers, &config), None);
    }

    #[test]
    fn bearer_transport_requires_the_bearer_prefix() {
        let config = session_config(TokenTransport::Bearer);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok123"),
        );
        assert_eq!(extract_token(&headers, &config), Some("tok123".to_string()));

        let mut wrong_scheme = HeaderMap::new();
        wrong_scheme.insert(header::AUTHORIZATION, HeaderValue::from_static("Token tok123"));
        assert_eq!(extract_token(&wrong_scheme, &config), None);

        let mut empty = HeaderMap::new();
        empty.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_token(&empty, &config), None);
    }

    #[test]
    fn bearer_transport_ignores_cookies() {
        let config = session_config(TokenTransport::Bearer);
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("aid=tok123"));

        assert_eq!(extract_token(&headers, &config), None);
    }
}
