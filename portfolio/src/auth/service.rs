//! Administrator authentication: registration, login, stateless JWT
//! sessions, password changes, and password-reset tokens.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{info, warn};

use super::errors::{AuthError, AuthResult};
use super::models::{
    Admin, AdminId, AdminRecord, LoginRequest, NewAdmin, RegisterRequest, ResetClaims,
    SessionClaims, SessionState,
};
use crate::db::store::CredentialStore;

/// bcrypt cost factor for registration-time hashes.
pub const REGISTER_COST: u32 = 10;

/// bcrypt cost factor when a password is changed. Deliberately higher than
/// [`REGISTER_COST`]: changed passwords are long-lived credentials.
pub const CHANGE_COST: u32 = 12;

/// Minimum length accepted for a new password on change.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Role assigned when registration does not specify one.
pub const DEFAULT_ROLE: &str = "admin";

/// Hashes a password with bcrypt at the given cost.
///
/// Exposed so seeding tools hash exactly the way [`AuthService::register`]
/// does.
pub fn hash_password(password: &str, cost: u32) -> AuthResult<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Token and hashing policy for [`AuthService`].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing JWTs
    pub jwt_secret: String,
    /// Lifetime of session tokens
    pub session_ttl: Duration,
    /// Lifetime of password-reset tokens
    pub reset_ttl: Duration,
}

/// Service for administrator account and session management.
///
/// Sessions are stateless JWTs: nothing is recorded server-side at login and
/// nothing can be revoked before expiry. Logout is therefore purely a client
/// concern (dropping the token or clearing the cookie); the short session
/// lifetimes are what bound the exposure window.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    jwt_secret: String,
    session_ttl: Duration,
    reset_ttl: Duration,
}

impl AuthService {
    /// Creates a service over the given credential store.
    pub fn new(store: Arc<dyn CredentialStore>, config: AuthConfig) -> Self {
        Self {
            store,
            jwt_secret: config.jwt_secret,
            session_ttl: config.session_ttl,
            reset_ttl: config.reset_ttl,
        }
    }

    /// Registers a new administrator.
    ///
    /// The password is hashed with bcrypt at [`REGISTER_COST`]; the plaintext
    /// is never stored. The role defaults to [`DEFAULT_ROLE`] when absent.
    ///
    /// # Arguments
    ///
    /// * `request` - Desired username, email, plaintext password, and role
    ///
    /// # Returns
    ///
    /// The stored account, without credential material.
    ///
    /// # Errors
    ///
    /// * [`AuthError::DuplicateUsername`] - Username already taken
    /// * [`AuthError::DuplicateEmail`] - Email already registered
    /// * [`AuthError::Database`] - Store operation failed
    /// * [`AuthError::Hashing`] - bcrypt failed
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<Admin> {
        if self.store.find_by_username(&request.username).await?.is_some() {
            return Err(AuthError::DuplicateUsername);
        }
        if self.store.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_password(&request.password, REGISTER_COST)?;
        let record = self
            .store
            .create(NewAdmin {
                username: request.username,
                email: request.email,
                password_hash,
                role: request.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            })
            .await?;

        info!(username = %record.username, id = record.id, "Administrator registered");
        Ok(record.into())
    }

    /// Authenticates an administrator and issues a session token.
    ///
    /// Unknown usernames and wrong passwords both map to
    /// [`AuthError::InvalidCredentials`], so a caller probing the endpoint
    /// cannot enumerate accounts.
    ///
    /// # Returns
    ///
    /// The account and a signed session JWT carrying id, username, and role.
    ///
    /// # Errors
    ///
    /// * [`AuthError::InvalidCredentials`] - Unknown username or wrong password
    /// * [`AuthError::Database`] - Store operation failed
    /// * [`AuthError::Hashing`] - Stored hash is malformed
    /// * [`AuthError::Token`] - Token could not be signed
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(Admin, String)> {
        let Some(record) = self.store.find_by_username(&request.username).await? else {
            warn!(username = %request.username, "Login attempt for unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !bcrypt::verify(&request.password, &record.password_hash)? {
            warn!(username = %request.username, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_session_token(&record)?;
        info!(username = %record.username, id = record.id, "Administrator logged in");
        Ok((record.into(), token))
    }

    /// Verifies a session token's signature and expiry.
    ///
    /// # Errors
    ///
    /// [`AuthError::Token`] for anything that is not a valid, unexpired
    /// session JWT signed with our secret. Reset tokens fail here too since
    /// their claims lack the session fields.
    pub fn verify_session(&self, token: &str) -> AuthResult<SessionClaims> {
        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    /// Inspects an optional request token without ever failing.
    ///
    /// Absent, malformed, tampered, and expired tokens all collapse to
    /// [`SessionState::Anonymous`].
    pub fn session_state(&self, token: Option<&str>) -> SessionState {
        match token.and_then(|t| self.verify_session(t).ok()) {
            Some(claims) => SessionState::Authenticated(claims),
            None => SessionState::Anonymous,
        }
    }

    /// Changes an administrator's password after re-verifying the current one.
    ///
    /// The new password is hashed at [`CHANGE_COST`]. Outstanding session
    /// tokens stay valid; nothing is revoked.
    ///
    /// # Arguments
    ///
    /// * `admin_id` - Account from the caller's verified session claims
    /// * `current_password` - Must match the stored hash
    /// * `new_password` - Must be at least [`MIN_PASSWORD_LEN`] bytes
    ///
    /// # Errors
    ///
    /// * [`AuthError::WeakPassword`] - New password shorter than the minimum,
    ///   checked before anything else
    /// * [`AuthError::AdminNotFound`] - Account no longer exists
    /// * [`AuthError::InvalidCredentials`] - Current password wrong
    /// * [`AuthError::Database`] / [`AuthError::Hashing`] - Internal failure
    pub async fn change_password(
        &self,
        admin_id: AdminId,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let Some(record) = self.store.find_by_id(admin_id).await? else {
            return Err(AuthError::AdminNotFound);
        };

        if !bcrypt::verify(current_password, &record.password_hash)? {
            warn!(id = admin_id, "Password change with wrong current password");
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = hash_password(new_password, CHANGE_COST)?;
        self.store.update_password_hash(admin_id, &password_hash).await?;

        info!(id = admin_id, "Administrator password changed");
        Ok(())
    }

    /// Issues a password-reset token for the account with the given email.
    ///
    /// The token is a short-lived JWT bound to the email; delivering it to
    /// the admin (by email) is the caller's job. Issuance proves nothing by
    /// itself and consumes nothing: tokens simply expire.
    ///
    /// # Errors
    ///
    /// * [`AuthError::AdminNotFound`] - No account with that email
    /// * [`AuthError::Database`] - Store operation failed
    /// * [`AuthError::Token`] - Token could not be signed
    pub async fn forgot_password(&self, email: &str) -> AuthResult<String> {
        let Some(record) = self.store.find_by_email(email).await? else {
            return Err(AuthError::AdminNotFound);
        };

        let token = self.issue_reset_token(&record.email)?;
        info!(id = record.id, "Password reset token issued");
        Ok(token)
    }

    fn issue_session_token(&self, record: &AdminRecord) -> AuthResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: record.id,
            username: record.username.clone(),
            role: record.role.clone(),
            iat: now.timestamp(),
            exp: (now + self.session_ttl).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }

    fn issue_reset_token(&self, email: &str) -> AuthResult<String> {
        let now = Utc::now();
        let claims = ResetClaims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.reset_ttl).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::db::store::memory::MemoryCredentialStore;

    const TEST_SECRET: &str = "unit-test-secret-0123456789abcdef0123456789abcdef";

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            session_ttl: Duration::days(7),
            reset_ttl: Duration::minutes(15),
        }
    }

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryCredentialStore::new()), test_config())
    }

    fn register_request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "correct horse battery staple".to_string(),
            role: None,
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    #[tokio::test]
    async fn register_hashes_at_cost_ten_and_defaults_role() {
        let store = Arc::new(MemoryCredentialStore::new());
        let service = AuthService::new(store.clone(), test_config());

        let admin = service.register(register_request("alice")).await.unwrap();
        assert_eq!(admin.role, "admin");

        let record = store.find_by_id(admin.id).await.unwrap().unwrap();
        assert!(record.password_hash.starts_with("$2b$10$"));
        assert_ne!(record.password_hash, "correct horse battery staple");
    }

    #[tokio::test]
    async fn register_honors_explicit_role() {
        let service = service();
        let admin = service
            .register(RegisterRequest {
                role: Some("editor".to_string()),
                ..register_request("alice")
            })
            .await
            .unwrap();
        assert_eq!(admin.role, "editor");
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let service = service();
        service.register(register_request("alice")).await.unwrap();

        let result = service
            .register(RegisterRequest {
                email: "other@example.com".to_string(),
                ..register_request("alice")
            })
            .await;
        assert!(matches!(result, Err(AuthError::DuplicateUsername)));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let service = service();
        service.register(register_request("alice")).await.unwrap();

        let result = service
            .register(RegisterRequest {
                username: "alice2".to_string(),
                ..register_request("alice")
            })
            .await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail)));
    }

    // ========================================================================
    // Login and session verification
    // ========================================================================

    #[tokio::test]
    async fn login_issues_verifiable_token_with_session_ttl() {
        let service = service();
        let admin = service.register(register_request("alice")).await.unwrap();

        let (logged_in, token) = service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "correct horse battery staple".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, admin.id);

        let claims = service.verify_session(&token).unwrap();
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, Duration::days(7).num_seconds());
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let service = service();
        service.register(register_request("alice")).await.unwrap();

        let unknown = service
            .login(LoginRequest {
                username: "nobody".to_string(),
                password: "correct horse battery staple".to_string(),
            })
            .await
            .unwrap_err();
        let wrong_password = service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "not the password".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert_eq!(unknown.client_message(), wrong_password.client_message());
    }

    #[tokio::test]
    async fn verify_session_rejects_tampered_tokens() {
        let service = service();
        service.register(register_request("alice")).await.unwrap();
        let (_, token) = service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "correct horse battery staple".to_string(),
            })
            .await
            .unwrap();

        let tampered = format!("{token}x");
        assert!(service.verify_session(&tampered).is_err());
        assert!(!service.session_state(Some(&tampered)).is_authenticated());
    }

    #[tokio::test]
    async fn session_state_treats_expired_tokens_as_anonymous() {
        let store = Arc::new(MemoryCredentialStore::new());
        let service = AuthService::new(store.clone(), test_config());
        service.register(register_request("alice")).await.unwrap();

        // Same secret, but tokens are born two hours expired, well past the
        // verifier's leeway.
        let expired_issuer = AuthService::new(
            store,
            AuthConfig {
                session_ttl: Duration::hours(-2),
                ..test_config()
            },
        );
        let (_, token) = expired_issuer
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "correct horse battery staple".to_string(),
            })
            .await
            .unwrap();

        assert!(service.verify_session(&token).is_err());
        assert!(!service.session_state(Some(&token)).is_authenticated());
    }

    #[tokio::test]
    async fn session_state_without_token_is_anonymous() {
        let service = service();
        assert!(!service.session_state(None).is_authenticated());
        assert!(service.session_state(None).claims().is_none());
    }

    #[tokio::test]
    async fn verify_session_rejects_reset_tokens() {
        let service = service();
        service.register(register_request("alice")).await.unwrap();

        let reset_token = service.forgot_password("alice@example.com").await.unwrap();
        assert!(service.verify_session(&reset_token).is_err());
        assert!(!service.session_state(Some(&reset_token)).is_authenticated());
    }

    // ========================================================================
    // Password change
    // ========================================================================

    #[tokio::test]
    async fn change_password_enforces_minimum_length_first() {
        let service = service();
        let admin = service.register(register_request("alice")).await.unwrap();

        // Too short fails even though the current password is also wrong;
        // the length check runs before verification.
        let result = service.change_password(admin.id, "whatever", "short").await;
        assert!(matches!(result, Err(AuthError::WeakPassword)));
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let service = service();
        let admin = service.register(register_request("alice")).await.unwrap();

        let result = service
            .change_password(admin.id, "not the password", "a new long password")
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn change_password_fails_for_missing_account() {
        let service = service();
        let result = service
            .change_password(9999, "whatever", "a new long password")
            .await;
        assert!(matches!(result, Err(AuthError::AdminNotFound)));
    }

    #[tokio::test]
    async fn change_password_rehashes_at_cost_twelve_and_keeps_tokens_valid() {
        let store = Arc::new(MemoryCredentialStore::new());
        let service = AuthService::new(store.clone(), test_config());
        let admin = service.register(register_request("alice")).await.unwrap();
        let (_, old_token) = service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "correct horse battery staple".to_string(),
            })
            .await
            .unwrap();

        service
            .change_password(admin.id, "correct horse battery staple", "a brand new password")
            .await
            .unwrap();

        let record = store.find_by_id(admin.id).await.unwrap().unwrap();
        assert!(record.password_hash.starts_with("$2b$12$"));

        // Old credential is dead, new one works.
        let old_login = service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "correct horse battery staple".to_string(),
            })
            .await;
        assert!(matches!(old_login, Err(AuthError::InvalidCredentials)));
        service
            .login(LoginRequest {
                username: "alice".to_string(),
                password: "a brand new password".to_string(),
            })
            .await
            .unwrap();

        // Stateless sessions: the pre-change token still verifies.
        assert!(service.verify_session(&old_token).is_ok());
    }

    // ========================================================================
    // Password reset tokens
    // ========================================================================

    #[tokio::test]
    async fn forgot_password_requires_known_email() {
        let service = service();
        let result = service.forgot_password("nobody@example.com").await;
        assert!(matches!(result, Err(AuthError::AdminNotFound)));
    }

    #[tokio::test]
    async fn forgot_password_tokens_carry_email_and_reset_ttl() {
        let service = service();
        service.register(register_request("alice")).await.unwrap();

        let token = service.forgot_password("alice@example.com").await.unwrap();
        let data = decode::<ResetClaims>(
            &token,
            &DecodingKey::from_secret(TEST_SECRET.as_bytes()),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(data.claims.email, "alice@example.com");
        assert_eq!(
            data.claims.exp - data.claims.iat,
            Duration::minutes(15).num_seconds()
        );
    }

    // ========================================================================
    // Token roundtrip property
    // ========================================================================

    proptest! {
        #[test]
        fn issued_session_tokens_always_roundtrip(
            id in 1i64..1_000_000,
            username in "[a-zA-Z0-9_]{3,20}",
        ) {
            let service = service();
            let record = AdminRecord {
                id,
                username: username.clone(),
                email: format!("{username}@example.com"),
                password_hash: String::new(),
                role: "admin".to_string(),
                created_at: Utc::now(),
            };

            let token = service.issue_session_token(&record).unwrap();
            let claims = service.verify_session(&token).unwrap();
            prop_assert_eq!(claims.sub, id);
            prop_assert_eq!(claims.username, username);
        }
    }
}
