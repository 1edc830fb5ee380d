//! Administrator authentication and session management.

pub mod errors;
pub mod models;
pub mod service;

pub use errors::{AuthError, AuthResult};
pub use models::{
    Admin, AdminId, AdminRecord, LoginRequest, NewAdmin, RegisterRequest, ResetClaims,
    SessionClaims, SessionState,
};
pub use service::{
    AuthConfig, AuthService, CHANGE_COST, DEFAULT_ROLE, MIN_PASSWORD_LEN, REGISTER_COST,
    hash_password,
};
