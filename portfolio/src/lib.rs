//! Domain library for a personal portfolio site backend.
//!
//! Three concerns live here, each behind its own module:
//!
//! - [`auth`] - administrator accounts with bcrypt-hashed credentials and
//!   stateless JWT sessions
//! - [`contact`] - contact-form intake: validate, persist, forward to the
//!   Brevo marketing API
//! - [`mailer`] - the Brevo HTTP client used for contact upserts and
//!   password-reset email
//!
//! Persistence sits behind the store traits in [`db::store`], so services
//! run identically against Postgres in production and the in-memory doubles
//! in tests. The HTTP surface lives in the companion server crate.

pub mod auth;
pub mod contact;
pub mod db;
pub mod mailer;

pub use auth::{AuthConfig, AuthService};
pub use contact::ContactService;
pub use db::Database;
pub use mailer::{BrevoClient, BrevoConfig};
