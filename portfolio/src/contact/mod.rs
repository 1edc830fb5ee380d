//! Contact-form intake and forwarding.

pub mod errors;
pub mod models;
pub mod service;

pub use errors::{ContactError, ContactResult};
pub use models::{ContactSubmission, NewContact, SubmitContactRequest};
pub use service::ContactService;
