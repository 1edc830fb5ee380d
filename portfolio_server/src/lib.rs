//! HTTP server for the portfolio site backend.
//!
//! The domain logic lives in the `portfolio` crate; this crate adds the
//! axum surface on top: routing, the session transport, the authorization
//! gate, configuration, and logging. Integration tests drive the router
//! directly with in-memory stores, so everything here is a library module
//! with thin binaries (`portfolio_server`, `seed_admin`) on top.

pub mod api;
pub mod config;
pub mod logging;
