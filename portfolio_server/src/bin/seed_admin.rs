//! Seeds the first administrator account.
//!
//! Reads `ADMIN_USERNAME`, `ADMIN_EMAIL`, and `ADMIN_PASSWORD` from the
//! environment (or `.env`), creates the account if it does not exist, and
//! exits 0 either way so deploy scripts can run it unconditionally:
//!
//! ```text
//! ADMIN_USERNAME=admin ADMIN_EMAIL=a@b.c ADMIN_PASSWORD=... cargo run --bin seed_admin
//! ```

use anyhow::{Context, bail};
use portfolio::auth::{DEFAULT_ROLE, NewAdmin, REGISTER_COST, hash_password};
use portfolio::db::{CredentialStore, Database, DatabaseConfig, PgCredentialStore, migrations};
use tracing::{info, warn};

fn require_env(var: &str) -> anyhow::Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!(
            "Missing {var}: set ADMIN_USERNAME, ADMIN_EMAIL, and ADMIN_PASSWORD \
             to seed the first administrator"
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    portfolio_server::logging::init();

    let username = require_env("ADMIN_USERNAME")?;
    let email = require_env("ADMIN_EMAIL")?;
    let password = require_env("ADMIN_PASSWORD")?;

    let db = Database::new(&DatabaseConfig::from_env())
        .await
        .context("Failed to connect to database")?;
    migrations::migrate(db.pool()).await?;

    let store = PgCredentialStore::new(db.pool().clone());
    if store.find_by_username(&username).await?.is_some() {
        warn!(username = %username, "Administrator already exists, nothing to do");
        db.close().await;
        return Ok(());
    }

    let password_hash = hash_password(&password, REGISTER_COST)?;
    let record = store
        .create(NewAdmin {
            username,
            email,
            password_hash,
            role: DEFAULT_ROLE.to_string(),
        })
        .await?;

    info!(id = record.id, username = %record.username, "Administrator seeded");
    db.close().await;
    Ok(())
}
