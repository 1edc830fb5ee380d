//! Server binary entrypoint.

use std::sync::Arc;

use anyhow::Context;
use portfolio::db::{
    ContactStore, CredentialStore, Database, PgContactStore, PgCredentialStore, migrations,
};
use portfolio::{AuthService, BrevoClient, ContactService};
use portfolio_server::api::{self, AppState};
use portfolio_server::config::ServerConfig;
use portfolio_server::logging;
use tracing::info;

const HELP: &str = "\
Run the portfolio site backend server

USAGE:
  portfolio_server [OPTIONS]

OPTIONS:
  --bind    IP:PORT   Server bind address   [default: env SERVER_BIND or 127.0.0.1:5000]
  --db-url  URL       Postgres connection   [default: env DATABASE_URL]

FLAGS:
  -h, --help          Print help information

ENVIRONMENT:
  SERVER_BIND            Server bind address (e.g. 0.0.0.0:5000)
  DATABASE_URL           Postgres connection string
  JWT_SECRET             Token signing secret, min 32 chars (required)
  SESSION_TRANSPORT      'cookie' or 'bearer'           [default: cookie]
  SESSION_COOKIE_NAME    Session cookie name            [default: aid]
  SESSION_COOKIE_SECURE  Set the Secure cookie flag     [default: false]
  SESSION_TTL_SECS       Session lifetime override (7d cookie / 1h bearer)
  RESET_TOKEN_TTL_MINS   Password-reset token lifetime  [default: 15]
  BREVO_API_KEY          Brevo API key (required)
  BREVO_BASE_URL         Brevo endpoint                 [default: https://api.brevo.com]
  BREVO_SENDER_EMAIL     From-address for reset email
  BREVO_SENDER_NAME      From-name for reset email
";

struct Args {
    bind: Option<String>,
    database_url: Option<String>,
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        eprintln!("Warning: unrecognized arguments: {remaining:?}");
    }

    Ok(args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = parse_args()?;
    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    config.validate()?;
    info!(bind = %config.bind, transport = %config.session.transport, "Configuration loaded");

    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    migrations::migrate(db.pool())
        .await
        .context("Failed to run migrations")?;

    let credentials: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(db.pool().clone()));
    let contacts: Arc<dyn ContactStore> = Arc::new(PgContactStore::new(db.pool().clone()));
    let mailer = BrevoClient::new(&config.brevo).context("Failed to build Brevo client")?;

    let auth = Arc::new(AuthService::new(credentials.clone(), config.auth_config()));
    let contact = Arc::new(ContactService::new(contacts, mailer.clone()));

    let app = api::create_router(AppState {
        auth,
        contact,
        mailer,
        store: credentials,
        session: config.session.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!(addr = %config.bind, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to install CTRL+C handler");
        return;
    }
    info!("Shutdown signal received");
}
