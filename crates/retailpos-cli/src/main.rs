//! retailpos - command line client for the Smart Retail POS backend.
//!
//! Logs in against the backend, keeps the session token between runs and
//! uses it for product queries.

mod commands;
mod format;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use retailpos_core::{ApiClient, Config, Session, StorageBackend, TokenStore};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "retailpos", version, about = "Smart Retail POS command line client")]
struct Cli {
    /// Backend base URL (overrides RETAILPOS_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where the session token is kept: file, keyring or memory
    #[arg(long, global = true)]
    storage: Option<StorageBackend>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Create an employee account
    Register {
        /// Display name
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "kasir")]
        role: String,
    },
    /// Forget the stored session token
    Logout,
    /// Exit 0 if a session token is stored, 1 otherwise
    Status,
    /// Show the claims of the stored token
    Whoami,
    /// List products
    Products,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (writer, guard) = tracing_appender::non_blocking(io::stderr());
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing();

    let mut config = Config::load()?;
    let base_url = cli.api_url.clone().unwrap_or_else(|| config.api_base_url());
    let backend = cli.storage.unwrap_or_else(|| config.storage_backend());
    debug!(%base_url, %backend, "Starting");

    let tokens = Arc::new(TokenStore::from_boxed(config.open_storage(backend)?));
    let session = Session::new(ApiClient::new(base_url)?, tokens);

    let code = match cli.command {
        Command::Login { username } => commands::login(&session, &mut config, username).await?,
        Command::Register {
            name,
            username,
            email,
            role,
        } => commands::register(&session, name, username, email, role).await?,
        Command::Logout => commands::logout(&session)?,
        Command::Status => commands::status(&session),
        Command::Whoami => commands::whoami(&session)?,
        Command::Products => commands::products(&session).await?,
    };

    info!("Done");
    Ok(code)
}
