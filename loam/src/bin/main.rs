//! loam CLI
//!
//! # Usage
//!
//! ```bash
//! # Run the server (default)
//! loam serve
//!
//! # Password utilities
//! loam hash --password 'correct-horse-battery'
//! loam check --password 'correct-horse-battery' --hash '$argon2id$...'
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

use loam::auth::{hash_password, verify_password};
use loam::config::AppConfig;
use loam::state::AppState;

#[derive(Parser)]
#[command(name = "loam")]
#[command(version)]
#[command(about = "Personal website and admin back office", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,
    /// Hash a password with Argon2id
    Hash {
        /// The password to hash
        #[arg(long)]
        password: String,
    },
    /// Check a password against a hash
    Check {
        /// The password to check
        #[arg(long)]
        password: String,
        /// The hash to check against
        #[arg(long)]
        hash: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Hash { password } => {
            let hash = hash_password(&password)?;
            println!("{hash}");
            Ok(())
        }
        Commands::Check { password, hash } => {
            if verify_password(&password, &hash) {
                println!("Password matches the hash");
            } else {
                println!("Password does not match the hash");
            }
            Ok(())
        }
    }
}

async fn serve() -> Result<()> {
    loam::observability::init()?;

    let config = AppConfig::load()?;
    let state = AppState::from_config(config.clone()).await?;
    let app = loam::routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(addr = %config.server.bind, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
