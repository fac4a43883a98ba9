//! # Character Mirror CLI (`mirror`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mirror init` | Create the SQLite database and run schema migrations |
//! | `mirror sync [--force]` | Populate the store from upstream |
//! | `mirror random` | Print one random character |
//! | `mirror search <name>` | Search characters by name fragment |
//! | `mirror list` | Print every stored character |
//! | `mirror serve` | Initial sync, then start the HTTP API |
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

use character_mirror::{config, ingest, migrate, query, server};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Character Mirror: keeps a local copy of a remote character catalog
/// and serves random-pick and name search over it.
#[derive(Parser)]
#[command(name = "mirror", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/mirror.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; running it multiple times is safe.
    Init,

    /// Ingest characters from the upstream catalog.
    ///
    /// Without `--force`, only runs when the local store is empty.
    Sync {
        /// Fetch and reconcile even if the store already has characters.
        /// Only characters missing locally are added.
        #[arg(long)]
        force: bool,
    },

    /// Print one character chosen at random.
    Random,

    /// Search characters whose name contains the given letters.
    Search {
        /// Letters only (`[A-Za-z]+`), matched case-insensitively.
        name: String,
    },

    /// Print every stored character.
    List,

    /// Run the initial sync if needed, then serve the HTTP API.
    Serve,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sync { force } => {
            ingest::run_sync(&cfg, force).await?;
        }
        Commands::Random => {
            query::run_random(&cfg).await?;
        }
        Commands::Search { name } => {
            query::run_search(&cfg, &name).await?;
        }
        Commands::List => {
            query::run_list(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
