//! Product review CLI - database migrations and catalog maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! product-review-cli migrate
//!
//! # Load the bundled demo catalog (skipped if products exist)
//! product-review-cli seed
//!
//! # Replace everything with a custom catalog
//! product-review-cli seed --file catalog.yaml --force
//!
//! # Recompute every product's rating aggregate
//! product-review-cli reconcile
//! ```
//!
//! All commands read `CATALOG_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "product-review-cli")]
#[command(author, version, about = "Product review service CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with products and generated reviews
    Seed {
        /// Catalog YAML file (defaults to the bundled demo catalog)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Clear existing data and seed anyway
        #[arg(long)]
        force: bool,
    },
    /// Recompute review count and average rating for every product
    Reconcile,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, force } => commands::seed::run(file.as_deref(), force).await?,
        Commands::Reconcile => commands::reconcile::run().await?,
    }
    Ok(())
}
