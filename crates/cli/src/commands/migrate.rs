//! Database migration command.
//!
//! Applies `crates/server/migrations/` to the catalog database. Migrations
//! are embedded at compile time.
//!
//! # Environment Variables
//!
//! - `CATALOG_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use tracing::info;

/// Run catalog database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    info!("Running catalog migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    info!("Catalog migrations complete!");
    Ok(())
}
