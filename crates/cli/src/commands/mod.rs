//! CLI command implementations.

pub mod migrate;
pub mod reconcile;
pub mod seed;

use sqlx::PgPool;
use tracing::info;

use product_review_server::config::get_database_url;
use product_review_server::db;

/// Environment variable holding the catalog database URL.
pub const DATABASE_URL_VAR: &str = "CATALOG_DATABASE_URL";

/// Load `.env` and connect to the catalog database.
///
/// # Errors
///
/// Returns an error if the URL is not set or the connection fails.
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url(DATABASE_URL_VAR)?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");
    Ok(pool)
}
