//! Recompute every product's denormalized rating aggregate.
//!
//! Repairs drift left by imports or manual edits: each product's
//! `review_count` and `average_rating` are rebuilt from its reviews.

use tracing::info;

use product_review_server::db::{PgStore, Store};

/// Reconcile all products.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an update fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::Postgres(PgStore::new(super::connect().await?));

    let reconciled = store.reconcile_all().await?;
    info!("Reconciled {reconciled} products");
    Ok(())
}
