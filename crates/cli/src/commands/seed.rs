//! Seed the catalog database from a YAML catalog.
//!
//! Without `--file` the catalog bundled with the server is used. Seeding is
//! skipped when products already exist unless `--force` is given, which
//! clears every table first.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use product_review_server::db::{PgStore, Store};
use product_review_server::seed::{self, SeedCatalog, SeedOutcome};

/// Seed products and generated reviews.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a database
/// operation fails.
pub async fn run(file: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Read and validate YAML before connecting to database
    let catalog = match file {
        Some(path) => {
            if !path.exists() {
                return Err(format!("File not found: {}", path.display()).into());
            }
            info!(path = %path.display(), "Loading catalog from file");
            let content = tokio::fs::read_to_string(path).await?;
            SeedCatalog::from_yaml(&content)?
        }
        None => SeedCatalog::embedded()?,
    };
    info!(products = catalog.products.len(), "Parsed catalog");

    let store = Store::Postgres(PgStore::new(super::connect().await?));
    let mut rng = StdRng::from_os_rng();

    match seed::seed(&store, &catalog, force, &mut rng).await? {
        SeedOutcome::Skipped { existing } => {
            info!("Database already has {existing} products; use --force to reseed");
        }
        SeedOutcome::Seeded { products, reviews } => {
            info!("Seeding complete!");
            info!("  Products inserted: {products}");
            info!("  Reviews inserted: {reviews}");
        }
    }

    Ok(())
}
