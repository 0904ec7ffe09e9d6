//! Demo catalog seeding.
//!
//! The catalog file lists products plus a pool of reviewer names and comments.
//! Reviews are generated from the pool: 1-10 per product, plus
//! `bulk_reviews` extra ones on the first product (suffixed
//! `(Test Review N)`) so its review list paginates.
//!
//! Every review goes through [`Store::add_review`], so product aggregates are
//! reconciled exactly as they are for client-posted reviews.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use product_review_core::{ProductId, ReviewDraft, ReviewInput, ValidationError};

use crate::db::{RepositoryError, Store};
use crate::models::NewProduct;

/// The catalog bundled with the server.
pub const EMBEDDED_CATALOG: &str = include_str!("../seed/catalog.yaml");

/// Most generated reviews per product (before bulk reviews).
const MAX_REVIEWS_PER_PRODUCT: u32 = 10;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The catalog file is not valid YAML for [`SeedCatalog`].
    #[error("invalid catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The catalog has no reviewers or no comments to draw from.
    #[error("catalog has no {0}")]
    EmptyPool(&'static str),

    /// A generated review failed validation.
    #[error("invalid review in catalog: {0}")]
    Validation(#[from] ValidationError),

    /// Store operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A parsed catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCatalog {
    /// Extra reviews added to the first product.
    #[serde(default)]
    pub bulk_reviews: u32,
    /// Reviewer names to draw from.
    pub reviewers: Vec<String>,
    /// Review comments to draw from.
    pub comments: Vec<String>,
    /// Products, inserted in order.
    pub products: Vec<NewProduct>,
}

impl SeedCatalog {
    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` for malformed input and
    /// `SeedError::EmptyPool` if reviewers or comments are empty.
    pub fn from_yaml(yaml: &str) -> Result<Self, SeedError> {
        let catalog: Self = serde_yaml::from_str(yaml)?;
        if catalog.reviewers.is_empty() {
            return Err(SeedError::EmptyPool("reviewers"));
        }
        if catalog.comments.is_empty() {
            return Err(SeedError::EmptyPool("comments"));
        }
        Ok(catalog)
    }

    /// The catalog bundled with the server.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the bundled file does not parse.
    pub fn embedded() -> Result<Self, SeedError> {
        Self::from_yaml(EMBEDDED_CATALOG)
    }

    fn random_review<R: Rng>(
        &self,
        rng: &mut R,
        product_id: ProductId,
        suffix: Option<u32>,
    ) -> Result<ReviewDraft, SeedError> {
        let reviewer_name = self
            .reviewers
            .choose(rng)
            .ok_or(SeedError::EmptyPool("reviewers"))?
            .clone();
        let comment = self
            .comments
            .choose(rng)
            .ok_or(SeedError::EmptyPool("comments"))?;
        let comment = match suffix {
            Some(n) => format!("{comment} (Test Review {n})"),
            None => comment.clone(),
        };

        let input = ReviewInput {
            reviewer_name,
            comment,
            rating: rng.random_range(1..=5),
        };
        Ok(ReviewDraft::parse(product_id, &input)?)
    }
}

/// What a seeding run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store already had products and `force` was off.
    Skipped {
        /// Products already present.
        existing: u64,
    },
    /// The catalog was loaded.
    Seeded {
        /// Products inserted.
        products: u64,
        /// Reviews inserted.
        reviews: u64,
    },
}

/// Load the catalog into the store.
///
/// Skips when the store already holds products, unless `force` is set, in
/// which case everything is cleared first.
///
/// # Errors
///
/// Returns `SeedError` if a store operation fails or a generated review is
/// invalid.
pub async fn seed<R: Rng + Send>(
    store: &Store,
    catalog: &SeedCatalog,
    force: bool,
    rng: &mut R,
) -> Result<SeedOutcome, SeedError> {
    let existing = store.count_products().await?;
    if existing > 0 {
        if !force {
            info!(existing, "Store already has products, skipping seed");
            return Ok(SeedOutcome::Skipped { existing });
        }
        info!(existing, "Clearing store before seeding");
        store.clear().await?;
    }

    let mut products = 0;
    let mut reviews = 0;
    let mut first = None;

    for new_product in &catalog.products {
        let product = store.insert_product(new_product).await?;
        products += 1;
        first.get_or_insert(product.id);

        let count = rng.random_range(1..=MAX_REVIEWS_PER_PRODUCT);
        for _ in 0..count {
            let draft = catalog.random_review(rng, product.id, None)?;
            store.add_review(&draft).await?;
            reviews += 1;
        }
    }

    if let Some(first) = first {
        for n in 1..=catalog.bulk_reviews {
            let draft = catalog.random_review(rng, first, Some(n))?;
            store.add_review(&draft).await?;
            reviews += 1;
        }
    }

    info!(products, reviews, backend = store.backend(), "Catalog seeded");
    Ok(SeedOutcome::Seeded { products, reviews })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use product_review_core::{CatalogFilter, PageRequest, ReviewSortField, SortSpec};

    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = SeedCatalog::embedded().expect("catalog");
        assert_eq!(catalog.products.len(), 24);
        assert_eq!(catalog.bulk_reviews, 30);
        assert_eq!(catalog.products[0].name, "iPhone 15 Pro");
        assert_eq!(catalog.products[0].price.to_string(), "999.99");
        assert!(catalog.products[0].categories.contains("Smartphones"));
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let err = SeedCatalog::from_yaml("reviewers: []\ncomments: [\"Fine enough product.\"]\nproducts: []\n")
            .expect_err("empty reviewers");
        assert!(matches!(err, SeedError::EmptyPool("reviewers")));
    }

    #[tokio::test]
    async fn test_seed_reconciles_every_product() {
        let store = Store::Memory(MemoryStore::new());
        let catalog = SeedCatalog::embedded().expect("catalog");
        let mut rng = StdRng::seed_from_u64(7);

        let outcome = seed(&store, &catalog, false, &mut rng).await.expect("seed");
        let SeedOutcome::Seeded { products, reviews } = outcome else {
            panic!("expected seeding, got {outcome:?}");
        };
        assert_eq!(products, 24);
        assert!(reviews >= 24 + 30);

        let page = store
            .list_products(
                &CatalogFilter::unfiltered(),
                PageRequest::from_query(None, Some(100)).expect("page"),
                SortSpec::parse(Some("id")).expect("sort"),
            )
            .await
            .expect("list");
        let mut total = 0;
        for product in &page.content {
            let histogram = store.rating_histogram(product.id).await.expect("histogram");
            assert_eq!(u64::try_from(product.review_count).expect("count"), histogram.total());
            assert!((1.0..=5.0).contains(&product.average_rating));
            total += histogram.total();
        }
        assert_eq!(total, reviews);

        let first = page.content[0].id;
        let bulk = store
            .list_reviews(
                first,
                None,
                PageRequest::from_query(None, Some(100)).expect("page"),
                SortSpec::<ReviewSortField>::parse(None).expect("sort"),
            )
            .await
            .expect("reviews");
        let tagged = bulk
            .content
            .iter()
            .filter(|r| r.comment.contains("(Test Review "))
            .count();
        assert_eq!(tagged, 30);
    }

    #[tokio::test]
    async fn test_seed_skips_unless_forced() {
        let store = Store::Memory(MemoryStore::new());
        let catalog = SeedCatalog::embedded().expect("catalog");
        let mut rng = StdRng::seed_from_u64(1);

        seed(&store, &catalog, false, &mut rng).await.expect("first");
        let again = seed(&store, &catalog, false, &mut rng).await.expect("second");
        assert_eq!(again, SeedOutcome::Skipped { existing: 24 });

        let forced = seed(&store, &catalog, true, &mut rng).await.expect("forced");
        assert!(matches!(forced, SeedOutcome::Seeded { products: 24, .. }));
        assert_eq!(store.count_products().await.expect("count"), 24);
    }
}
