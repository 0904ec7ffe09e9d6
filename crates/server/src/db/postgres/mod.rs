//! `PostgreSQL` catalog store.
//!
//! Queries are built at runtime (`sqlx::query_as` / `QueryBuilder`) because
//! list queries splice a whitelisted `ORDER BY` column and a variable set of
//! filter predicates. All values go through bind parameters.

mod notifications;
mod products;
mod reviews;
mod votes;
mod wishlist;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use product_review_core::{
    CatalogFilter, FilterCase, NotificationId, Price, ProductId, Rating, RatingSummary, ReviewId,
    UserId,
};

use super::RepositoryError;
use crate::models::{Notification, Product, Review};

/// Catalog store backed by a `PostgreSQL` pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// =============================================================================
// Row types
// =============================================================================

/// Product columns, selected from `catalog.product p`.
const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, \
     ARRAY(SELECT c.category FROM catalog.product_category c \
           WHERE c.product_id = p.id ORDER BY c.category) AS categories, \
     p.price, p.image_url, p.average_rating, p.review_count";

/// Review columns, selected from `catalog.review r`.
const REVIEW_COLUMNS: &str = "r.id, r.product_id, r.reviewer_name, r.comment, r.rating, \
     COALESCE(r.helpful_count, 0) AS helpful_count, r.created_at";

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    categories: Vec<String>,
    price: Decimal,
    image_url: String,
    average_rating: f64,
    review_count: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            categories: row.categories.into_iter().collect(),
            price,
            image_url: row.image_url,
            average_rating: row.average_rating,
            review_count: row.review_count,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    reviewer_name: String,
    comment: String,
    rating: i16,
    helpful_count: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = decode_rating(row.rating)
            .map_err(|e| RepositoryError::DataCorruption(format!("review {}: {e}", row.id)))?;
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            reviewer_name: row.reviewer_name,
            comment: row.comment,
            rating,
            helpful_count: row.helpful_count.max(0),
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: NotificationId,
    user_id: String,
    title: String,
    message: String,
    product_id: Option<ProductId>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RepositoryError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let user_id = UserId::parse(&row.user_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("notification {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            user_id,
            title: row.title,
            message: row.message,
            product_id: row.product_id,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

fn decode_rating(raw: i16) -> Result<Rating, product_review_core::RatingError> {
    Rating::new(i64::from(raw))
}

fn collect_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// =============================================================================
// Query helpers
// =============================================================================

/// Convert a `COUNT(*)` result.
fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Convert a page bound for `LIMIT` / `OFFSET`.
fn to_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// `ILIKE` pattern matching `search` as a literal substring.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Append the `WHERE` clause for a catalog filter over `catalog.product p`.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CatalogFilter) {
    fn category(qb: &mut QueryBuilder<'_, Postgres>, category: &str) {
        qb.push(
            "EXISTS (SELECT 1 FROM catalog.product_category c \
             WHERE c.product_id = p.id AND c.category = ",
        )
        .push_bind(category.to_owned())
        .push(")");
    }

    fn search(qb: &mut QueryBuilder<'_, Postgres>, search: &str) {
        qb.push("p.name ILIKE ").push_bind(like_pattern(search));
    }

    match filter.case() {
        FilterCase::Unfiltered => {}
        FilterCase::Category(c) => {
            qb.push(" WHERE ");
            category(qb, c);
        }
        FilterCase::Search(s) => {
            qb.push(" WHERE ");
            search(qb, s);
        }
        FilterCase::CategoryAndSearch {
            category: c,
            search: s,
        } => {
            qb.push(" WHERE ");
            category(qb, c);
            qb.push(" AND ");
            search(qb, s);
        }
    }
}

/// Lock a product row for the rest of the transaction.
async fn lock_product(conn: &mut PgConnection, id: ProductId) -> Result<(), RepositoryError> {
    sqlx::query_scalar::<_, ProductId>("SELECT id FROM catalog.product WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)
        .map(|_| ())
}

/// Reread a product's ratings and write the aggregate back.
///
/// Callers must hold the product row lock.
async fn apply_rating_summary(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<RatingSummary, RepositoryError> {
    let raw: Vec<i16> = sqlx::query_scalar("SELECT rating FROM catalog.review WHERE product_id = $1")
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

    let ratings = raw
        .into_iter()
        .map(decode_rating)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RepositoryError::DataCorruption(format!("product {id}: {e}")))?;
    let summary = RatingSummary::from_ratings(ratings);

    sqlx::query(
        "UPDATE catalog.product SET average_rating = $2, review_count = $3 WHERE id = $1",
    )
    .bind(id)
    .bind(summary.average_rating)
    .bind(summary.review_count_i32())
    .execute(&mut *conn)
    .await?;

    tracing::debug!(
        product_id = %id,
        review_count = summary.review_count,
        average_rating = summary.average_rating,
        "Product stats reconciled"
    );
    Ok(summary)
}
