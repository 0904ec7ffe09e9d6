//! Review queries and the stats reconciler.

use sqlx::{Postgres, QueryBuilder};

use product_review_core::{
    Page, PageRequest, ProductId, Rating, RatingHistogram, RatingSummary, ReviewDraft,
    ReviewSortField, SortField, SortSpec,
};

use super::{
    PgStore, REVIEW_COLUMNS, ReviewRow, apply_rating_summary, collect_rows, decode_rating,
    lock_product, to_bound, to_count,
};
use crate::db::RepositoryError;
use crate::models::Review;

fn push_review_filter(
    qb: &mut QueryBuilder<'_, Postgres>,
    product_id: ProductId,
    rating: Option<Rating>,
) {
    qb.push(" WHERE r.product_id = ").push_bind(product_id);
    if let Some(rating) = rating {
        qb.push(" AND r.rating = ").push_bind(i16::from(rating.get()));
    }
}

impl PgStore {
    async fn product_exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM catalog.product WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    pub(crate) async fn rating_histogram(
        &self,
        id: ProductId,
    ) -> Result<RatingHistogram, RepositoryError> {
        let rows: Vec<(i16, i64)> = sqlx::query_as(
            "SELECT rating, COUNT(*) FROM catalog.review WHERE product_id = $1 GROUP BY rating",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let counts = rows
            .into_iter()
            .map(|(rating, count)| decode_rating(rating).map(|r| (r, to_count(count))))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepositoryError::DataCorruption(format!("product {id}: {e}")))?;
        Ok(RatingHistogram::from_counts(counts))
    }

    pub(crate) async fn list_reviews(
        &self,
        product_id: ProductId,
        rating: Option<Rating>,
        page: PageRequest,
        sort: SortSpec<ReviewSortField>,
    ) -> Result<Page<Review>, RepositoryError> {
        if !self.product_exists(product_id).await? {
            return Err(RepositoryError::NotFound);
        }

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM catalog.review r");
        push_review_filter(&mut count, product_id, rating);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {REVIEW_COLUMNS} FROM catalog.review r"));
        push_review_filter(&mut query, product_id, rating);
        query
            .push(" ORDER BY ")
            .push(sort.field.column())
            .push(' ')
            .push(sort.direction.as_sql())
            .push(", r.id ")
            .push(sort.direction.as_sql())
            .push(" LIMIT ")
            .push_bind(to_bound(page.limit()))
            .push(" OFFSET ")
            .push_bind(to_bound(page.offset()));

        let rows: Vec<ReviewRow> = query.build_query_as().fetch_all(&self.pool).await?;
        Ok(Page::new(collect_rows(rows)?, page, to_count(total)))
    }

    pub(crate) async fn recent_reviews(
        &self,
        product_id: ProductId,
        limit: u32,
    ) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM catalog.review r \
             WHERE r.product_id = $1 ORDER BY r.created_at DESC, r.id DESC LIMIT $2"
        );
        let rows: Vec<ReviewRow> = sqlx::query_as(&sql)
            .bind(product_id)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        collect_rows(rows)
    }

    pub(crate) async fn add_review(&self, draft: &ReviewDraft) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_product(&mut tx, draft.product_id).await?;

        let sql = format!(
            "INSERT INTO catalog.review AS r (product_id, reviewer_name, comment, rating, helpful_count) \
             VALUES ($1, $2, $3, $4, 0) RETURNING {REVIEW_COLUMNS}"
        );
        let row: ReviewRow = sqlx::query_as(&sql)
            .bind(draft.product_id)
            .bind(&draft.reviewer_name)
            .bind(&draft.comment)
            .bind(i16::from(draft.rating.get()))
            .fetch_one(&mut *tx)
            .await?;

        apply_rating_summary(&mut tx, draft.product_id).await?;
        tx.commit().await?;

        Review::try_from(row)
    }

    pub(crate) async fn recompute_product_stats(
        &self,
        id: ProductId,
    ) -> Result<RatingSummary, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_product(&mut tx, id).await?;
        let summary = apply_rating_summary(&mut tx, id).await?;
        tx.commit().await?;
        Ok(summary)
    }
}
