//! Helpful-vote ledger.

use product_review_core::{ReviewId, ToggleOutcome, UserId};

use super::{PgStore, REVIEW_COLUMNS, ReviewRow};
use crate::db::RepositoryError;
use crate::models::Review;

impl PgStore {
    /// Toggle a helpful vote.
    ///
    /// The review row is locked first, so concurrent toggles on one review
    /// serialize. A vote inserted by a racing transaction that committed
    /// between our `DELETE` and `INSERT` shows up as a no-op insert and
    /// leaves the count alone.
    pub(crate) async fn toggle_helpful(
        &self,
        review_id: ReviewId,
        user: Option<&UserId>,
    ) -> Result<(Review, ToggleOutcome), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<i32> = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT helpful_count FROM catalog.review WHERE id = $1 FOR UPDATE",
        )
        .bind(review_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let outcome = match user {
            None => ToggleOutcome::Anonymous,
            Some(user) => {
                let deleted = sqlx::query(
                    "DELETE FROM catalog.review_vote WHERE user_id = $1 AND review_id = $2",
                )
                .bind(user.as_str())
                .bind(review_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

                if deleted > 0 {
                    ToggleOutcome::Retracted
                } else {
                    let inserted = sqlx::query(
                        "INSERT INTO catalog.review_vote (user_id, review_id) VALUES ($1, $2) \
                         ON CONFLICT DO NOTHING",
                    )
                    .bind(user.as_str())
                    .bind(review_id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                    if inserted > 0 {
                        ToggleOutcome::Cast
                    } else {
                        ToggleOutcome::Raced
                    }
                }
            }
        };

        let next = outcome.delta().apply(current);
        let sql = format!(
            "UPDATE catalog.review AS r SET helpful_count = $2 WHERE r.id = $1 RETURNING {REVIEW_COLUMNS}"
        );
        let row: ReviewRow = sqlx::query_as(&sql)
            .bind(review_id)
            .bind(next)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((Review::try_from(row)?, outcome))
    }

    pub(crate) async fn voted_review_ids(
        &self,
        user: &UserId,
    ) -> Result<Vec<ReviewId>, RepositoryError> {
        Ok(sqlx::query_scalar(
            "SELECT review_id FROM catalog.review_vote WHERE user_id = $1 ORDER BY review_id",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?)
    }
}
