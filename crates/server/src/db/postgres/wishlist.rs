//! Wishlist ledger.

use product_review_core::{ProductId, UserId};

use super::PgStore;
use crate::db::RepositoryError;

impl PgStore {
    pub(crate) async fn toggle_wishlist(
        &self,
        user: &UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM catalog.product WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(RepositoryError::NotFound);
        }

        let removed = sqlx::query(
            "DELETE FROM catalog.wishlist_item WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user.as_str())
        .bind(product_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            sqlx::query(
                "INSERT INTO catalog.wishlist_item (user_id, product_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(user.as_str())
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::NotFound;
                }
                RepositoryError::Database(e)
            })?;
        }

        tx.commit().await?;
        Ok(removed == 0)
    }

    pub(crate) async fn wishlist(&self, user: &UserId) -> Result<Vec<ProductId>, RepositoryError> {
        Ok(sqlx::query_scalar(
            "SELECT product_id FROM catalog.wishlist_item WHERE user_id = $1 ORDER BY position",
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?)
    }
}
