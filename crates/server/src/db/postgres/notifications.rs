//! Notification ledger.

use product_review_core::{NotificationDraft, NotificationId, UserId};

use super::{NotificationRow, PgStore, collect_rows, to_count};
use crate::db::RepositoryError;
use crate::models::Notification;

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, product_id, is_read, created_at";

impl PgStore {
    pub(crate) async fn create_notification(
        &self,
        user: &UserId,
        draft: &NotificationDraft,
    ) -> Result<Notification, RepositoryError> {
        let sql = format!(
            "INSERT INTO catalog.notification (user_id, title, message, product_id) \
             VALUES ($1, $2, $3, $4) RETURNING {NOTIFICATION_COLUMNS}"
        );
        let row: NotificationRow = sqlx::query_as(&sql)
            .bind(user.as_str())
            .bind(&draft.title)
            .bind(&draft.message)
            .bind(draft.product_id)
            .fetch_one(&self.pool)
            .await?;
        Notification::try_from(row)
    }

    pub(crate) async fn notifications(
        &self,
        user: &UserId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM catalog.notification \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows: Vec<NotificationRow> = sqlx::query_as(&sql)
            .bind(user.as_str())
            .fetch_all(&self.pool)
            .await?;
        collect_rows(rows)
    }

    pub(crate) async fn unread_count(&self, user: &UserId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM catalog.notification WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(to_count(count))
    }

    pub(crate) async fn mark_notification_read(
        &self,
        user: &UserId,
        id: NotificationId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE catalog.notification SET is_read = TRUE WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub(crate) async fn mark_all_notifications_read(
        &self,
        user: &UserId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE catalog.notification SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub(crate) async fn delete_notification(
        &self,
        user: &UserId,
        id: NotificationId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM catalog.notification WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub(crate) async fn delete_all_notifications(
        &self,
        user: &UserId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.notification WHERE user_id = $1")
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
