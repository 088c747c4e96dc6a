//! Notice repository.

use std::sync::Arc;

use powerlink_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Order, QueryOrder};

use crate::entities::{Notice, notice};

/// Repository for notice operations.
#[derive(Clone)]
pub struct NoticeRepository {
    db: Arc<DatabaseConnection>,
}

impl NoticeRepository {
    /// Create a new notice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All notices, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<notice::Model>> {
        Notice::find()
            .order_by(notice::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a notice.
    pub async fn create(&self, model: notice::ActiveModel) -> AppResult<notice::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a notice.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Notice::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Notice not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_find_all() {
        let notice = notice::Model {
            id: "n1".to_string(),
            title: "Billing office closed".to_string(),
            message: "Closed on public holidays".to_string(),
            kind: "announcement".to_string(),
            target: "all".to_string(),
            status: "active".to_string(),
            views: 0,
            schedule: None,
            created_at: Utc::now(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[notice]])
                .into_connection(),
        );

        let repo = NoticeRepository::new(db);
        let notices = repo.find_all().await.unwrap();

        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].target, "all");
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = NoticeRepository::new(db);
        assert!(matches!(repo.delete("missing").await, Err(AppError::NotFound(_))));
    }
}
