//! Announcement repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use powerlink_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, sea_query::Expr,
};

use crate::entities::{Announcement, announcement};

/// Partial announcement edit.
///
/// Every field but `expires_at` keeps its stored value when `None`;
/// `expires_at` is always written so an expiry can be cleared.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub kind: Option<String>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Public listing: active, unexpired at `now`, highest priority then newest.
#[must_use]
pub fn public_query(now: DateTime<Utc>, limit: u64) -> Select<announcement::Entity> {
    Announcement::find()
        .filter(announcement::Column::IsActive.eq(true))
        .filter(
            Condition::any()
                .add(announcement::Column::ExpiresAt.is_null())
                .add(announcement::Column::ExpiresAt.gt(now)),
        )
        .order_by(announcement::Column::Priority, Order::Desc)
        .order_by(announcement::Column::CreatedAt, Order::Desc)
        .limit(limit)
}

/// Repository for announcement operations.
#[derive(Clone)]
pub struct AnnouncementRepository {
    db: Arc<DatabaseConnection>,
}

impl AnnouncementRepository {
    /// Create a new announcement repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find announcement by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<announcement::Model>> {
        Announcement::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Publicly visible announcements.
    pub async fn find_public(&self, limit: u64) -> AppResult<Vec<announcement::Model>> {
        public_query(Utc::now(), limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find all announcements (for admin), newest first.
    pub async fn find_all(&self) -> AppResult<Vec<announcement::Model>> {
        Announcement::find()
            .order_by(announcement::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new announcement.
    pub async fn create(&self, model: announcement::ActiveModel) -> AppResult<announcement::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an announcement.
    pub async fn update(
        &self,
        id: &str,
        changes: AnnouncementUpdate,
    ) -> AppResult<announcement::Model> {
        let announcement = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

        let mut active: announcement::ActiveModel = announcement.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(content) = changes.content {
            active.content = Set(content);
        }
        if let Some(kind) = changes.kind {
            active.kind = Set(kind);
        }
        if let Some(priority) = changes.priority {
            active.priority = Set(priority);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.expires_at = Set(changes.expires_at);
        active.updated_at = Set(Utc::now());

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Flip `is_active` in a single UPDATE and return the new row.
    pub async fn toggle_active(&self, id: &str) -> AppResult<announcement::Model> {
        let result = Announcement::update_many()
            .col_expr(announcement::Column::IsActive, Expr::cust("NOT is_active"))
            .col_expr(announcement::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(announcement::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Announcement not found".to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))
    }

    /// Delete an announcement.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Announcement::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Announcement not found".to_string()));
        }
        Ok(())
    }
}
