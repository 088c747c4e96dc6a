//! Announcement entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Public announcement shown on the portal home page.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "announcements")]
pub struct Model {
    /// Unique announcement ID.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Title of the announcement.
    pub title: String,

    /// Body text.
    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Free-form tag (`info`, `warning`, `error`, ...).
    #[sea_orm(column_name = "type")]
    pub kind: String,

    /// Higher values are listed first.
    pub priority: i32,

    /// Whether the announcement is switched on.
    pub is_active: bool,

    /// When to stop showing the announcement (optional).
    #[sea_orm(nullable)]
    pub expires_at: Option<DateTime<Utc>>,

    /// Weak reference to the admin who created it.
    #[sea_orm(nullable)]
    pub created_by: Option<String>,

    /// When the announcement was created.
    pub created_at: DateTime<Utc>,

    /// When the announcement was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Public visibility: active and not yet expired at `now`.
    #[must_use]
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn announcement(is_active: bool, expires_at: Option<DateTime<Utc>>) -> Model {
        let now = Utc::now();
        Model {
            id: "a1".to_string(),
            title: "Planned maintenance".to_string(),
            content: "Substation 4 will be offline".to_string(),
            kind: "info".to_string(),
            priority: 1,
            is_active,
            expires_at,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_visibility_rule() {
        let now = Utc::now();
        assert!(announcement(true, None).is_visible_at(now));
        assert!(announcement(true, Some(now + Duration::hours(1))).is_visible_at(now));
        assert!(!announcement(true, Some(now - Duration::hours(1))).is_visible_at(now));
        assert!(!announcement(false, None).is_visible_at(now));
    }
}
