//! Announcement service.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use powerlink_common::{AppResult, IdGenerator};
use powerlink_db::{
    entities::announcement,
    repositories::{AnnouncementRepository, AnnouncementUpdate, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::require_present;

/// Maximum announcements on the public feed.
pub const PUBLIC_FEED_LIMIT: u64 = 10;

const DEFAULT_KIND: &str = "info";
const DEFAULT_PRIORITY: i32 = 1;

/// Input for creating an announcement.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementInput {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub kind: Option<String>,

    pub priority: Option<i32>,

    #[serde(alias = "expires_at")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Input for editing an announcement.
///
/// Omitted fields keep their value, except `expiresAt`: leaving it out
/// clears the expiry.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnouncementInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub kind: Option<String>,

    pub priority: Option<i32>,

    #[serde(alias = "is_active")]
    pub is_active: Option<bool>,

    #[serde(alias = "expires_at")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Admin listing row.
#[derive(Debug, Clone, Serialize)]
pub struct AdminAnnouncementView {
    #[serde(flatten)]
    pub announcement: announcement::Model,
    pub created_by_username: Option<String>,
    /// Whether the announcement is currently on the public feed.
    pub is_live: bool,
}

/// Announcement service for business logic.
#[derive(Clone)]
pub struct AnnouncementService {
    announcement_repo: AnnouncementRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl AnnouncementService {
    /// Create a new announcement service.
    #[must_use]
    pub const fn new(announcement_repo: AnnouncementRepository, user_repo: UserRepository) -> Self {
        Self {
            announcement_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Visible announcements for the public feed.
    pub async fn list_public(&self) -> AppResult<Vec<announcement::Model>> {
        self.announcement_repo.find_public(PUBLIC_FEED_LIMIT).await
    }

    /// Every announcement with its creator and live flag.
    pub async fn list_admin(&self) -> AppResult<Vec<AdminAnnouncementView>> {
        let announcements = self.announcement_repo.find_all().await?;

        let mut creator_ids: Vec<String> = announcements
            .iter()
            .filter_map(|a| a.created_by.clone())
            .collect();
        creator_ids.sort_unstable();
        creator_ids.dedup();

        let usernames: HashMap<String, String> = self
            .user_repo
            .find_by_ids(&creator_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let now = Utc::now();
        Ok(announcements
            .into_iter()
            .map(|announcement| AdminAnnouncementView {
                created_by_username: announcement
                    .created_by
                    .as_ref()
                    .and_then(|id| usernames.get(id))
                    .cloned(),
                is_live: announcement.is_visible_at(now),
                announcement,
            })
            .collect())
    }

    /// Publish a new announcement.
    pub async fn create(
        &self,
        input: CreateAnnouncementInput,
        created_by: &str,
    ) -> AppResult<announcement::Model> {
        input.validate()?;
        require_present(&input.title, "title")?;
        require_present(&input.content, "content")?;

        let now = Utc::now();
        let model = announcement::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            content: Set(input.content),
            kind: Set(input.kind.unwrap_or_else(|| DEFAULT_KIND.to_string())),
            priority: Set(input.priority.unwrap_or(DEFAULT_PRIORITY)),
            is_active: Set(true),
            expires_at: Set(input.expires_at),
            created_by: Set(Some(created_by.to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let announcement = self.announcement_repo.create(model).await?;
        info!(announcement_id = %announcement.id, "Announcement created");
        Ok(announcement)
    }

    /// Edit an announcement.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateAnnouncementInput,
    ) -> AppResult<announcement::Model> {
        input.validate()?;

        let announcement = self
            .announcement_repo
            .update(
                id,
                AnnouncementUpdate {
                    title: input.title,
                    content: input.content,
                    kind: input.kind,
                    priority: input.priority,
                    is_active: input.is_active,
                    expires_at: input.expires_at,
                },
            )
            .await?;

        info!(announcement_id = %announcement.id, "Announcement updated");
        Ok(announcement)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.announcement_repo.delete(id).await?;
        info!(announcement_id = %id, "Announcement deleted");
        Ok(())
    }

    pub async fn toggle_active(&self, id: &str) -> AppResult<announcement::Model> {
        let announcement = self.announcement_repo.toggle_active(id).await?;
        info!(
            announcement_id = %announcement.id,
            is_active = announcement.is_active,
            "Announcement toggled"
        );
        Ok(announcement)
    }
}
