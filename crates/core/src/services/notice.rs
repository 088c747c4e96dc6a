//! Notice service.

use chrono::{DateTime, Utc};
use powerlink_common::{AppResult, IdGenerator};
use powerlink_db::{entities::notice, repositories::NoticeRepository};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::require_present;

/// Input for posting a notice.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoticeInput {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: String,

    #[serde(default)]
    pub message: String,

    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub kind: Option<String>,

    #[validate(length(max = 50))]
    pub target: Option<String>,

    pub schedule: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct NoticeService {
    notice_repo: NoticeRepository,
    id_gen: IdGenerator,
}

impl NoticeService {
    #[must_use]
    pub const fn new(notice_repo: NoticeRepository) -> Self {
        Self {
            notice_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// All notices, newest first.
    pub async fn list(&self) -> AppResult<Vec<notice::Model>> {
        self.notice_repo.find_all().await
    }

    pub async fn create(&self, input: CreateNoticeInput) -> AppResult<notice::Model> {
        input.validate()?;
        require_present(&input.title, "title")?;
        require_present(&input.message, "message")?;

        let model = notice::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            message: Set(input.message),
            kind: Set(input.kind.unwrap_or_else(|| "announcement".to_string())),
            target: Set(input.target.unwrap_or_else(|| "all".to_string())),
            status: Set("active".to_string()),
            views: Set(0),
            schedule: Set(input.schedule),
            created_at: Set(Utc::now()),
        };

        let notice = self.notice_repo.create(model).await?;
        info!(notice_id = %notice.id, target = %notice.target, "Notice posted");
        Ok(notice)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.notice_repo.delete(id).await?;
        info!(notice_id = %id, "Notice deleted");
        Ok(())
    }
}
