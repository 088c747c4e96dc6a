//! Service request entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service request lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "under_review")]
    UnderReview,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl RequestStatus {
    /// Whether moving from `self` to `to` follows the triage flow
    /// `pending -> under_review -> approved -> assigned -> in_progress -> completed`,
    /// with `rejected` reachable from `pending` and `under_review`.
    ///
    /// The store accepts any transition; this only classifies them.
    #[must_use]
    pub const fn is_intended_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Pending | Self::UnderReview | Self::Rejected)
                | (Self::UnderReview, Self::UnderReview | Self::Approved | Self::Rejected)
                | (Self::Approved, Self::Approved | Self::Assigned)
                | (Self::Assigned, Self::Assigned | Self::InProgress)
                | (Self::InProgress, Self::InProgress | Self::Completed)
                | (Self::Completed, Self::Completed)
                | (Self::Rejected, Self::Rejected)
        )
    }

    /// Statuses shown in the supervisor triage queue.
    #[must_use]
    pub const fn is_awaiting_triage(self) -> bool {
        matches!(self, Self::Pending | Self::UnderReview)
    }
}

/// Ticket priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    #[default]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

impl Priority {
    /// Sort rank; lower sorts first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

/// Metadata for one uploaded document, stored inside the `documents` array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    /// Original file name.
    pub name: String,
    /// Name on disk.
    pub stored_name: String,
    /// Public path, `/uploads/<ticket>/<stored name>`.
    pub path: String,
    pub size: u64,
    /// MIME type.
    #[serde(rename = "type")]
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Customer service request (new connection, meter change, ...).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Caller-supplied ticket number. Unique and immutable.
    #[sea_orm(unique)]
    pub ticket_id: String,

    pub service_type: String,

    pub full_name: String,

    pub phone: String,

    #[sea_orm(nullable)]
    pub city: Option<String>,

    #[sea_orm(nullable)]
    pub woreda: Option<String>,

    #[sea_orm(nullable)]
    pub kebele: Option<String>,

    #[sea_orm(nullable)]
    pub house_plot_number: Option<String>,

    #[sea_orm(nullable)]
    pub nearby_landmark: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub full_address: String,

    /// Ordered `DocumentMeta` records.
    pub documents: Json,

    pub status: RequestStatus,

    pub priority: Priority,

    /// Weak reference to the assigned technician.
    #[sea_orm(nullable)]
    pub assigned_to: Option<String>,

    /// Weak reference to the submitting user.
    #[sea_orm(nullable)]
    pub created_by: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub supervisor_notes: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Decode the stored document list. Malformed entries yield an empty list.
    #[must_use]
    pub fn document_list(&self) -> Vec<DocumentMeta> {
        serde_json::from_value(self.documents.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intended_flow() {
        use RequestStatus::*;
        let flow = [Pending, UnderReview, Approved, Assigned, InProgress, Completed];
        for pair in flow.windows(2) {
            assert!(pair[0].is_intended_transition(pair[1]), "{pair:?}");
        }
        assert!(Pending.is_intended_transition(Rejected));
        assert!(UnderReview.is_intended_transition(Rejected));
    }

    #[test]
    fn test_skips_are_not_intended() {
        use RequestStatus::*;
        assert!(!Pending.is_intended_transition(Completed));
        assert!(!Approved.is_intended_transition(Rejected));
        assert!(!Completed.is_intended_transition(Pending));
        assert!(!Rejected.is_intended_transition(Approved));
    }

    #[test]
    fn test_priority_rank() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::UnderReview).unwrap(),
            "\"under_review\""
        );
        assert_eq!(RequestStatus::InProgress.to_value(), "in_progress");
    }
}
