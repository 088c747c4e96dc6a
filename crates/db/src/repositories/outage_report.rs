//! Outage report repository.

use std::sync::Arc;

use chrono::Utc;
use powerlink_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{
    OutageReport,
    outage_report::{self, OutageStatus},
};

/// Repository for outage report operations.
#[derive(Clone)]
pub struct OutageReportRepository {
    db: Arc<DatabaseConnection>,
}

impl OutageReportRepository {
    /// Create a new outage report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a report by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<outage_report::Model>> {
        OutageReport::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a report by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<outage_report::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Outage report not found".to_string()))
    }

    /// Reports that are not yet resolved, newest first.
    pub async fn find_active(&self) -> AppResult<Vec<outage_report::Model>> {
        OutageReport::find()
            .filter(outage_report::Column::Status.ne(OutageStatus::Resolved))
            .order_by(outage_report::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new report.
    pub async fn create(&self, model: outage_report::ActiveModel) -> AppResult<outage_report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the status; technician notes are replaced only when supplied.
    pub async fn update_status(
        &self,
        id: &str,
        status: OutageStatus,
        technician_notes: Option<String>,
    ) -> AppResult<outage_report::Model> {
        let report = self.get_by_id(id).await?;
        let mut active: outage_report::ActiveModel = report.into();

        active.status = Set(status);
        if let Some(notes) = technician_notes {
            active.technician_notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::outage_report::Urgency;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};

    fn create_test_report(id: &str, status: OutageStatus) -> outage_report::Model {
        outage_report::Model {
            id: id.to_string(),
            title: "No power on Churchill Road".to_string(),
            description: "Whole block is dark since 6pm".to_string(),
            outage_type: "power_outage".to_string(),
            urgency: Urgency::High,
            status,
            latitude: Some(9.0108),
            longitude: Some(38.7613),
            address: "Churchill Road, Addis Ababa".to_string(),
            estimated_affected: Some("50-100".to_string()),
            reason: None,
            technician_notes: None,
            reported_by: None,
            assigned_to: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_active_filter_excludes_resolved() {
        let sql = OutageReport::find()
            .filter(outage_report::Column::Status.ne(OutageStatus::Resolved))
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains("\"status\" <> 'resolved'"), "{sql}");
    }

    #[tokio::test]
    async fn test_find_active_returns_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_report("o1", OutageStatus::Pending),
                    create_test_report("o2", OutageStatus::InProgress),
                ]])
                .into_connection(),
        );

        let repo = OutageReportRepository::new(db);
        let reports = repo.find_active().await.unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.status != OutageStatus::Resolved));
    }

    #[tokio::test]
    async fn test_update_status_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<outage_report::Model>::new()])
                .into_connection(),
        );

        let repo = OutageReportRepository::new(db);
        let result = repo
            .update_status("missing", OutageStatus::Resolved, None)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_status_keeps_notes_when_absent() {
        let mut report = create_test_report("o1", OutageStatus::Assigned);
        report.technician_notes = Some("Transformer tripped".to_string());
        let updated = outage_report::Model {
            status: OutageStatus::Resolved,
            ..report.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[report], [updated]])
                .into_connection(),
        );

        let repo = OutageReportRepository::new(db);
        let result = repo
            .update_status("o1", OutageStatus::Resolved, None)
            .await
            .unwrap();

        assert_eq!(result.status, OutageStatus::Resolved);
        assert_eq!(result.technician_notes.as_deref(), Some("Transformer tripped"));
    }
}
