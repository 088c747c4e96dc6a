//! Outage report service.

use chrono::Utc;
use powerlink_common::{AppResult, IdGenerator};
use powerlink_db::{
    entities::outage_report::{self, OutageStatus, Urgency},
    repositories::OutageReportRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::require_present;

const DEFAULT_OUTAGE_TYPE: &str = "general";

/// Input for reporting an outage.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutageInput {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(alias = "outage_type")]
    #[validate(length(max = 50))]
    pub outage_type: Option<String>,

    pub urgency: Option<Urgency>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub address: String,

    #[serde(alias = "estimated_affected")]
    pub estimated_affected: Option<String>,

    pub reason: Option<String>,
}

/// Status change for an outage report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutageStatusInput {
    pub status: OutageStatus,
    #[serde(alias = "technician_notes")]
    pub technician_notes: Option<String>,
}

/// Outage service for business logic.
#[derive(Clone)]
pub struct OutageService {
    outage_repo: OutageReportRepository,
    id_gen: IdGenerator,
}

impl OutageService {
    /// Create a new outage service.
    #[must_use]
    pub const fn new(outage_repo: OutageReportRepository) -> Self {
        Self {
            outage_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a new report. `reported_by` is the authenticated caller, if any.
    pub async fn create(
        &self,
        input: CreateOutageInput,
        reported_by: Option<&str>,
    ) -> AppResult<outage_report::Model> {
        input.validate()?;
        require_present(&input.title, "title")?;
        require_present(&input.description, "description")?;
        require_present(&input.address, "address")?;

        let outage_type = input
            .outage_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OUTAGE_TYPE.to_string());
        let now = Utc::now();

        let model = outage_report::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            description: Set(input.description),
            outage_type: Set(outage_type),
            urgency: Set(input.urgency.unwrap_or_default()),
            status: Set(OutageStatus::Pending),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            address: Set(input.address),
            estimated_affected: Set(input.estimated_affected),
            reason: Set(input.reason),
            technician_notes: Set(None),
            reported_by: Set(reported_by.map(str::to_string)),
            assigned_to: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let report = self.outage_repo.create(model).await?;
        info!(outage_id = %report.id, urgency = ?report.urgency, "Outage reported");
        Ok(report)
    }

    /// Reports that are not yet resolved, newest first.
    pub async fn list_active(&self) -> AppResult<Vec<outage_report::Model>> {
        self.outage_repo.find_active().await
    }

    pub async fn get(&self, id: &str) -> AppResult<outage_report::Model> {
        self.outage_repo.get_by_id(id).await
    }

    /// Move a report to `status`.
    pub async fn update_status(
        &self,
        id: &str,
        input: UpdateOutageStatusInput,
    ) -> AppResult<outage_report::Model> {
        let report = self
            .outage_repo
            .update_status(id, input.status, input.technician_notes)
            .await?;
        info!(outage_id = %report.id, status = ?report.status, "Outage status updated");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerlink_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_report(id: &str) -> outage_report::Model {
        outage_report::Model {
            id: id.to_string(),
            title: "No power on Bole road".to_string(),
            description: "Whole block is dark since 8pm".to_string(),
            outage_type: DEFAULT_OUTAGE_TYPE.to_string(),
            urgency: Urgency::Medium,
            status: OutageStatus::Pending,
            latitude: Some(8.99),
            longitude: Some(38.79),
            address: "Bole, Addis Ababa".to_string(),
            estimated_affected: None,
            reason: None,
            technician_notes: None,
            reported_by: None,
            assigned_to: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(db: MockDatabase) -> OutageService {
        OutageService::new(OutageReportRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_create_requires_address() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .create(
                CreateOutageInput {
                    title: "No power".to_string(),
                    description: "Dark".to_string(),
                    ..Default::default()
                },
                None,
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_coordinates() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .create(
                CreateOutageInput {
                    title: "No power".to_string(),
                    description: "Dark".to_string(),
                    address: "Bole".to_string(),
                    latitude: Some(123.0),
                    ..Default::default()
                },
                None,
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_report("o1")]]),
        );

        let report = service
            .create(
                CreateOutageInput {
                    title: "No power on Bole road".to_string(),
                    description: "Whole block is dark since 8pm".to_string(),
                    address: "Bole, Addis Ababa".to_string(),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(report.status, OutageStatus::Pending);
        assert_eq!(report.urgency, Urgency::Medium);
        assert_eq!(report.outage_type, "general");
    }

    #[tokio::test]
    async fn test_update_status_unknown_is_not_found() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<outage_report::Model>::new()]),
        );

        let result = service
            .update_status(
                "missing",
                UpdateOutageStatusInput {
                    status: OutageStatus::Resolved,
                    technician_notes: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_status_input_accepts_hyphenated_value() {
        let input: UpdateOutageStatusInput =
            serde_json::from_str(r#"{"status":"in-progress","technicianNotes":"Crew dispatched"}"#)
                .unwrap();

        assert_eq!(input.status, OutageStatus::InProgress);
        assert_eq!(input.technician_notes.as_deref(), Some("Crew dispatched"));
    }
}
