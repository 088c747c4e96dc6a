//! Service request service: submission and supervisor triage.

use std::collections::HashMap;

use chrono::Utc;
use powerlink_common::{AppError, AppResult, IdGenerator};
use powerlink_db::{
    entities::{
        service_request::{self, DocumentMeta, Priority, RequestStatus},
        user::{self, Role},
    },
    repositories::{
        ServiceRequestFilter, ServiceRequestRepository, ServiceRequestUpdate, UserRepository,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use super::require_present;

/// Input for submitting a service request.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequestInput {
    #[serde(default, alias = "ticket_id")]
    #[validate(length(max = 64))]
    pub ticket_id: String,

    #[serde(default, alias = "service_type")]
    #[validate(length(max = 50))]
    pub service_type: String,

    #[serde(default, alias = "full_name")]
    #[validate(length(max = 200))]
    pub full_name: String,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub phone: String,

    pub city: Option<String>,
    pub woreda: Option<String>,
    pub kebele: Option<String>,

    #[serde(alias = "house_plot_number")]
    pub house_plot_number: Option<String>,

    #[serde(alias = "nearby_landmark")]
    pub nearby_landmark: Option<String>,

    #[serde(default, alias = "full_address")]
    pub full_address: String,

    #[serde(default)]
    pub documents: Vec<DocumentMeta>,
}

/// Generic partial update (`PATCH /service-requests/:id`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequestInput {
    pub status: Option<RequestStatus>,
    pub priority: Option<Priority>,
    #[serde(alias = "supervisor_notes")]
    pub supervisor_notes: Option<String>,
    #[serde(alias = "assigned_to")]
    pub assigned_to: Option<String>,
}

/// Status change; `status` is mandatory.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusInput {
    pub status: Option<RequestStatus>,
    #[serde(alias = "supervisor_notes")]
    pub supervisor_notes: Option<String>,
    #[serde(alias = "assigned_to")]
    pub assigned_to: Option<String>,
}

/// A request with the creator and assignee usernames resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRequestView {
    #[serde(flatten)]
    pub request: service_request::Model,
    pub created_by_username: Option<String>,
    pub assigned_to_username: Option<String>,
}

/// A customer's own request with the assigned technician's full name.
#[derive(Debug, Clone, Serialize)]
pub struct UserServiceRequestView {
    #[serde(flatten)]
    pub request: service_request::Model,
    pub assigned_to_name: Option<String>,
}

/// Service request service for business logic.
#[derive(Clone)]
pub struct ServiceRequestService {
    request_repo: ServiceRequestRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ServiceRequestService {
    /// Create a new service request service.
    #[must_use]
    pub const fn new(request_repo: ServiceRequestRepository, user_repo: UserRepository) -> Self {
        Self {
            request_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new request. `created_by` is the authenticated caller, if any.
    pub async fn create(
        &self,
        input: CreateServiceRequestInput,
        created_by: Option<&str>,
    ) -> AppResult<service_request::Model> {
        input.validate()?;
        require_present(&input.ticket_id, "ticketId")?;
        require_present(&input.service_type, "serviceType")?;
        require_present(&input.full_name, "fullName")?;
        require_present(&input.phone, "phone")?;
        require_present(&input.full_address, "fullAddress")?;

        if input.documents.is_empty() {
            return Err(AppError::Validation(
                "At least one document is required".to_string(),
            ));
        }

        if self
            .request_repo
            .find_by_ticket_id(&input.ticket_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Ticket ID already exists".to_string()));
        }

        let documents = serde_json::to_value(&input.documents)
            .map_err(|e| AppError::Internal(format!("Failed to encode documents: {e}")))?;
        let now = Utc::now();

        let model = service_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            ticket_id: Set(input.ticket_id),
            service_type: Set(input.service_type),
            full_name: Set(input.full_name),
            phone: Set(input.phone),
            city: Set(input.city),
            woreda: Set(input.woreda),
            kebele: Set(input.kebele),
            house_plot_number: Set(input.house_plot_number),
            nearby_landmark: Set(input.nearby_landmark),
            full_address: Set(input.full_address),
            documents: Set(documents),
            status: Set(RequestStatus::Pending),
            priority: Set(Priority::Medium),
            assigned_to: Set(None),
            created_by: Set(created_by.map(str::to_string)),
            supervisor_notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let request = self.request_repo.create(model).await?;
        info!(
            request_id = %request.id,
            ticket_id = %request.ticket_id,
            documents = input.documents.len(),
            "Service request submitted"
        );
        Ok(request)
    }

    /// Staff listing with optional filters.
    pub async fn list_all(
        &self,
        filter: ServiceRequestFilter,
    ) -> AppResult<Vec<ServiceRequestView>> {
        let requests = self.request_repo.find_all(filter).await?;
        self.with_usernames(requests).await
    }

    /// Triage queue.
    pub async fn list_pending(&self) -> AppResult<Vec<service_request::Model>> {
        self.request_repo.find_pending().await
    }

    /// Requests submitted by `user_id`, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<UserServiceRequestView>> {
        let requests = self.request_repo.find_by_creator(user_id).await?;
        let ids: Vec<String> = requests
            .iter()
            .filter_map(|r| r.assigned_to.clone())
            .collect();
        let users = self.load_users(ids).await?;

        Ok(requests
            .into_iter()
            .map(|request| {
                let assigned_to_name = request
                    .assigned_to
                    .as_ref()
                    .and_then(|id| users.get(id))
                    .map(user::Model::display_name);
                UserServiceRequestView {
                    request,
                    assigned_to_name,
                }
            })
            .collect())
    }

    /// A single request with names resolved.
    pub async fn get(&self, id: &str) -> AppResult<ServiceRequestView> {
        let request = self.request_repo.get_by_id(id).await?;
        let mut views = self.with_usernames(vec![request]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("Request vanished while resolving names".to_string()))
    }

    /// Generic partial update.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateServiceRequestInput,
    ) -> AppResult<service_request::Model> {
        self.apply(
            id,
            ServiceRequestUpdate {
                status: input.status,
                priority: input.priority,
                supervisor_notes: input.supervisor_notes,
                assigned_to: input.assigned_to,
            },
        )
        .await
    }

    /// Set the status, optionally with notes and an assignee.
    pub async fn update_status(
        &self,
        id: &str,
        input: UpdateStatusInput,
    ) -> AppResult<service_request::Model> {
        let status = input
            .status
            .ok_or_else(|| AppError::Validation("Status is required".to_string()))?;

        self.apply(
            id,
            ServiceRequestUpdate {
                status: Some(status),
                priority: None,
                supervisor_notes: input.supervisor_notes,
                assigned_to: input.assigned_to,
            },
        )
        .await
    }

    /// Approve a request.
    pub async fn approve(
        &self,
        id: &str,
        notes: Option<String>,
    ) -> AppResult<service_request::Model> {
        self.decide(id, RequestStatus::Approved, notes).await
    }

    /// Reject a request.
    pub async fn reject(
        &self,
        id: &str,
        notes: Option<String>,
    ) -> AppResult<service_request::Model> {
        self.decide(id, RequestStatus::Rejected, notes).await
    }

    async fn decide(
        &self,
        id: &str,
        status: RequestStatus,
        notes: Option<String>,
    ) -> AppResult<service_request::Model> {
        self.apply(
            id,
            ServiceRequestUpdate {
                status: Some(status),
                supervisor_notes: notes,
                ..Default::default()
            },
        )
        .await
    }

    async fn apply(
        &self,
        id: &str,
        changes: ServiceRequestUpdate,
    ) -> AppResult<service_request::Model> {
        let current = self.request_repo.get_by_id(id).await?;

        if let Some(technician_id) = &changes.assigned_to {
            self.ensure_technician(technician_id).await?;
        }

        if let Some(to) = changes.status {
            if !current.status.is_intended_transition(to) {
                warn!(
                    request_id = %id,
                    from = ?current.status,
                    to = ?to,
                    "Service request skipped the usual status flow"
                );
            }
        }

        let request = self.request_repo.update(id, changes).await?;
        info!(request_id = %request.id, status = ?request.status, "Service request updated");
        Ok(request)
    }

    async fn ensure_technician(&self, user_id: &str) -> AppResult<()> {
        match self.user_repo.find_by_id(user_id).await? {
            Some(user) if user.role == Role::Technician => Ok(()),
            _ => Err(AppError::Validation(
                "Assigned user must be an existing technician".to_string(),
            )),
        }
    }

    async fn load_users(&self, mut ids: Vec<String>) -> AppResult<HashMap<String, user::Model>> {
        ids.sort_unstable();
        ids.dedup();

        Ok(self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect())
    }

    async fn with_usernames(
        &self,
        requests: Vec<service_request::Model>,
    ) -> AppResult<Vec<ServiceRequestView>> {
        let ids: Vec<String> = requests
            .iter()
            .flat_map(|r| [r.created_by.clone(), r.assigned_to.clone()])
            .flatten()
            .collect();
        let users = self.load_users(ids).await?;
        let username = |id: &Option<String>| {
            id.as_ref()
                .and_then(|id| users.get(id))
                .map(|u| u.username.clone())
        };

        Ok(requests
            .into_iter()
            .map(|request| ServiceRequestView {
                created_by_username: username(&request.created_by),
                assigned_to_username: username(&request.assigned_to),
                request,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_request(id: &str, ticket_id: &str) -> service_request::Model {
        service_request::Model {
            id: id.to_string(),
            ticket_id: ticket_id.to_string(),
            service_type: "new_connection".to_string(),
            full_name: "Almaz Tesfaye".to_string(),
            phone: "+251911000000".to_string(),
            city: Some("Addis Ababa".to_string()),
            woreda: None,
            kebele: None,
            house_plot_number: None,
            nearby_landmark: None,
            full_address: "Bole, near Edna Mall".to_string(),
            documents: serde_json::json!([]),
            status: RequestStatus::Pending,
            priority: Priority::High,
            assigned_to: None,
            created_by: None,
            supervisor_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_test_user(id: &str, role: Role) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            username: id.to_string(),
            password_hash: "hash".to_string(),
            first_name: "Dawit".to_string(),
            last_name: "Bekele".to_string(),
            role,
            is_active: true,
            is_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn document() -> DocumentMeta {
        DocumentMeta {
            name: "id-card.pdf".to_string(),
            stored_name: "documents-1700000000000-1.pdf".to_string(),
            path: "/uploads/T-1/documents-1700000000000-1.pdf".to_string(),
            size: 1024,
            content_type: "application/pdf".to_string(),
            uploaded_at: Utc::now(),
        }
    }

    fn create_input(ticket_id: &str) -> CreateServiceRequestInput {
        CreateServiceRequestInput {
            ticket_id: ticket_id.to_string(),
            service_type: "new_connection".to_string(),
            full_name: "Almaz Tesfaye".to_string(),
            phone: "+251911000000".to_string(),
            full_address: "Bole, near Edna Mall".to_string(),
            documents: vec![document()],
            ..Default::default()
        }
    }

    fn service(db: MockDatabase) -> (ServiceRequestService, Arc<sea_orm::DatabaseConnection>) {
        let conn = Arc::new(db.into_connection());
        let service = ServiceRequestService::new(
            ServiceRequestRepository::new(conn.clone()),
            UserRepository::new(conn.clone()),
        );
        (service, conn)
    }

    fn statements(
        service: ServiceRequestService,
        conn: Arc<sea_orm::DatabaseConnection>,
    ) -> Vec<String> {
        drop(service);
        Arc::try_unwrap(conn)
            .unwrap()
            .into_transaction_log()
            .into_iter()
            .map(|t| format!("{t:?}"))
            .collect()
    }

    #[tokio::test]
    async fn test_create_requires_documents() {
        let (service, _) = service(MockDatabase::new(DatabaseBackend::Postgres));

        let mut input = create_input("T-1");
        input.documents.clear();
        let result = service.create(input, None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_required_field() {
        let (service, _) = service(MockDatabase::new(DatabaseBackend::Postgres));

        let mut input = create_input("T-1");
        input.full_address = "   ".to_string();
        let result = service.create(input, None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_duplicate_ticket_is_conflict_without_write() {
        let existing = create_test_request("sr1", "T-1");
        let (service, conn) = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let result = service.create(create_input("T-1"), None).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let log = statements(service, conn);
        assert_eq!(log.len(), 1);
        assert!(log[0].contains("SELECT"), "{}", log[0]);
        assert!(!log[0].contains("INSERT"), "{}", log[0]);
    }

    #[tokio::test]
    async fn test_create_sets_defaults() {
        let created = service_request::Model {
            priority: Priority::Medium,
            created_by: Some("u1".to_string()),
            ..create_test_request("sr1", "T-1")
        };
        let (service, _) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<service_request::Model>::new()])
                .append_query_results([[created]]),
        );

        let request = service.create(create_input("T-1"), Some("u1")).await.unwrap();

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.priority, Priority::Medium);
        assert_eq!(request.created_by.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_approve_unknown_is_not_found_without_write() {
        let (service, conn) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<service_request::Model>::new()]),
        );

        let result = service.approve("missing", None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let log = statements(service, conn);
        assert!(log.iter().all(|s| !s.contains("UPDATE")), "{log:?}");
    }

    #[tokio::test]
    async fn test_approve_keeps_other_fields() {
        let request = create_test_request("sr1", "T-1");
        let approved = service_request::Model {
            status: RequestStatus::Approved,
            ..request.clone()
        };
        let (service, _) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request.clone()], [request.clone()], [approved]]),
        );

        let result = service.approve("sr1", None).await.unwrap();

        assert_eq!(result.status, RequestStatus::Approved);
        assert_eq!(result.priority, request.priority);
        assert_eq!(result.full_name, request.full_name);
    }

    #[tokio::test]
    async fn test_update_status_requires_status() {
        let (service, _) = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .update_status("sr1", UpdateStatusInput::default())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_assign_to_non_technician_is_rejected() {
        let request = create_test_request("sr1", "T-1");
        let customer = create_test_user("u2", Role::Customer);
        let (service, _) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request]])
                .append_query_results([[customer]]),
        );

        let result = service
            .update(
                "sr1",
                UpdateServiceRequestInput {
                    assigned_to: Some("u2".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_by_user_resolves_technician_name() {
        let request = service_request::Model {
            assigned_to: Some("tech1".to_string()),
            created_by: Some("u1".to_string()),
            ..create_test_request("sr1", "T-1")
        };
        let unassigned = service_request::Model {
            created_by: Some("u1".to_string()),
            ..create_test_request("sr2", "T-2")
        };
        let technician = create_test_user("tech1", Role::Technician);
        let (service, _) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request, unassigned]])
                .append_query_results([[technician]]),
        );

        let views = service.list_by_user("u1").await.unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].assigned_to_name.as_deref(), Some("Dawit Bekele"));
        assert_eq!(views[1].assigned_to_name, None);
    }

    #[tokio::test]
    async fn test_get_resolves_usernames() {
        let request = service_request::Model {
            created_by: Some("u1".to_string()),
            ..create_test_request("sr1", "T-1")
        };
        let creator = create_test_user("u1", Role::Customer);
        let (service, _) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request]])
                .append_query_results([[creator]]),
        );

        let view = service.get("sr1").await.unwrap();

        assert_eq!(view.created_by_username.as_deref(), Some("u1"));
        assert_eq!(view.assigned_to_username, None);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["ticket_id"], "T-1");
        assert_eq!(json["created_by_username"], "u1");
    }

    #[tokio::test]
    async fn test_name_lookups_run_on_spawned_tasks() {
        let request = service_request::Model {
            created_by: Some("u1".to_string()),
            assigned_to: Some("tech1".to_string()),
            ..create_test_request("sr1", "T-1")
        };
        let (service, _) = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request.clone()]])
                .append_query_results([[
                    create_test_user("u1", Role::Customer),
                    create_test_user("tech1", Role::Technician),
                ]])
                .append_query_results([[request.clone()]])
                .append_query_results([[create_test_user("tech1", Role::Technician)]])
                .append_query_results([[request]])
                .append_query_results([[
                    create_test_user("u1", Role::Customer),
                    create_test_user("tech1", Role::Technician),
                ]]),
        );

        let listing = service.clone();
        let all = tokio::spawn(async move { listing.list_all(ServiceRequestFilter::default()).await })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(all[0].assigned_to_username.as_deref(), Some("tech1"));

        let by_user = service.clone();
        let mine = tokio::spawn(async move { by_user.list_by_user("u1").await })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mine[0].assigned_to_name.as_deref(), Some("Dawit Bekele"));

        let single = service.clone();
        let view = tokio::spawn(async move { single.get("sr1").await })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.created_by_username.as_deref(), Some("u1"));
    }
}
