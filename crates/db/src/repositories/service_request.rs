//! Service request repository.

use std::sync::Arc;

use chrono::Utc;
use powerlink_common::{AppError, AppResult};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Iterable, Order,
    QueryFilter, QueryOrder, Select, Set,
    sea_query::{Expr, SimpleExpr},
};

use super::map_write_error;
use crate::entities::{
    ServiceRequest,
    service_request::{self, Priority, RequestStatus},
};

/// Optional filters for the staff listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceRequestFilter {
    pub status: Option<RequestStatus>,
    pub priority: Option<Priority>,
}

/// Partial update applied by triage actions. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ServiceRequestUpdate {
    pub status: Option<RequestStatus>,
    pub priority: Option<Priority>,
    pub supervisor_notes: Option<String>,
    pub assigned_to: Option<String>,
}

/// `CASE priority WHEN 'high' THEN 1 ... END`, built from [`Priority::rank`].
fn priority_rank() -> SimpleExpr {
    let arms: String = Priority::iter()
        .map(|p| format!(" WHEN '{}' THEN {}", p.to_value(), p.rank()))
        .collect();
    Expr::cust(format!("CASE priority{arms} END"))
}

/// Staff listing: optional filters, priority rank then oldest first.
#[must_use]
pub fn list_query(filter: ServiceRequestFilter) -> Select<service_request::Entity> {
    let mut query = ServiceRequest::find();
    if let Some(status) = filter.status {
        query = query.filter(service_request::Column::Status.eq(status));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(service_request::Column::Priority.eq(priority));
    }
    query
        .order_by(priority_rank(), Order::Asc)
        .order_by(service_request::Column::CreatedAt, Order::Asc)
}

/// Triage queue: pending and under review, priority rank then FIFO.
#[must_use]
pub fn pending_query() -> Select<service_request::Entity> {
    ServiceRequest::find()
        .filter(
            service_request::Column::Status
                .is_in(RequestStatus::iter().filter(|s| s.is_awaiting_triage())),
        )
        .order_by(priority_rank(), Order::Asc)
        .order_by(service_request::Column::CreatedAt, Order::Asc)
}

/// Repository for service request operations.
#[derive(Clone)]
pub struct ServiceRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl ServiceRequestRepository {
    /// Create a new service request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a request by primary key.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<service_request::Model>> {
        ServiceRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a request by primary key, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<service_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Service request not found".to_string()))
    }

    /// Find a request by its ticket number.
    pub async fn find_by_ticket_id(
        &self,
        ticket_id: &str,
    ) -> AppResult<Option<service_request::Model>> {
        ServiceRequest::find()
            .filter(service_request::Column::TicketId.eq(ticket_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new request. A duplicate ticket number yields `Conflict`.
    pub async fn create(
        &self,
        model: service_request::ActiveModel,
    ) -> AppResult<service_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_write_error(e, "Ticket ID already exists"))
    }

    /// All requests matching `filter`.
    pub async fn find_all(
        &self,
        filter: ServiceRequestFilter,
    ) -> AppResult<Vec<service_request::Model>> {
        list_query(filter)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests awaiting triage.
    pub async fn find_pending(&self) -> AppResult<Vec<service_request::Model>> {
        pending_query()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests submitted by a user, newest first.
    pub async fn find_by_creator(&self, user_id: &str) -> AppResult<Vec<service_request::Model>> {
        ServiceRequest::find()
            .filter(service_request::Column::CreatedBy.eq(user_id))
            .order_by(service_request::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a partial update. Unknown ids yield `NotFound` without writing.
    pub async fn update(
        &self,
        id: &str,
        changes: ServiceRequestUpdate,
    ) -> AppResult<service_request::Model> {
        let request = self.get_by_id(id).await?;
        let mut active: service_request::ActiveModel = request.into();

        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        if let Some(priority) = changes.priority {
            active.priority = Set(priority);
        }
        if let Some(notes) = changes.supervisor_notes {
            active.supervisor_notes = Set(Some(notes));
        }
        if let Some(assigned_to) = changes.assigned_to {
            active.assigned_to = Set(Some(assigned_to));
        }

        active.updated_at = Set(Utc::now());

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
