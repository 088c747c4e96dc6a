//! Service request endpoints.

use axum::{
    Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::{get, patch, post},
};
use bytes::Bytes;
use powerlink_common::{AppError, AppResult};
use powerlink_core::{
    CreateServiceRequestInput, Operation, UpdateServiceRequestInput, UpdateStatusInput,
    require_role, require_self_or,
};
use powerlink_db::{
    entities::service_request::{Priority, RequestStatus},
    repositories::ServiceRequestFilter,
};
use serde::Deserialize;

use crate::{
    extractors::{ApiJson, AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Create service request router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests).post(submit_request))
        .route("/pending", get(list_pending))
        .route("/user/{user_id}", get(list_by_user))
        .route("/{id}", get(get_request).patch(update_request))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/approve", post(approve_request))
        .route("/{id}/reject", post(reject_request))
}

/// Listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<RequestStatus>,
    pub priority: Option<Priority>,
}

/// Optional body of approve and reject.
#[derive(Debug, Default, Deserialize)]
pub struct DecisionRequest {
    #[serde(alias = "supervisorNotes", alias = "notes")]
    pub supervisor_notes: Option<String>,
}

impl DecisionRequest {
    fn parse(body: &Bytes) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

async fn list_requests(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ViewServiceRequests)?;

    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let requests = state
        .service_request_service
        .list_all(ServiceRequestFilter {
            status: query.status,
            priority: query.priority,
        })
        .await?;

    ApiResponse::ok().with_list("requests", &requests)
}

/// Supervisor triage queue.
async fn list_pending(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::TriageServiceRequests)?;

    let requests = state.service_request_service.list_pending().await?;
    ApiResponse::ok().with_list("requests", &requests)
}

/// A customer's own tickets.
async fn list_by_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse> {
    require_self_or(&user, &user_id, Operation::ViewServiceRequests)?;

    let tickets = state.service_request_service.list_by_user(&user_id).await?;
    ApiResponse::ok().with_list("tickets", &tickets)
}

async fn get_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ViewServiceRequests)?;

    let request = state.service_request_service.get(&id).await?;
    ApiResponse::ok().with("request", request)
}

/// Public submission; signed-in callers become the creator.
async fn submit_request(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateServiceRequestInput>,
) -> AppResult<ApiResponse> {
    let creator = user.as_ref().map(|u| u.id.as_str());
    let request = state.service_request_service.create(input, creator).await?;

    ApiResponse::created()
        .message("Service request created successfully")
        .with("request", request)
}

async fn update_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateServiceRequestInput>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::TriageServiceRequests)?;

    let request = state.service_request_service.update(&id, input).await?;
    ApiResponse::ok()
        .message("Service request updated successfully")
        .with("request", request)
}

async fn update_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateStatusInput>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::TriageServiceRequests)?;

    let request = state
        .service_request_service
        .update_status(&id, input)
        .await?;
    ApiResponse::ok()
        .message("Service request status updated successfully")
        .with("request", request)
}

async fn approve_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::TriageServiceRequests)?;

    let decision = DecisionRequest::parse(&body)?;
    let request = state
        .service_request_service
        .approve(&id, decision.supervisor_notes)
        .await?;
    ApiResponse::ok()
        .message("Service request approved")
        .with("request", request)
}

async fn reject_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::TriageServiceRequests)?;

    let decision = DecisionRequest::parse(&body)?;
    let request = state
        .service_request_service
        .reject(&id, decision.supervisor_notes)
        .await?;
    ApiResponse::ok()
        .message("Service request rejected")
        .with("request", request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_body_variants() {
        let empty = DecisionRequest::parse(&Bytes::new()).unwrap();
        assert!(empty.supervisor_notes.is_none());

        let snake = DecisionRequest::parse(&Bytes::from_static(
            br#"{"supervisor_notes":"Site visit done"}"#,
        ))
        .unwrap();
        assert_eq!(snake.supervisor_notes.as_deref(), Some("Site visit done"));

        let camel =
            DecisionRequest::parse(&Bytes::from_static(br#"{"supervisorNotes":"ok"}"#)).unwrap();
        assert_eq!(camel.supervisor_notes.as_deref(), Some("ok"));

        assert!(DecisionRequest::parse(&Bytes::from_static(b"{nope")).is_err());
    }
}
