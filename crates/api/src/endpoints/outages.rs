//! Outage report endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, patch},
};
use powerlink_common::AppResult;
use powerlink_core::{CreateOutageInput, Operation, UpdateOutageStatusInput, require_role};

use crate::{
    extractors::{ApiJson, AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Create outage router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_active).post(report_outage))
        .route("/{id}", get(get_outage))
        .route("/{id}/status", patch(update_status))
}

/// Unresolved outages for the public map.
async fn list_active(State(state): State<AppState>) -> AppResult<ApiResponse> {
    let outages = state.outage_service.list_active().await?;
    ApiResponse::ok().with("outages", outages)
}

/// Anyone may report an outage; signed-in reporters are recorded.
async fn report_outage(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateOutageInput>,
) -> AppResult<ApiResponse> {
    let reporter = user.as_ref().map(|u| u.id.as_str());
    let outage = state.outage_service.create(input, reporter).await?;

    ApiResponse::created()
        .message("Outage report created successfully")
        .with("outage", outage)
}

async fn get_outage(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse> {
    let outage = state.outage_service.get(&id).await?;
    ApiResponse::ok().with("outage", outage)
}

async fn update_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateOutageStatusInput>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::UpdateOutageStatus)?;

    let outage = state.outage_service.update_status(&id, input).await?;
    ApiResponse::ok()
        .message("Outage status updated successfully")
        .with("outage", outage)
}
