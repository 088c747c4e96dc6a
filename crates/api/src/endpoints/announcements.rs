//! Announcement endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, patch, put},
};
use powerlink_common::AppResult;
use powerlink_core::{
    CreateAnnouncementInput, Operation, UpdateAnnouncementInput, require_role,
};

use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Create announcement router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public).post(create_announcement))
        .route("/admin", get(list_admin))
        .route("/{id}", put(update_announcement).delete(delete_announcement))
        .route("/{id}/toggle", patch(toggle_announcement))
}

/// Public feed.
async fn list_public(State(state): State<AppState>) -> AppResult<ApiResponse> {
    let announcements = state.announcement_service.list_public().await?;
    ApiResponse::ok().with("announcements", announcements)
}

async fn list_admin(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageAnnouncements)?;

    let announcements = state.announcement_service.list_admin().await?;
    ApiResponse::ok().with("announcements", announcements)
}

async fn create_announcement(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateAnnouncementInput>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageAnnouncements)?;

    let announcement = state.announcement_service.create(input, &user.id).await?;
    ApiResponse::created()
        .message("Announcement created successfully")
        .with("announcement", announcement)
}

async fn update_announcement(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateAnnouncementInput>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageAnnouncements)?;

    let announcement = state.announcement_service.update(&id, input).await?;
    ApiResponse::ok()
        .message("Announcement updated successfully")
        .with("announcement", announcement)
}

async fn delete_announcement(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageAnnouncements)?;

    state.announcement_service.delete(&id).await?;
    Ok(ApiResponse::ok().message("Announcement deleted successfully"))
}

async fn toggle_announcement(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageAnnouncements)?;

    let announcement = state.announcement_service.toggle_active(&id).await?;
    ApiResponse::ok()
        .message("Announcement status updated successfully")
        .with("announcement", announcement)
}
