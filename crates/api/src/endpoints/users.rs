//! User administration endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, patch},
};
use powerlink_common::AppResult;
use powerlink_core::{Operation, UpdateUserInput, require_role, require_self_or};
use serde::Deserialize;

use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Create users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/role", patch(update_role))
        .route("/{id}/toggle", patch(toggle_active))
}

/// Role change request.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    #[serde(default)]
    pub role: String,
}

async fn list_users(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageUsers)?;

    let users = state.user_service.list().await?;
    ApiResponse::ok().with("users", users)
}

async fn get_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse> {
    require_self_or(&user, &id, Operation::ManageUsers)?;

    let found = state.user_service.get(&id).await?;
    ApiResponse::ok().with("user", found)
}

async fn update_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateUserInput>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageUsers)?;

    let updated = state.user_service.update(&id, input).await?;
    ApiResponse::ok()
        .message("User updated successfully")
        .with("user", updated)
}

async fn delete_user(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageUsers)?;

    state.user_service.delete(&id).await?;
    Ok(ApiResponse::ok().message("User deleted successfully"))
}

async fn update_role(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<RoleRequest>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageUsers)?;

    let updated = state.user_service.update_role(&id, &req.role).await?;
    ApiResponse::ok()
        .message("User role updated successfully")
        .with("user", updated)
}

async fn toggle_active(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageUsers)?;

    let updated = state.user_service.toggle_active(&id).await?;
    ApiResponse::ok()
        .message("User status updated successfully")
        .with("user", updated)
}
