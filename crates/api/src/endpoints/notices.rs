//! Notice endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{delete, get},
};
use powerlink_common::AppResult;
use powerlink_core::{CreateNoticeInput, Operation, require_role};

use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Create notice router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notices).post(create_notice))
        .route("/{id}", delete(delete_notice))
}

async fn list_notices(State(state): State<AppState>) -> AppResult<ApiResponse> {
    let notices = state.notice_service.list().await?;
    ApiResponse::ok().with("notices", notices)
}

async fn create_notice(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateNoticeInput>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageNotices)?;

    let notice = state.notice_service.create(input).await?;
    ApiResponse::created()
        .message("Notice created successfully")
        .with("notice", notice)
}

async fn delete_notice(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse> {
    require_role(&user, Operation::ManageNotices)?;

    state.notice_service.delete(&id).await?;
    Ok(ApiResponse::ok().message("Notice deleted successfully"))
}
