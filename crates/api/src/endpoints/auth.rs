//! Authentication endpoints.

use axum::{Router, extract::State, routing::post};
use powerlink_common::AppResult;
use powerlink_core::RegisterInput;
use serde::Deserialize;

use crate::{
    extractors::{ApiJson, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Create auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Register a new account.
async fn register(
    MaybeAuthUser(actor): MaybeAuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> AppResult<ApiResponse> {
    let user = state.user_service.register(input, actor.as_ref()).await?;

    ApiResponse::created()
        .message("User registered successfully")
        .with("user", user)
}

/// Sign in with email and password.
async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<ApiResponse> {
    let outcome = state.user_service.login(&req.email, &req.password).await?;

    ApiResponse::ok()
        .message("Login successful")
        .with("token", outcome.token)?
        .with("user", outcome.user)
}
