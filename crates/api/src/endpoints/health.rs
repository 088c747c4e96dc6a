//! Health check endpoint.

use axum::{Router, extract::State, routing::get};
use chrono::Utc;
use powerlink_common::AppResult;

use crate::{middleware::AppState, response::ApiResponse};

/// Create health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> AppResult<ApiResponse> {
    let database = match powerlink_db::ping(&state.db).await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "unhealthy"
        }
    };

    ApiResponse::ok()
        .with("status", "ok")?
        .with("database", database)?
        .with("timestamp", Utc::now())?
        .with("version", env!("CARGO_PKG_VERSION"))
}
