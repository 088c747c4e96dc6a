//! API endpoints.

mod announcements;
mod auth;
mod health;
mod notices;
mod outages;
mod service_requests;
mod uploads;
mod users;

use axum::Router;
use powerlink_common::config::UploadsConfig;

use crate::middleware::AppState;

/// Multipart overhead allowed on top of the file bytes of a full batch.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Body limit for the upload route: a full batch of maximum-size files.
#[must_use]
pub fn upload_body_limit(uploads: &UploadsConfig) -> usize {
    let per_file = usize::try_from(uploads.max_file_size).unwrap_or(usize::MAX);
    uploads
        .max_files
        .saturating_mul(per_file)
        .saturating_add(MULTIPART_OVERHEAD)
}

/// Create the API router.
pub fn router(uploads: &UploadsConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/announcements", announcements::router())
        .nest("/notices", notices::router())
        .nest("/outages", outages::router())
        .nest("/service-requests", service_requests::router())
        .nest("/uploads", uploads::router(upload_body_limit(uploads)))
        .merge(health::router())
}
