//! Document upload and download endpoints.

use axum::{
    Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use powerlink_common::{AppError, AppResult};
use powerlink_core::{IncomingFile, RetrieveMode};

use crate::{middleware::AppState, response::ApiResponse};

const FILE_FIELD: &str = "documents";
const TICKET_FIELD: &str = "ticketId";

/// Create uploads router. `body_limit` caps the multipart request size.
pub fn router(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/service-documents",
            post(upload_documents).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/download/{ticket_id}/{filename}", get(download))
        .route("/preview/{ticket_id}/{filename}", get(preview))
}

fn multipart_error(e: &MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Accept up to the configured number of files in the `documents` field.
async fn upload_documents(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<ApiResponse> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let mut ticket_id: Option<String> = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == TICKET_FIELD {
            ticket_id = Some(field.text().await.map_err(|e| multipart_error(&e))?);
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if name != FILE_FIELD {
            return Err(AppError::BadRequest(format!("Unexpected file field: {name}")));
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| multipart_error(&e))?;

        files.push(IncomingFile {
            field: name,
            file_name,
            content_type,
            data,
        });
    }

    let batch = state
        .attachment_service
        .store(ticket_id.as_deref(), files)
        .await?;

    ApiResponse::ok()
        .message("Files uploaded successfully")
        .with("documents", batch.documents)?
        .with("ticketId", batch.ticket_id)
}

async fn download(
    State(state): State<AppState>,
    Path((ticket_id, filename)): Path<(String, String)>,
) -> AppResult<Response> {
    send_file(&state, &ticket_id, &filename, RetrieveMode::Download).await
}

async fn preview(
    State(state): State<AppState>,
    Path((ticket_id, filename)): Path<(String, String)>,
) -> AppResult<Response> {
    send_file(&state, &ticket_id, &filename, RetrieveMode::Preview).await
}

async fn send_file(
    state: &AppState,
    ticket_id: &str,
    filename: &str,
    mode: RetrieveMode,
) -> AppResult<Response> {
    let file = state
        .attachment_service
        .retrieve(ticket_id, filename, mode)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, file.disposition),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        ],
        file.data,
    )
        .into_response())
}
