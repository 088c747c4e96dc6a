//! Document attachment service.
//!
//! Uploads are checked as a whole batch before anything touches storage. A
//! write failure part-way through removes the files this batch already wrote.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use powerlink_common::{
    AppError, AppResult, IdGenerator, StorageBackend, config::UploadsConfig, file_extension,
    generate_stored_name, guess_content_type, is_safe_segment,
};
use powerlink_db::entities::service_request::DocumentMeta;
use serde::Serialize;
use tracing::{info, warn};

/// MIME types accepted for ticket documents.
pub const ALLOWED_CONTENT_TYPES: [&str; 6] = [
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// File extensions accepted for each allowed type. The first is used when
/// the client's name carries none of them.
static TYPE_EXTENSIONS: [(&str, &[&str]); 6] = [
    ("application/pdf", &["pdf"]),
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/jpg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("application/msword", &["doc"]),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        &["docx"],
    ),
];

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Folder used when an upload names no ticket.
pub const DEFAULT_TICKET_FOLDER: &str = "general";

/// One file taken from a multipart upload.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Form field the file arrived in.
    pub field: String,
    /// Client-side file name.
    pub file_name: String,
    /// Declared MIME type, if the client sent one.
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl IncomingFile {
    /// Declared type without parameters, falling back to a guess from the name.
    fn effective_content_type(&self) -> String {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| guess_content_type(&self.file_name))
    }
}

/// Metadata returned for each stored file, in submission order.
#[derive(Debug, Clone, Serialize)]
pub struct StoredDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub index: usize,
}

/// Result of storing a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBatch {
    /// Folder the batch was written to.
    pub ticket_id: String,
    pub documents: Vec<StoredDocument>,
}

/// How a stored file should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieveMode {
    Download,
    Preview,
}

/// A stored file ready to be sent.
#[derive(Debug, Clone)]
pub struct RetrievedFile {
    pub data: Vec<u8>,
    pub content_type: String,
    /// `Content-Disposition` header value.
    pub disposition: String,
}

/// Attachment service over a [`StorageBackend`].
#[derive(Clone)]
pub struct AttachmentService {
    storage: Arc<dyn StorageBackend>,
    max_file_size: u64,
    max_files: usize,
    id_gen: IdGenerator,
}

impl AttachmentService {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>, uploads: &UploadsConfig) -> Self {
        Self {
            storage,
            max_file_size: uploads.max_file_size,
            max_files: uploads.max_files,
            id_gen: IdGenerator::new(),
        }
    }

    /// Validate and store a batch of files under `ticket_id`.
    pub async fn store(
        &self,
        ticket_id: Option<&str>,
        files: Vec<IncomingFile>,
    ) -> AppResult<StoredBatch> {
        let ticket = match ticket_id.map(str::trim) {
            None | Some("") => DEFAULT_TICKET_FOLDER,
            Some(ticket) if is_ticket_segment(ticket) => ticket,
            Some(_) => return Err(AppError::Validation("Invalid ticket ID".to_string())),
        };

        if files.is_empty() {
            return Err(AppError::Validation("No files uploaded".to_string()));
        }
        if files.len() > self.max_files {
            return Err(AppError::Validation(format!(
                "At most {} files can be uploaded at once",
                self.max_files
            )));
        }

        let mut accepted = Vec::with_capacity(files.len());
        for file in files {
            let content_type = file.effective_content_type();
            if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
                return Err(AppError::UnsupportedType(format!(
                    "{} has unsupported type {content_type}",
                    file.file_name
                )));
            }
            if file.data.len() as u64 > self.max_file_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "{} exceeds the {} byte limit",
                    file.file_name, self.max_file_size
                )));
            }
            accepted.push((file, content_type));
        }

        let mut written: Vec<String> = Vec::with_capacity(accepted.len());
        let mut stored = Vec::with_capacity(accepted.len());

        for (index, (file, content_type)) in accepted.into_iter().enumerate() {
            let extension = stored_extension(&file.file_name, &content_type);
            let stored_name =
                generate_stored_name(&file.field, extension, self.id_gen.generate_suffix());
            let key = format!("{ticket}/{stored_name}");

            let object = match self.storage.upload(&key, &file.data, &content_type).await {
                Ok(object) => object,
                Err(e) => {
                    self.discard(&written).await;
                    return Err(e);
                }
            };
            written.push(object.key);

            stored.push(StoredDocument {
                meta: DocumentMeta {
                    name: file.file_name,
                    stored_name,
                    path: object.url,
                    size: object.size,
                    content_type: object.content_type,
                    uploaded_at: Utc::now(),
                },
                index,
            });
        }

        info!(ticket = %ticket, files = stored.len(), "Stored ticket documents");
        Ok(StoredBatch {
            ticket_id: ticket.to_string(),
            documents: stored,
        })
    }

    /// Load a stored file. Unsafe names are reported as missing.
    pub async fn retrieve(
        &self,
        ticket_id: &str,
        filename: &str,
        mode: RetrieveMode,
    ) -> AppResult<RetrievedFile> {
        let not_found = || AppError::NotFound("File not found".to_string());

        if !is_safe_segment(ticket_id) || !is_safe_segment(filename) {
            return Err(not_found());
        }

        let data = self
            .storage
            .read(&format!("{ticket_id}/{filename}"))
            .await?
            .ok_or_else(not_found)?;

        let disposition = match mode {
            RetrieveMode::Download => format!("attachment; filename=\"{filename}\""),
            RetrieveMode::Preview => "inline".to_string(),
        };

        let content_type = Some(guess_content_type(filename))
            .filter(|ct| ALLOWED_CONTENT_TYPES.contains(&ct.as_str()))
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

        Ok(RetrievedFile {
            data,
            content_type,
            disposition,
        })
    }

    async fn discard(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.storage.delete(key).await {
                warn!(key = %key, error = %e, "Failed to remove partial upload");
            }
        }
        if !keys.is_empty() {
            warn!(files = keys.len(), "Rolled back partially stored batch");
        }
    }
}

/// Extension to store a file of `content_type` under.
///
/// The client's extension is kept only when it belongs to the validated type.
fn stored_extension(file_name: &str, content_type: &str) -> &'static str {
    let Some(&(_, extensions)) = TYPE_EXTENSIONS.iter().find(|(ct, _)| *ct == content_type)
    else {
        return "";
    };
    let given = file_extension(file_name);
    extensions
        .iter()
        .copied()
        .find(|ext| given.as_deref() == Some(*ext))
        .or_else(|| extensions.first().copied())
        .unwrap_or_default()
}

fn is_ticket_segment(ticket: &str) -> bool {
    ticket.len() <= 64
        && !ticket.is_empty()
        && ticket
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}
