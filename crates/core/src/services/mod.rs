//! Business logic services.

#![allow(missing_docs)]

pub mod access;
pub mod announcement;
pub mod attachment;
pub mod notice;
pub mod outage;
pub mod service_request;
pub mod token;
pub mod user;

pub use access::{Operation, require_role, require_self_or};
pub use announcement::{
    AdminAnnouncementView, AnnouncementService, CreateAnnouncementInput, PUBLIC_FEED_LIMIT,
    UpdateAnnouncementInput,
};
pub use attachment::{
    ALLOWED_CONTENT_TYPES, AttachmentService, IncomingFile, RetrieveMode, RetrievedFile,
    StoredBatch, StoredDocument,
};
pub use notice::{CreateNoticeInput, NoticeService};
pub use outage::{CreateOutageInput, OutageService, UpdateOutageStatusInput};
pub use service_request::{
    CreateServiceRequestInput, ServiceRequestService, ServiceRequestView, UpdateServiceRequestInput,
    UpdateStatusInput, UserServiceRequestView,
};
pub use token::{Claims, TokenService};
pub use user::{LoginOutcome, RegisterInput, UpdateUserInput, UserService};

use powerlink_common::{AppError, AppResult};

/// Reject missing or whitespace-only required text.
pub(crate) fn require_present(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}
