//! Repositories, one per table.

mod announcement;
mod notice;
mod outage_report;
mod service_request;
mod user;

pub use announcement::{AnnouncementRepository, AnnouncementUpdate};
pub use notice::NoticeRepository;
pub use outage_report::OutageReportRepository;
pub use service_request::{ServiceRequestFilter, ServiceRequestRepository, ServiceRequestUpdate};
pub use user::{UserRepository, UserUpdate};

use powerlink_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Map an insert/update failure, turning unique-key violations into `Conflict`.
pub(crate) fn map_write_error(err: DbErr, conflict_message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(detail = %detail, "Unique constraint violation");
            AppError::Conflict(conflict_message.to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}
