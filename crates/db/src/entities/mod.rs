//! Database entities.

#![allow(missing_docs)]

pub mod announcement;
pub mod notice;
pub mod outage_report;
pub mod service_request;
pub mod user;

pub use announcement::Entity as Announcement;
pub use notice::Entity as Notice;
pub use outage_report::Entity as OutageReport;
pub use service_request::Entity as ServiceRequest;
pub use user::Entity as User;
