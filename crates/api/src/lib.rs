//! HTTP API layer for PowerLink.
//!
//! - **Endpoints**: the `/api` routes for accounts, tickets, outages,
//!   announcements, notices and document uploads
//! - **Extractors**: authenticated caller and JSON bodies that fail with the
//!   standard error envelope
//! - **Middleware**: bearer token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{router, upload_body_limit};
pub use middleware::{AppState, auth_middleware};
