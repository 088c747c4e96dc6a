//! Common utilities and shared types for PowerLink.
//!
//! This crate provides foundational components used across all PowerLink crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error type and JSON error envelope via [`AppError`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Storage**: Ticket document storage on the local filesystem
//!
//! # Example
//!
//! ```no_run
//! use powerlink_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("{} -> {}", config.server.port, id_gen.generate());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{
    LocalStorage, StorageBackend, StoredObject, file_extension, generate_stored_name,
    guess_content_type, is_safe_segment,
};
