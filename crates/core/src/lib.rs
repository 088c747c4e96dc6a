//! Core business logic for PowerLink.

pub mod services;

pub use services::*;
