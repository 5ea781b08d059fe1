//! Core types and shared functionality for web2pdf.
//!
//! This crate provides:
//! - Unified error types
//! - Layered configuration
//! - Request-scoped artifact storage

pub mod config;
pub mod error;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::{Error, ErrorKind};
pub use store::{ArtifactStore, RequestScope};
