//! Key-protected HTTP JSON API over a container runtime.
//!
//! Every endpoint answers with the same envelope, where `ok` is a string
//! rather than a boolean:
//!
//! ```text
//! GET /api/images?key=a
//! {"ok":"true","result":[{"id":"sha256:...","repo_tags":["nginx:1.27"],...}]}
//!
//! GET /api/images?key=x
//! {"ok":"false","result":"API_KEY_INVALID"}
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types and client error codes
//! - [`api`]: Key gate, envelope, handlers and router
//! - [`runtime`]: Container runtime trait, Docker backend and mock
//! - [`metrics`]: Request metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod runtime;
pub mod utils;

pub use config::Config;
pub use error::{AppError, ErrorCode, Result};
