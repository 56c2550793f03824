//! Error types for Herald.
//!
//! This crate provides the error types shared by the Herald workspace: the
//! entity cache, the service orchestrator and the client facade.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use herald_error::{HeraldResult, ServiceError, ServiceErrorKind};
//!
//! fn lookup() -> HeraldResult<()> {
//!     Err(ServiceError::new(ServiceErrorKind::GlobalNotEnabled("reminders".to_string())))?
//! }
//!
//! match lookup() {
//!     Ok(()) => println!("found"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod json;
mod service;

pub use cache::{CacheError, CacheErrorKind, CacheResult};
pub use config::ConfigError;
pub use error::{HeraldError, HeraldErrorKind, HeraldResult};
pub use json::JsonError;
pub use service::{ServiceError, ServiceErrorKind, ServiceResult};
