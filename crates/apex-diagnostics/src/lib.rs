//! APEX diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the APEX
//! engine, the condition detectors and the batch runner: error codes,
//! a structured error type and per-document diagnostic reporting.

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for APEX operations
pub type ApexResult<T> = std::result::Result<T, ApexError>;
