//! CLI functionality for the apex tool
//!
//! This module contains all CLI-related functionality including:
//! - Batch runs from a configuration file
//! - Checking a single note
//! - REPL
//! - Logging setup and output formatting

#[cfg(feature = "cli")]
pub mod check;
#[cfg(feature = "cli")]
pub mod logging;
#[cfg(feature = "cli")]
pub mod output;
#[cfg(feature = "cli")]
pub mod repl;
#[cfg(feature = "cli")]
pub mod run;
