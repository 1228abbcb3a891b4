//! APEX error codes following a structured numbering system
//!
//! Error code ranges:
//! - APX0001-APX0099: Input errors (missing, unreadable or empty documents)
//! - APX0100-APX0199: Pattern errors (malformed trigger/negation configuration)
//! - APX0200-APX0299: Value errors (captured values that cannot be interpreted)
//! - APX0300-APX0399: Configuration errors (run configuration, detector selection)
//! - APX0400-APX0499: System errors (I/O, sinks, database)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is an input error (0001-0099)
    pub const fn is_input_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a pattern error (0100-0199)
    pub const fn is_pattern_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a value error (0200-0299)
    pub const fn is_value_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a configuration error (0300-0399)
    pub const fn is_config_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "APX{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Input errors (0001-0099)
    map.insert(1, ErrorInfo::new("Empty document text")
        .with_help("A document must have non-blank text; an unreadable note is never treated as a negative one"));
    map.insert(2, ErrorInfo::new("Unreadable document"));
    map.insert(3, ErrorInfo::new("Undecodable document text")
        .with_help("Check the `select.encoding` setting"));
    map.insert(4, ErrorInfo::new("Unsupported text encoding"));

    // Pattern errors (0100-0199)
    map.insert(100, ErrorInfo::new("Invalid regular expression"));
    map.insert(101, ErrorInfo::new("Invalid negation expression"));
    map.insert(102, ErrorInfo::new("Capture group count is not a multiple of the group stride")
        .with_help("Each alternative of a strided pattern must declare the same number of groups"));

    // Value errors (0200-0299)
    map.insert(200, ErrorInfo::new("Captured value is not numeric"));
    map.insert(201, ErrorInfo::new("Captured value is out of range"));

    // Configuration errors (0300-0399)
    map.insert(300, ErrorInfo::new("Invalid configuration file"));
    map.insert(301, ErrorInfo::new("Unknown detector")
        .with_help("Run `apex list` to see the available detectors"));
    map.insert(302, ErrorInfo::new("Unknown output kind")
        .with_help("Supported output kinds are csv, tsv and sqlite"));
    map.insert(303, ErrorInfo::new("Invalid document selection"));
    map.insert(304, ErrorInfo::new("No corpus source configured"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Database error"));
    map.insert(403, ErrorInfo::new("Output sink error"));

    map
});

// Input errors
pub const APX0001: ErrorCode = ErrorCode::new(1);
pub const APX0002: ErrorCode = ErrorCode::new(2);
pub const APX0003: ErrorCode = ErrorCode::new(3);
pub const APX0004: ErrorCode = ErrorCode::new(4);

// Pattern errors
pub const APX0100: ErrorCode = ErrorCode::new(100);
pub const APX0101: ErrorCode = ErrorCode::new(101);
pub const APX0102: ErrorCode = ErrorCode::new(102);

// Value errors
pub const APX0200: ErrorCode = ErrorCode::new(200);
pub const APX0201: ErrorCode = ErrorCode::new(201);

// Configuration errors
pub const APX0300: ErrorCode = ErrorCode::new(300);
pub const APX0301: ErrorCode = ErrorCode::new(301);
pub const APX0302: ErrorCode = ErrorCode::new(302);
pub const APX0303: ErrorCode = ErrorCode::new(303);
pub const APX0304: ErrorCode = ErrorCode::new(304);

// System errors
pub const APX0400: ErrorCode = ErrorCode::new(400);
pub const APX0401: ErrorCode = ErrorCode::new(401);
pub const APX0402: ErrorCode = ErrorCode::new(402);
pub const APX0403: ErrorCode = ErrorCode::new(403);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(APX0001.to_string(), "APX0001");
        assert_eq!(APX0102.to_string(), "APX0102");
    }

    #[test]
    fn test_error_categories() {
        assert!(APX0001.is_input_error());
        assert!(!APX0001.is_pattern_error());

        assert!(APX0102.is_pattern_error());
        assert!(APX0200.is_value_error());
        assert!(APX0301.is_config_error());
        assert!(APX0401.is_system_error());
    }

    #[test]
    fn test_error_info() {
        assert_eq!(APX0001.info().description, "Empty document text");
        assert!(APX0102.info().help.is_some());
        assert_eq!(ErrorCode::new(9999).info().description, "Unknown error");
    }
}
