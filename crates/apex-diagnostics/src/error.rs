//! APEX error types

use crate::{APX0001, APX0002, APX0003, APX0100, APX0200, APX0300, APX0401, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Error - the document or run cannot proceed
    Error,
    /// Warning - potential issue but processing continues
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message attached to a document or to the run as a whole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Document the diagnostic refers to
    pub document: Option<String>,
    /// Detector that was running, if any
    pub detector: Option<String>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            document: None,
            detector: None,
            help: code.info().help.map(str::to_string),
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    /// Set the document name
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Set the detector name
    pub fn with_detector(mut self, detector: impl Into<String>) -> Self {
        self.detector = Some(detector.into());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the diagnostic with terminal colors
    #[cfg(feature = "colored")]
    pub fn colored(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };
        let mut out = format!("{}[{}]: {}", severity, self.code, self.message);
        if let Some(doc) = &self.document {
            out.push_str(&format!(" ({} {})", "document".dimmed(), doc.cyan()));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {}", "help:".green(), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(doc) = &self.document {
            write!(f, " in {}", doc)?;
        }
        if let Some(detector) = &self.detector {
            write!(f, " [{}]", detector)?;
        }
        Ok(())
    }
}

/// Main APEX error type
#[derive(Debug, Clone, Error)]
pub enum ApexError {
    /// Missing, unreadable or empty document text
    #[error("{code}: {message}")]
    Input {
        code: ErrorCode,
        message: String,
        document: Option<String>,
    },

    /// Malformed pattern configuration
    #[error("{code}: {message} in pattern `{pattern}`")]
    Pattern {
        code: ErrorCode,
        message: String,
        pattern: String,
    },

    /// A captured value could not be interpreted
    #[error("{code}: {message}: {value:?}")]
    Value {
        code: ErrorCode,
        message: String,
        value: String,
    },

    /// Run configuration error
    #[error("{code}: {message}")]
    Config {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// System error (I/O, sinks, database)
    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },

    /// Multiple errors collected
    #[error("Multiple errors: {}", .0.len())]
    Multiple(Vec<ApexError>),
}

impl ApexError {
    /// Create an input error
    pub fn input(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Input {
            code,
            message: message.into(),
            document: None,
        }
    }

    /// Create an input error for an empty document
    pub fn empty_document(document: impl Into<String>) -> Self {
        let document = document.into();
        Self::Input {
            code: APX0001,
            message: format!("document `{}` has no text", document),
            document: Some(document),
        }
    }

    /// Create an input error for an unreadable document
    pub fn unreadable(document: impl Into<String>, reason: impl fmt::Display) -> Self {
        let document = document.into();
        Self::Input {
            code: APX0002,
            message: format!("failed to read document `{}`: {}", document, reason),
            document: Some(document),
        }
    }

    /// Create an input error for text that does not decode
    pub fn undecodable(document: impl Into<String>, encoding: &str) -> Self {
        let document = document.into();
        Self::Input {
            code: APX0003,
            message: format!("document `{}` is not valid {}", document, encoding),
            document: Some(document),
        }
    }

    /// Create a pattern error
    pub fn pattern(code: ErrorCode, message: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Pattern {
            code,
            message: message.into(),
            pattern: pattern.into(),
        }
    }

    /// Create a pattern error from a regex compilation failure
    pub fn invalid_regex(pattern: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::pattern(APX0100, format!("invalid regular expression ({})", reason), pattern)
    }

    /// Create a value error
    pub fn value(code: ErrorCode, message: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Value {
            code,
            message: message.into(),
            value: value.into(),
        }
    }

    /// Create a value error for a capture that is not a count
    pub fn not_numeric(value: impl Into<String>) -> Self {
        Self::value(APX0200, "captured value is not numeric", value)
    }

    /// Create a configuration error
    pub fn config(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with the generic configuration code
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::config(APX0300, message)
    }

    /// Create a system error
    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Create an I/O error with context
    pub fn io(context: impl Into<String>, err: &std::io::Error) -> Self {
        Self::System {
            code: APX0401,
            message: err.to_string(),
            context: Some(context.into()),
        }
    }

    /// Attach context to a configuration or system error
    pub fn with_context(self, ctx: impl Into<String>) -> Self {
        match self {
            Self::Config { code, message, .. } => Self::Config {
                code,
                message,
                context: Some(ctx.into()),
            },
            Self::System { code, message, .. } => Self::System {
                code,
                message,
                context: Some(ctx.into()),
            },
            other => other,
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Input { code, .. } => *code,
            Self::Pattern { code, .. } => *code,
            Self::Value { code, .. } => *code,
            Self::Config { code, .. } => *code,
            Self::System { code, .. } => *code,
            Self::Multiple(errors) => errors.first().map(|e| e.code()).unwrap_or(ErrorCode::new(0)),
        }
    }

    /// Name of the document this error refers to, if known
    pub fn document(&self) -> Option<&str> {
        match self {
            Self::Input { document, .. } => document.as_deref(),
            _ => None,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Input { code, message, document } => {
                let diag = Diagnostic::error(*code, message.clone());
                match document {
                    Some(doc) => diag.with_document(doc.clone()),
                    None => diag,
                }
            }
            Self::Pattern { code, message, pattern } => {
                Diagnostic::error(*code, format!("{} in `{}`", message, pattern))
            }
            Self::Value { code, message, value } => {
                Diagnostic::error(*code, format!("{}: {:?}", message, value))
            }
            Self::Config { code, message, context } | Self::System { code, message, context } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                }
                diag
            }
            Self::Multiple(errors) => {
                if let Some(first) = errors.first() {
                    first.to_diagnostic()
                } else {
                    Diagnostic::error(ErrorCode::new(0), "Unknown error")
                }
            }
        }
    }
}

impl From<std::io::Error> for ApexError {
    fn from(err: std::io::Error) -> Self {
        Self::system(APX0401, err.to_string())
    }
}
