//! Error types for the hashpath library
//!
//! Path compilation has its own precise error, [`MalformedPath`], which points
//! at the offending fragment of the expression. Everything else the crate can
//! fail on (document I/O, YAML/JSON decoding, value conversion) is collected in
//! [`HashPathError`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A path expression that could not be compiled
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed path `{path}` at offset {offset} (near `{fragment}`): {reason}")]
pub struct MalformedPath {
    /// The full source expression
    pub path: String,
    /// The substring the error was detected on
    pub fragment: String,
    /// Byte offset of `fragment` in `path`
    pub offset: usize,
    /// Human readable description
    pub reason: String,
}

impl MalformedPath {
    /// Create a new error for `path`, pointing at `fragment` starting at `offset`
    pub fn new(
        path: impl Into<String>,
        fragment: impl Into<String>,
        offset: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            fragment: fragment.into(),
            offset,
            reason: reason.into(),
        }
    }

    /// Render the source expression with a caret under the offending offset
    ///
    /// ```text
    /// a[b
    ///  ^ unbalanced `[`
    /// ```
    pub fn pointer(&self) -> String {
        let column = self.path[..self.offset.min(self.path.len())].chars().count();
        format!("{}\n{}^ {}", self.path, " ".repeat(column), self.reason)
    }
}

/// The main error type for all library operations
#[derive(Error, Debug)]
pub enum HashPathError {
    /// Path expression compilation errors
    #[error(transparent)]
    MalformedPath(#[from] MalformedPath),

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing or serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File not found or invalid path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// The document format could not be determined or is not supported
    #[error("Unsupported document format: {path} (expected .yaml, .yml or .json)")]
    UnsupportedFormat { path: PathBuf },

    /// Value type conversion errors
    #[error("Type conversion error: cannot convert {from} to {to}")]
    TypeConversion { from: String, to: String },

    /// Generic validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, HashPathError>;

impl HashPathError {
    /// Create a new file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new unsupported format error
    pub fn unsupported_format(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedFormat { path: path.into() }
    }

    /// Create a new type conversion error
    pub fn type_conversion(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::TypeConversion {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the error stems from the caller's input rather than the environment
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedPath(_)
                | Self::UnsupportedFormat { .. }
                | Self::TypeConversion { .. }
                | Self::Validation { .. }
        )
    }

    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::FileNotFound { .. } | Self::Io(_) => ErrorSeverity::Critical,
            Self::Yaml(_) | Self::Json(_) => ErrorSeverity::High,
            Self::MalformedPath(_) | Self::TypeConversion { .. } => ErrorSeverity::Medium,
            Self::UnsupportedFormat { .. } | Self::Validation { .. } => ErrorSeverity::Low,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code the CLI reports for an error of this severity
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Low | Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_path_display() {
        let err = MalformedPath::new("a[b", "[b", 1, "unbalanced `[`");
        assert_eq!(
            err.to_string(),
            "malformed path `a[b` at offset 1 (near `[b`): unbalanced `[`"
        );
    }

    #[test]
    fn test_malformed_path_pointer() {
        let err = MalformedPath::new("User.[id]", "[id]", 5, "empty segment");
        assert_eq!(err.pointer(), "User.[id]\n     ^ empty segment");
    }

    #[test]
    fn test_error_creation() {
        let err = HashPathError::file_not_found("data.yaml");
        assert!(matches!(err, HashPathError::FileNotFound { .. }));
        assert!(!err.is_usage_error());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_malformed_path_converts() {
        let err: HashPathError = MalformedPath::new("a.", ".", 1, "empty segment").into();
        assert!(err.is_usage_error());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.severity().exit_code(), 2);
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::High);
        assert!(ErrorSeverity::High > ErrorSeverity::Medium);
        assert!(ErrorSeverity::Medium > ErrorSeverity::Low);
    }
}
