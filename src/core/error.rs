//! Error types for atse
//!
//! This module provides structured error handling using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for atse operations
pub type Result<T> = std::result::Result<T, AtseError>;

/// Errors that can occur while resolving a project or navigating it
#[derive(Error, Debug)]
pub enum AtseError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Project root missing or not a directory
    #[error("No project root: {path}")]
    NoProjectRoot { path: PathBuf },

    /// A candidate file could not be read and the scan policy is `abort`
    #[error("Scan aborted at {path}: {source}")]
    ScanAborted {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mapping requested on an environment without a main descriptor
    #[error("Base paths are not resolved (no AngularApp descriptor found)")]
    BasePathsUnresolved,

    /// The paired view/controller does not exist
    #[error("Not found view/controller")]
    CounterpartNotFound { path: PathBuf },

    /// No class in the controller file matches the lookup key
    #[error("Controller class '{key}' not found in {path}")]
    ControllerClassNotFound { key: String, path: PathBuf },

    /// Tree-sitter setup or parse failure
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Glob compilation error
    #[error("Glob error: {0}")]
    Glob(#[from] globset::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AtseError>,
    },
}

impl AtseError {
    /// Wrap an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AtseError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        AtseError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        AtseError::Parse {
            message: message.into(),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_project_root_display() {
        let err = AtseError::NoProjectRoot {
            path: PathBuf::from("/tmp/missing"),
        };
        assert!(err.to_string().contains("/tmp/missing"));
    }

    #[test]
    fn test_counterpart_not_found_message() {
        let err = AtseError::CounterpartNotFound {
            path: PathBuf::from("src/app/views/users.html"),
        };
        assert_eq!(err.to_string(), "Not found view/controller");
    }

    #[test]
    fn test_error_with_context() {
        let err = AtseError::invalid_config("empty suffix");
        let wrapped = err.with_context("loading .atse.json");
        assert!(wrapped.to_string().contains("loading .atse.json"));
        assert!(wrapped.to_string().contains("empty suffix"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AtseError = io_err.into();
        assert!(matches!(err, AtseError::Io(_)));
    }

    #[test]
    fn test_scan_aborted_keeps_source() {
        let err = AtseError::ScanAborted {
            path: PathBuf::from("src/app/routes.ts"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("routes.ts"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<()> = Err(AtseError::parse("bad tree"));
        let err = result.context("parsing controller").unwrap_err();
        assert!(err.to_string().contains("parsing controller"));
    }

    #[test]
    fn test_class_not_found_display() {
        let err = AtseError::ControllerClassNotFound {
            key: "users".to_string(),
            path: PathBuf::from("users.controller.ts"),
        };
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err: serde_json::Error = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: AtseError = json_err.into();
        assert!(matches!(err, AtseError::Json(_)));
    }
}
