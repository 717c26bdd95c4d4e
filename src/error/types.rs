//! Error types
//!
//! `ObjectError` is the single failure type returned by every object and
//! page operation. Each variant carries a stable machine-readable code that
//! is sent to the client unchanged.

use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Failure of an object or page operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// Malformed path or an invalid type/content combination
    #[error("bad request ({code}): {message}")]
    BadRequest { code: &'static str, message: String },

    /// The referenced path, or the parent of a path being created, is missing
    #[error("not found ({code}): {message}")]
    NotFound { code: &'static str, message: String },

    /// Well-formed request that cannot be applied to the target
    #[error("unprocessable entity ({code}): {message}")]
    UnprocessableEntity { code: &'static str, message: String },

    /// Underlying I/O failure not caused by the request
    #[error("internal error ({code}): {message}")]
    Internal { code: &'static str, message: String },
}

impl ObjectError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn unprocessable(code: &'static str, message: impl Into<String>) -> Self {
        Self::UnprocessableEntity {
            code,
            message: message.into(),
        }
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::Internal {
            code,
            message: message.into(),
        }
    }

    /// Internal failure carrying the I/O error and the path it occurred on.
    pub fn io(code: &'static str, path: &Path, error: &io::Error) -> Self {
        Self::internal(code, format!("{}: {error}", path.display()))
    }

    /// Stable code identifying the failure, e.g. `path_not_found`
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest { code, .. }
            | Self::NotFound { code, .. }
            | Self::UnprocessableEntity { code, .. }
            | Self::Internal { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::NotFound { message, .. }
            | Self::UnprocessableEntity { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UnprocessableEntity { .. } => ErrorKind::UnprocessableEntity,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_unprocessable(&self) -> bool {
        matches!(self, Self::UnprocessableEntity { .. })
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Coarse classification of an `ObjectError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    UnprocessableEntity,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::BadRequest => write!(f, "bad request"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::UnprocessableEntity => write!(f, "unprocessable entity"),
            ErrorKind::Internal => write!(f, "internal error"),
        }
    }
}

pub type ObjectResult<T> = Result<T, ObjectError>;

/// Process-level failures: startup, configuration, listener I/O
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let err = ObjectError::not_found("path_not_found", "missing.txt");
        assert_eq!(err.code(), "path_not_found");
        assert_eq!(err.message(), "missing.txt");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.is_not_found());
        assert!(!err.is_internal());
    }

    #[test]
    fn test_display_includes_code() {
        let err = ObjectError::unprocessable("dir_with_children", "docs");
        assert_eq!(
            err.to_string(),
            "unprocessable entity (dir_with_children): docs"
        );
    }

    #[test]
    fn test_io_error_mentions_path() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = ObjectError::io("write_error", Path::new("/srv/a.txt"), &io_err);
        assert!(err.is_internal());
        assert_eq!(err.code(), "write_error");
        assert!(err.message().contains("/srv/a.txt"));
        assert!(err.message().contains("denied"));
    }
}
