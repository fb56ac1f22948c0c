//! Error types for rpcd.
//!
//! Every failure a handler can produce collapses into one of a handful of
//! bus statuses that the caller sees:
//!
//! ```text
//! permission_denied  (6)  EACCES, EPERM, non-executable script
//! invalid_argument   (2)  bad/missing fields, ENOTDIR, EINVAL
//! not_found          (4)  ENOENT, ESRCH, unknown config package
//! method_not_found   (3)  unknown object or method (transport only)
//! unknown_error      (9)  everything else
//! ```
//!
//! OS errors are classified at the point of failure via [`Status::from_io`],
//! so the context string attached to [`Error::Io`] is for logs only.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Result type alias for rpcd operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Status codes returned to bus callers.
///
/// The numeric values are the wire contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    InvalidCommand,
    InvalidArgument,
    MethodNotFound,
    NotFound,
    NoData,
    PermissionDenied,
    Timeout,
    NotSupported,
    UnknownError,
    ConnectionFailed,
}

impl Status {
    /// Numeric bus status code.
    pub fn code(&self) -> u32 {
        match self {
            Status::Ok => 0,
            Status::InvalidCommand => 1,
            Status::InvalidArgument => 2,
            Status::MethodNotFound => 3,
            Status::NotFound => 4,
            Status::NoData => 5,
            Status::PermissionDenied => 6,
            Status::Timeout => 7,
            Status::NotSupported => 8,
            Status::UnknownError => 9,
            Status::ConnectionFailed => 10,
        }
    }

    /// Stable snake_case name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::InvalidCommand => "invalid_command",
            Status::InvalidArgument => "invalid_argument",
            Status::MethodNotFound => "method_not_found",
            Status::NotFound => "not_found",
            Status::NoData => "no_data",
            Status::PermissionDenied => "permission_denied",
            Status::Timeout => "timeout",
            Status::NotSupported => "not_supported",
            Status::UnknownError => "unknown_error",
            Status::ConnectionFailed => "connection_failed",
        }
    }

    /// Classify an OS-level error.
    ///
    /// The raw errno wins when present; otherwise the portable `ErrorKind`
    /// is used so synthetic errors (tests, non-Unix) still classify.
    pub fn from_io(err: &io::Error) -> Status {
        if let Some(errno) = err.raw_os_error() {
            return match errno {
                libc::EACCES | libc::EPERM => Status::PermissionDenied,
                libc::ENOTDIR | libc::EINVAL => Status::InvalidArgument,
                libc::ENOENT | libc::ESRCH => Status::NotFound,
                _ => Status::UnknownError,
            };
        }

        match err.kind() {
            io::ErrorKind::PermissionDenied => Status::PermissionDenied,
            io::ErrorKind::NotFound => Status::NotFound,
            io::ErrorKind::InvalidInput => Status::InvalidArgument,
            _ => Status::UnknownError,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for rpcd.
#[derive(Error, Debug)]
pub enum Error {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Unknown(String),
}

impl Error {
    /// Wrap an OS error with a short description of what was attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// The status a caller sees for this error.
    pub fn status(&self) -> Status {
        match self {
            Error::PermissionDenied(_) => Status::PermissionDenied,
            Error::InvalidArgument(_) => Status::InvalidArgument,
            Error::NotFound(_) => Status::NotFound,
            Error::MethodNotFound(_) => Status::MethodNotFound,
            Error::Io { source, .. } => Status::from_io(source),
            Error::Json(_) | Error::Unknown(_) => Status::UnknownError,
        }
    }

    /// Numeric bus status code for this error.
    pub fn code(&self) -> u32 {
        self.status().code()
    }
}

impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        Error::io("I/O error", source)
    }
}
