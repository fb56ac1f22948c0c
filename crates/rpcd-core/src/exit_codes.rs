//! Exit codes for the rpcd CLI.
//!
//! `rpcd call` and `rpcd list` exit with a code derived from the bus status
//! of the outcome, so scripts can branch without parsing output.
//!
//! Exit code ranges:
//! - 0: Success
//! - 2-9: Bus status of a failed call (same number as on the wire)
//! - 10-19: CLI usage and configuration errors

use rpcd_common::Status;

/// Exit codes for rpcd operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    // ========================================================================
    // Call outcomes (2-9), numbered like the bus status
    // ========================================================================
    /// A field was missing, mistyped or out of range
    InvalidArgument = 2,

    /// Unknown object or method
    MethodNotFound = 3,

    /// The target (file, process, package) does not exist
    NotFound = 4,

    /// Permission denied
    PermissionDenied = 6,

    /// Any other failure
    UnknownError = 9,

    // ========================================================================
    // CLI / Environment Errors (10-19)
    // ========================================================================
    /// Invalid arguments to the CLI itself (e.g. unparseable JSON)
    ArgsError = 10,

    /// Config file exists but could not be loaded
    ConfigError = 11,

    /// stdio transport failure
    IoError = 12,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Exit code for a call that ended with `status`.
    pub fn from_status(status: Status) -> Self {
        match status {
            Status::Ok => ExitCode::Clean,
            Status::InvalidArgument => ExitCode::InvalidArgument,
            Status::MethodNotFound => ExitCode::MethodNotFound,
            Status::NotFound => ExitCode::NotFound,
            Status::PermissionDenied => ExitCode::PermissionDenied,
            _ => ExitCode::UnknownError,
        }
    }

    /// Get the error code name as a string constant (for JSON output).
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::InvalidArgument => "ERR_INVALID_ARGUMENT",
            ExitCode::MethodNotFound => "ERR_METHOD_NOT_FOUND",
            ExitCode::NotFound => "ERR_NOT_FOUND",
            ExitCode::PermissionDenied => "ERR_PERMISSION",
            ExitCode::UnknownError => "ERR_UNKNOWN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&rpcd_common::Error> for ExitCode {
    fn from(err: &rpcd_common::Error) -> Self {
        ExitCode::from_status(err.status())
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
