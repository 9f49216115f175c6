//! Exit codes for the rd-core CLI.
//!
//! Exit code ranges:
//! - 0: Success
//! - 10-19: User errors (bad arguments, configuration or data)
//! - 20-29: Internal errors (numerics, rendering, I/O)

use rd_common::{Error, ErrorCategory};

/// Process exit codes. Stable for scripting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    // ========================================================================
    // User Errors (10-19)
    // ========================================================================
    /// Invalid arguments, configuration or reward names
    ConfigError = 10,

    /// Inconsistent divergence data (duplicate labels, missing baselines)
    DataError = 11,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Numerical or rendering failure
    InternalError = 20,

    /// File I/O or serialization failure
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Errors the user can fix (codes 10-19).
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Errors that should be reported (codes 20-29).
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    /// Stable name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::DataError => "ERR_DATA",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Data => ExitCode::DataError,
            ErrorCategory::Numeric | ErrorCategory::Render => ExitCode::InternalError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
