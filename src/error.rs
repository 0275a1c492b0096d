//! Error types for mcbeacon.
//!
//! Uses `thiserror` for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code when the server answered a status handshake.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code when no requested protocol answered.
pub const EXIT_UNREACHABLE: u8 = 1;
/// Exit code for configuration and argument errors.
pub const EXIT_ERROR: u8 = 2;

/// Errors raised while locating or parsing a server configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no valid server configuration found in {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("invalid port: {0:?}")]
    InvalidPort(String),
}

/// Errors raised by the probe before any worker is spawned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("invalid protocol selection: {0:?} (expected java, bedrock, or both)")]
    InvalidProtocolSelection(String),
}

/// Failure of a single status handshake.
///
/// These never escape a probe worker; they only feed debug logging.
#[derive(Error, Debug)]
pub enum StatusError {
    #[error("handshake timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    #[error("could not resolve {0}")]
    Unresolvable(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error for a healthcheck run.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        EXIT_ERROR
    }
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Result type alias for a single status handshake.
pub type StatusResult<T> = Result<T, StatusError>;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
