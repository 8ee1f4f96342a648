//! Error types for the worker client.

use thiserror::Error;

/// Result type for worker client operations.
pub type Result<T> = std::result::Result<T, WorkerError>;

/// Coarse failure category, kept for diagnostics.
///
/// Callers treat every failure the same way; the reason only feeds logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerFailureReason {
    Config,
    Transport,
    Timeout,
    BadRequest,
    Unauthorized,
    ClientError,
    ServerError,
    Rejected,
    InvalidResponse,
}

/// Worker client errors.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Client could not be built (bad TLS setup, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request did not finish within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection refused, DNS failure, reset, ...
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: check the worker service token")]
    Unauthorized,

    #[error("Client error {status}: {message}")]
    Client { status: u16, message: String },

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// 2xx response carrying `success: false`
    #[error("Worker rejected the request: {0}")]
    Rejected(String),

    /// 2xx response whose body is missing or not the expected JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl WorkerError {
    pub fn reason(&self) -> WorkerFailureReason {
        match self {
            WorkerError::Config(_) => WorkerFailureReason::Config,
            WorkerError::Timeout(_) => WorkerFailureReason::Timeout,
            WorkerError::Transport(_) => WorkerFailureReason::Transport,
            WorkerError::BadRequest(_) => WorkerFailureReason::BadRequest,
            WorkerError::Unauthorized => WorkerFailureReason::Unauthorized,
            WorkerError::Client { .. } => WorkerFailureReason::ClientError,
            WorkerError::Server { .. } => WorkerFailureReason::ServerError,
            WorkerError::Rejected(_) => WorkerFailureReason::Rejected,
            WorkerError::InvalidResponse(_) => WorkerFailureReason::InvalidResponse,
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WorkerError::Timeout(err.to_string())
        } else {
            WorkerError::Transport(err.to_string())
        }
    }

    /// Map a non-2xx, non-409 status to an error.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => WorkerError::BadRequest(message),
            401 => WorkerError::Unauthorized,
            402..=499 => WorkerError::Client { status, message },
            _ => WorkerError::Server { status, message },
        }
    }
}
