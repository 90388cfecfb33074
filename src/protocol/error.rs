//! Error taxonomy of the protocol.
//!
//! Builder-time failures ([`BuildError`]) are reported synchronously at the
//! call that caused them and never become a response. Execution-time
//! failures are always surfaced as an error [`Response`](super::Response)
//! carrying an [`ErrorKind`], never as a panic.

use serde::Serialize;
use thiserror::Error;

/// Discriminator for error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Transport-level loss. Not request-specific: delivered through the
    /// process-wide notification path, not a request receiver.
    ConnectionInterrupted,
    /// Malformed or unsupported request shape, detected before execution.
    RequestInvalid,
    /// Execution was attempted and failed.
    RequestFailed,
    /// Terminal state reached through cancellation.
    RequestCancelled,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ErrorKind::ConnectionInterrupted => "connection interrupted",
            ErrorKind::RequestInvalid => "request invalid",
            ErrorKind::RequestFailed => "request failed",
            ErrorKind::RequestCancelled => "request cancelled",
        };
        f.write_str(text)
    }
}

/// Failure while building a request or response tree.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("array index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("value is not a dictionary")]
    NotADictionary,

    #[error("value is not an array")]
    NotAnArray,
}
