//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// A local precondition failed before anything reached the wire
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation needs an established connection
    #[error("not connected")]
    NotConnected,

    /// The transport failed or was closed by the server
    #[error("connection error: {0}")]
    Connection(String),

    /// The profile directory could not be fetched or parsed
    #[error("directory error: {0}")]
    Directory(String),
}
