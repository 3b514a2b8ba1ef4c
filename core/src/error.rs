//! Error types for the cluster REST client.
//!
//! # Design
//! Every non-2xx response lands in `HttpError` with the raw status code and
//! body, whatever the code. Callers that need to tell "not found" from
//! "conflict" inspect the status themselves; `is_client_error` and
//! `is_server_error` only group codes by range.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by `FlinkClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The local file to upload could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The upload path has no file name component.
    #[error("upload path has no file name: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The exchange never completed (connection, DNS, I/O while reading).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a status outside 200..=299.
    #[error("http status not 2xx: {status} {body}")]
    HttpError { status: u16, body: String },

    /// The 2xx response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The operation is deliberately not supported by this client.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl ApiError {
    /// Status code carried by an `HttpError`, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }
}
