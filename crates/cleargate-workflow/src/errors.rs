//! Error types for the collaborator traits and node configuration.

use thiserror::Error;

use super::types::ErrorKind;

/// Errors from [`FileResolver`](super::traits::FileResolver).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FileFetchError {
    #[error("file has no {field} to fetch from")]
    MissingSource { field: &'static str },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("download failed: {message}")]
    Download { message: String },
    #[error("download returned HTTP {status}")]
    Status { status: u16 },
}

/// Errors from [`FileStorage`](super::traits::FileStorage).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },
    #[error("invalid storage key: {key}")]
    InvalidKey { key: String },
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from [`HttpTransport`](super::traits::HttpTransport).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("request timed out: {message}")]
    Timeout { message: String },
    #[error("connection failed: {message}")]
    Connect { message: String },
    #[error("invalid request: {message}")]
    Request { message: String },
    #[error("transport error: {message}")]
    Other { message: String },
}

/// Errors raised while validating a node configuration document.
///
/// These surface at construction time, never during `run()`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("malformed node config: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("missing required config field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Everything that can fail an HTTP request node invocation.
///
/// Never escapes the node: [`run`](crate::traits::Node::run) converts it
/// into a failed result tagged with [`kind()`](Self::kind).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpRequestError {
    #[error("cannot resolve variable {selector}: {reason}")]
    ReferenceResolution { selector: String, reason: String },
    #[error("variable {selector} is {found}, expected {expected}")]
    TypeMismatch {
        selector: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("failed to fetch file for {selector}: {source}")]
    FileFetch {
        selector: String,
        #[source]
        source: FileFetchError,
    },
    #[error("request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
    #[error("response body of {size} bytes exceeds the {limit} byte limit")]
    ResponseTooLarge { size: usize, limit: usize },
    #[error("server responded with HTTP {status}")]
    HttpStatus { status: u16 },
}

impl HttpRequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ReferenceResolution { .. } => ErrorKind::ReferenceResolution,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::FileFetch { .. } => ErrorKind::FileFetch,
            Self::Transport(_) => ErrorKind::Transport,
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::ResponseTooLarge { .. } => ErrorKind::ResponseTooLarge,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
        }
    }
}
