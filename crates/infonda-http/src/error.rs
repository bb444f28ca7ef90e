//! Error types for HTTP transport operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HttpError>;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP response has no entity")]
    MissingEntity,

    #[error("HTTP response has no content type")]
    MissingContentType,

    #[error("Failed to read HTTP response body: {0}")]
    StreamError(String),

    #[error("Malformed HTTP payload: {0}")]
    MalformedPayload(String),

    #[error("Content of {uri} does not match its hash")]
    IntegrityFailure { uri: String },

    #[error("Record error: {0}")]
    Record(#[from] infonda_core::CoreError),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
