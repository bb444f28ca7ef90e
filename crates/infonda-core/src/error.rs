//! Error types for core NDO operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("No authority segment in URI: {0}")]
    NoAuthority(String),

    #[error("No algorithm segment in URI: {0}")]
    NoAlgorithm(String),

    #[error("No hash segment in URI: {0}")]
    NoHash(String),

    #[error("Invalid NDO URI: {0}")]
    InvalidUri(String),

    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}
