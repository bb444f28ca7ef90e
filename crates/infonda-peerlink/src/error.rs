//! Error types for peer-link operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PeerLinkError>;

#[derive(Error, Debug)]
pub enum PeerLinkError {
    #[error("Connection to {device} failed")]
    ConnectionFailed { device: String },

    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Content of {uri} does not match its hash")]
    IntegrityFailure { uri: String },

    #[error("Record error: {0}")]
    Record(#[from] infonda_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
