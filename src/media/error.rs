//! Media delivery error taxonomy
//!
//! Every variant is scoped to a single request and maps to exactly one HTTP status.

use hyper::StatusCode;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    /// Identifier would escape the media root or contains unsupported characters
    #[error("invalid media identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Neither the requested resource nor the sample fallback exists
    #[error("media resource not found: {0}")]
    NotFound(String),

    /// Range header could not be parsed or lies outside the resource
    #[error("range not satisfiable for resource of {size} bytes")]
    MalformedRange { size: u64 },

    /// I/O failure before any byte reached the client
    #[error("stream failure before first byte: {source}")]
    Stream {
        #[from]
        source: io::Error,
    },
}

impl MediaError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MalformedRange { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::Stream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
