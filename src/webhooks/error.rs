//! Error types for admission handling.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while turning an admission request into a response
#[derive(Error, Debug)]
pub enum Error {
    /// Request is for a resource other than core/v1 Pod
    #[error("unexpected kind {0}, expected /v1, Kind=Pod")]
    UnexpectedKind(String),

    /// Request carries no object to mutate
    #[error("admission request has no object")]
    MissingObject,

    /// Raw object could not be decoded as a Pod
    #[error("failed to decode pod: {0}")]
    Decode(#[source] serde_json::Error),

    /// Mutated pod could not be serialized
    #[error("failed to encode pod: {0}")]
    Encode(#[source] serde_json::Error),

    /// JSON patch could not be serialized into the response
    #[error("failed to serialize patch: {0}")]
    Patch(String),
}

impl Error {
    /// HTTP-equivalent code carried in the admission status
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::UnexpectedKind(_) | Error::MissingObject | Error::Decode(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Encode(_) | Error::Patch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable reason carried in the admission status
    pub fn reason(&self) -> &'static str {
        match self {
            Error::UnexpectedKind(_) | Error::MissingObject | Error::Decode(_) => "BadRequest",
            Error::Encode(_) | Error::Patch(_) => "InternalError",
        }
    }

    /// Outcome name used in logs and metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            Error::UnexpectedKind(_) | Error::MissingObject | Error::Decode(_) => "decode_error",
            Error::Encode(_) | Error::Patch(_) => "encode_error",
        }
    }
}

/// Result type alias for admission handling
pub type Result<T> = std::result::Result<T, Error>;
