//! Error types for the wire codec.

use thiserror::Error;

/// Errors raised while decoding an inbound frame.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The frame payload is not valid UTF-8.
    #[error("frame is not valid utf-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The payload is not JSON of the expected shape.
    #[error("malformed snapshot batch: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A snapshot carried an empty identifier.
    #[error("snapshot at index {index} has an empty id")]
    EmptyId {
        /// Position of the offending snapshot in the batch.
        index: usize,
    },

    /// A coordinate overflowed `f32` and decoded as infinite.
    #[error("snapshot at index {index} has a non-finite coordinate")]
    NonFinite {
        /// Position of the offending snapshot in the batch.
        index: usize,
    },
}

/// Errors raised while encoding an outbound message.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// A coordinate is NaN or infinite and has no JSON representation.
    #[error("position of {id:?} has a non-finite coordinate")]
    NonFinite {
        /// Identifier of the entity being encoded.
        id: String,
    },

    /// Serialization failed.
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
