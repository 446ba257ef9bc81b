//! Error types for the serialization core.

use std::fmt;

/// Which half of a serdes a registry lookup asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Serializer,
    Deserializer,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Serializer => f.write_str("serializer"),
            Direction::Deserializer => f.write_str("deserializer"),
        }
    }
}

/// Error type for media type handling and (de)serialization.
///
/// Every variant is a recoverable, typed failure raised synchronously from
/// the operation that detects it. Nothing here is retried internally; retry
/// is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerdesError {
    /// Pattern text lacks a `/` separator or has an empty or invalid part.
    /// Raised when patterns are validated at registration, never at lookup.
    #[error("malformed media type: {0}")]
    MalformedMediaType(String),

    /// No registered binding matches the requested type and content type.
    #[error("no {direction} registered for type {type_name} and content type {content_type}")]
    NoSerdesRegistered {
        direction: Direction,
        type_name: &'static str,
        content_type: String,
    },

    /// Wire content does not match the expected shape (wrong bracket type,
    /// unparsable number, unsupported container type).
    #[error("unable to deserialize: {0}")]
    UnableToDeserialize(String),
}
