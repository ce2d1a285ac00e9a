//! Error types for the protocol layer.

/// Errors that can occur while validating or (de)serializing events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (malformed or truncated input, missing
    /// fields, unknown event type).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room code that isn't 4 characters of `A–Z0–9`.
    #[error("invalid room id: {0:?}")]
    InvalidRoomId(String),
}
