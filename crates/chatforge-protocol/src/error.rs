//! Error types for the protocol layer.
//!
//! Each crate in Chatforge defines its own error enum. When you see a
//! `ProtocolError`, the problem is in serialization or in the shape of
//! chat text, not in networking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields,
    /// or an event shape the gateway changed under us.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The event is well-formed JSON but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Chat text contains angle brackets outside of a reference sequence.
    ///
    /// The gateway escapes literal `<` and `>` as `&lt;` / `&gt;`, so a bare
    /// bracket means the text was not produced by the gateway.
    #[error("malformed chat text: {0:?}")]
    MalformedText(String),
}
