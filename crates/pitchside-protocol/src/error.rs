//! Error types for the protocol layer.
//!
//! Each crate in Pitchside defines its own error enum. When you see a
//! `ProtocolError`, the problem is in the shape of a message: a frame or
//! payload that could not be decoded, or a payload missing a field the
//! message kind requires. It never says anything about the roster.

/// Errors that can occur in the protocol layer.
///
/// The variants fall into two families that clients see differently:
///
/// - **Decode errors** ([`Decode`](Self::Decode),
///   [`InvalidField`](Self::InvalidField),
///   [`InvalidMessage`](Self::InvalidMessage)): the payload is not the
///   structured record the message kind expects.
/// - **Validation errors** ([`MissingField`](Self::MissingField)): the
///   payload parsed, but a required field is absent.
///
/// Both are reported back to the originating connection only, as the
/// `<kind>-error` reply. [`UnknownEvent`](Self::UnknownEvent) has no
/// kind to reply on and is only logged.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into JSON text).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The payload is not valid JSON.
    ///
    /// Common causes: malformed or truncated text, or a client that sent
    /// a bare string instead of a serialized object.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The payload parsed, but a field the message kind requires is absent.
    ///
    /// A field that is present with a `null` value counts as present.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong JSON type.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    /// The frame names an event this server does not handle.
    #[error("unknown event `{0}`")]
    UnknownEvent(String),

    /// The message is invalid at the protocol level, e.g. a payload
    /// that is valid JSON but not an object.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    /// Returns `true` for errors where the payload parsed but was
    /// incomplete, as opposed to errors where it could not be parsed.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingField(_))
    }
}
