//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in (de)serialization or in a
//! value that can't be valid on the wire, not in networking or storage.

/// Errors that can occur in the protocol layer.
///
/// `#[derive(thiserror::Error)]` generates the `std::error::Error`
/// implementation; each `#[error("...")]` is the message you see when the
/// error is printed or logged.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: the backend returned HTML instead of JSON, a
    /// required field is missing, or a role string we don't know.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value parsed fine but breaks a protocol rule, e.g. a login
    /// grant with an empty token or a role name outside the closed set.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
