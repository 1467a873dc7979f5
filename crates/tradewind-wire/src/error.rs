//! Error types for the wire layer.
//!
//! A `WireError` always means the bytes or the document shape were
//! wrong. Networking and message-handling failures live in the crates
//! that own those concerns.

/// Errors that can occur in the wire layer.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Turning a document into record bytes failed.
    #[cfg(feature = "json")]
    #[error("could not encode document: {0}")]
    Encode(serde_json::Error),

    /// The record bytes are not a document.
    ///
    /// The receive loop logs these and drops the record; a corrupt
    /// record must not terminate the connection.
    #[cfg(feature = "json")]
    #[error("could not decode record: {0}")]
    Decode(serde_json::Error),

    /// The record parsed but violates document or envelope invariants:
    /// an empty tag, duplicate attribute names, a `question` without a
    /// usable `networkReplyId`, and the like.
    #[error("malformed record: {0}")]
    Malformed(String),
}
