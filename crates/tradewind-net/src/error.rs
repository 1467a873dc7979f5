//! Error types for the connection layer.

use tradewind_wire::WireError;

/// Errors that can occur on a connection.
///
/// The four ways an `ask` can fail are distinct variants so callers can
/// tell them apart: the peer never answered ([`ReplyTimeout`]), the
/// connection ended first ([`Closed`]), the peer refused the request
/// ([`Rejected`]), or the peer answered with something unusable
/// ([`MalformedReply`]).
///
/// [`ReplyTimeout`]: NetError::ReplyTimeout
/// [`Closed`]: NetError::Closed
/// [`Rejected`]: NetError::Rejected
/// [`MalformedReply`]: NetError::MalformedReply
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Transport failure. Connection-fatal: the socket is not usable
    /// after one of these.
    #[error("i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding an outbound record failed.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The connection is closed (locally via `close`, or because the
    /// peer went away and the receive loop stopped).
    #[error("connection closed")]
    Closed,

    /// No reply arrived for this correlation id within the ask timeout.
    /// The connection itself remains usable.
    #[error("timed out waiting for reply {0}")]
    ReplyTimeout(u32),

    /// `ask` was called on the receive loop's own task, which would
    /// suspend the only reader that could deliver the reply. Fails
    /// before anything is sent.
    #[error("ask from the receive loop task would deadlock")]
    SelfWait,

    /// A correlation id was registered twice. Cannot happen with ids
    /// from the correlator until its counter wraps.
    #[error("correlation id {0} already registered")]
    DuplicateReplyId(u32),

    /// The peer answered the question with an `error` document carrying
    /// this reason.
    #[error("peer rejected the request: {0}")]
    Rejected(String),

    /// The peer answered with an `error` document missing its reason,
    /// or otherwise unusable.
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}
