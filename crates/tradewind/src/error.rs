//! Unified error type for the Tradewind stack.

use tradewind_message::MessageError;
use tradewind_net::NetError;
use tradewind_wire::WireError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `tradewind` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate. The
/// `#[from]` attribute on each variant auto-generates `From` impls, so
/// the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TradewindError {
    /// A connection-level error (send, ask, teardown).
    #[error(transparent)]
    Net(#[from] NetError),

    /// A wire-level error (encode, decode, malformed record).
    #[error(transparent)]
    Wire(#[from] WireError),

    /// A taxonomy-level error (unknown tag, bad attribute).
    #[error(transparent)]
    Message(#[from] MessageError),

    /// A listener-level I/O error (bind, accept).
    #[error("i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_net_error() {
        let err = NetError::ReplyTimeout(7);
        let tradewind_err: TradewindError = err.into();
        assert!(matches!(tradewind_err, TradewindError::Net(_)));
        assert!(tradewind_err.to_string().contains('7'));
    }

    #[test]
    fn test_from_wire_error() {
        let err = WireError::Malformed("empty tag".into());
        let tradewind_err: TradewindError = err.into();
        assert!(matches!(tradewind_err, TradewindError::Wire(_)));
    }

    #[test]
    fn test_from_message_error() {
        let err = MessageError::UnknownTag("teleport".into());
        let tradewind_err: TradewindError = err.into();
        assert!(matches!(tradewind_err, TradewindError::Message(_)));
        assert!(tradewind_err.to_string().contains("teleport"));
    }

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::other("address in use");
        let tradewind_err: TradewindError = err.into();
        assert!(matches!(tradewind_err, TradewindError::Io(_)));
    }
}
