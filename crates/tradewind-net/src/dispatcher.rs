//! The dispatcher boundary: what the connection layer asks of the
//! application when the peer speaks first.
//!
//! The receive loop hands every inbound document that is not a
//! correlated reply to the installed [`Dispatcher`]. For a `question`,
//! the returned document (or `None`) is wrapped in a `reply` envelope
//! and sent back; a [`DispatchError`] becomes an `error` reply instead.
//! For a bare notification, a returned document is sent back unwrapped
//! and an error is logged and dropped.

use async_trait::async_trait;
use tradewind_wire::Element;

use crate::Connection;

/// Handles inbound unsolicited documents on behalf of the application.
///
/// Implementations resolve the document to a message variant and run its
/// handler. Returning `Ok(None)` means "no reply owed"; for a question
/// the asker still gets the bare acknowledgement envelope.
///
/// The connection is passed in so handlers can push follow-up messages
/// to the same peer (or stash a clone; `Connection` is cheap to clone).
/// Domain-level refusals should not surface here: convert them into
/// `error` documents and return them as the reply, so the remote asker
/// sees a typed rejection rather than a dropped question.
#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    /// Handles one document the peer sent first: the body of a
    /// `question`, or a bare notification. Returns the document owed
    /// in response, or `None` when handling it is the whole answer
    /// (a question is then acknowledged with an empty reply).
    async fn dispatch(
        &self,
        connection: &Connection,
        document: Element,
    ) -> Result<Option<Element>, DispatchError>;
}

/// Why a dispatcher could not produce a reply.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No message variant answers to this tag.
    #[error("unknown message tag: {0}")]
    UnknownTag(String),

    /// The document decoded but is unusable for its variant: required
    /// attributes missing or unparsable.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The handler itself failed in a way it could not express as an
    /// `error` document.
    #[error("handler failed: {0}")]
    Failed(String),
}
