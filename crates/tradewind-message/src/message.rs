//! The shared message contract and the taxonomy registry.

use std::fmt;

use tradewind_wire::envelope::{self, ERROR_MESSAGE_ATTRIBUTE, ERROR_TAG};
use tradewind_wire::Element;

use crate::error::MessageError;
use crate::game::{Game, Rejection};
use crate::spy::SpySettlementMessage;
use crate::types::PlayerId;

/// One variant of the message taxonomy.
///
/// A message is transient: built from application data or decoded off
/// one wire document, then serialized or handled at most once. Nothing
/// persists a message. Variants carry identifier strings and primitive
/// fields only.
pub trait Message: fmt::Debug + Send {
    /// The document tag identifying this variant.
    fn tag(&self) -> &'static str;

    /// Serializes this message to its wire document.
    fn to_document(&self) -> Element;

    /// Applies this message to the game on behalf of `player`.
    ///
    /// Returns the reply document owed to the sender, or `None` when no
    /// reply is owed. A [`Rejection`] is the only failure channel: the
    /// caller turns it into an `error` document for the remote side. A
    /// handler either mutates state and describes the outcome, or
    /// rejects without mutating anything.
    fn handle(
        &self,
        game: &mut dyn Game,
        player: &PlayerId,
    ) -> Result<Option<Element>, Rejection>;
}

/// Decodes one wire document into its message variant.
///
/// The match below is the taxonomy's registry: adding a variant means
/// adding an arm.
pub fn decode(document: &Element) -> Result<Box<dyn Message>, MessageError> {
    match document.tag() {
        SpySettlementMessage::TAG => {
            Ok(Box::new(SpySettlementMessage::from_document(document)?))
        }
        ErrorMessage::TAG => {
            Ok(Box::new(ErrorMessage::from_document(document)?))
        }
        other => Err(MessageError::UnknownTag(other.to_string())),
    }
}

/// Looks up a required attribute on a message document.
pub(crate) fn require_attribute<'a>(
    document: &'a Element,
    tag: &'static str,
    attribute: &'static str,
) -> Result<&'a str, MessageError> {
    document
        .attribute(attribute)
        .ok_or(MessageError::MissingAttribute { tag, attribute })
}

/// The `error` message: a human-readable refusal.
///
/// This is the only way a handler's failure crosses the wire. Handling
/// one locally just logs it; nobody is owed an answer to an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    reason: String,
}

impl ErrorMessage {
    pub const TAG: &'static str = ERROR_TAG;

    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Decodes the message from its wire document.
    pub fn from_document(document: &Element) -> Result<Self, MessageError> {
        let reason =
            require_attribute(document, Self::TAG, ERROR_MESSAGE_ATTRIBUTE)?;
        Ok(Self::new(reason))
    }
}

impl Message for ErrorMessage {
    fn tag(&self) -> &'static str {
        Self::TAG
    }

    fn to_document(&self) -> Element {
        envelope::error_document(&self.reason)
    }

    fn handle(
        &self,
        _game: &mut dyn Game,
        player: &PlayerId,
    ) -> Result<Option<Element>, Rejection> {
        tracing::warn!(%player, reason = %self.reason, "peer reported an error");
        Ok(None)
    }
}
