//! Correlation envelopes and reserved wire tags.
//!
//! Three tags are owned by the connection layer rather than the message
//! taxonomy:
//!
//! - `question`: wraps a message sent via `ask`, carrying the
//!   correlation id in the `networkReplyId` attribute.
//! - `reply`: wraps the answer to a question, carrying the same id. A
//!   reply may be empty (no wrapped message): it acknowledges a question
//!   whose handler owed no content, so the asker still unblocks.
//! - `disconnect`: sent best-effort just before a peer releases its
//!   socket. Receiving it means the connection is over; peers must treat
//!   plain end-of-stream the same way, since the notice is not
//!   guaranteed to arrive.
//!
//! Everything else on the wire is a bare message document, routed to the
//! installed dispatcher. [`classify`] performs that three-way split for
//! the receive loop.

use crate::{Element, WireError};

/// Tag of the envelope wrapping a message sent via `ask`.
pub const QUESTION_TAG: &str = "question";

/// Tag of the envelope wrapping the answer to a question.
pub const REPLY_TAG: &str = "reply";

/// Attribute carrying the correlation id on `question`/`reply` envelopes.
pub const REPLY_ID_ATTRIBUTE: &str = "networkReplyId";

/// Reserved tag announcing an orderly disconnect.
pub const DISCONNECT_TAG: &str = "disconnect";

/// Tag of the error message variant, the only sanctioned way a handler
/// reports failure to the remote caller.
pub const ERROR_TAG: &str = "error";

/// Attribute carrying the human-readable reason on an `error` document.
pub const ERROR_MESSAGE_ATTRIBUTE: &str = "message";

/// Wraps a message document in a `question` envelope.
pub fn wrap_question(reply_id: u32, body: Element) -> Element {
    Element::new(QUESTION_TAG)
        .with_attribute(REPLY_ID_ATTRIBUTE, reply_id.to_string())
        .with_child(body)
}

/// Wraps a reply document in a `reply` envelope.
///
/// `None` produces the bare acknowledgement envelope: just the tag and
/// the correlation id.
pub fn wrap_reply(reply_id: u32, body: Option<Element>) -> Element {
    let envelope = Element::new(REPLY_TAG)
        .with_attribute(REPLY_ID_ATTRIBUTE, reply_id.to_string());
    match body {
        Some(body) => envelope.with_child(body),
        None => envelope,
    }
}

/// Builds the reserved disconnect notice.
pub fn disconnect_document() -> Element {
    Element::new(DISCONNECT_TAG)
}

/// Builds an `error` document carrying a human-readable reason.
pub fn error_document(reason: &str) -> Element {
    Element::new(ERROR_TAG).with_attribute(ERROR_MESSAGE_ATTRIBUTE, reason)
}

// ---------------------------------------------------------------------------
// Inbound classification
// ---------------------------------------------------------------------------

/// One inbound document, sorted by what the receive loop must do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A `question` envelope: dispatch the body, send back a `reply`
    /// with the same id.
    Question { reply_id: u32, body: Element },
    /// A `reply` envelope: fulfill the pending slot for `reply_id`.
    /// `body` is `None` for the bare acknowledgement.
    Reply { reply_id: u32, body: Option<Element> },
    /// The peer announced an orderly disconnect; stop the loop.
    Disconnect,
    /// A bare message: dispatch it, send any produced document back
    /// unwrapped.
    Message(Element),
}

/// Classifies one decoded inbound document.
///
/// # Errors
/// Returns [`WireError::Malformed`] for an envelope whose correlation id
/// is missing or not a number, or a `question` with nothing inside it.
/// Callers drop such records and keep the loop running.
pub fn classify(document: Element) -> Result<Inbound, WireError> {
    match document.tag() {
        QUESTION_TAG => {
            let reply_id = parse_reply_id(&document)?;
            let body = document.into_first_child_element().ok_or_else(|| {
                WireError::Malformed("question without a body".into())
            })?;
            Ok(Inbound::Question { reply_id, body })
        }
        REPLY_TAG => {
            let reply_id = parse_reply_id(&document)?;
            let body = document.into_first_child_element();
            Ok(Inbound::Reply { reply_id, body })
        }
        DISCONNECT_TAG => Ok(Inbound::Disconnect),
        _ => Ok(Inbound::Message(document)),
    }
}

fn parse_reply_id(envelope: &Element) -> Result<u32, WireError> {
    let raw = envelope.attribute(REPLY_ID_ATTRIBUTE).ok_or_else(|| {
        WireError::Malformed(format!(
            "{} without {}",
            envelope.tag(),
            REPLY_ID_ATTRIBUTE
        ))
    })?;
    raw.parse().map_err(|_| {
        WireError::Malformed(format!(
            "{} with non-numeric {}: {raw:?}",
            envelope.tag(),
            REPLY_ID_ATTRIBUTE
        ))
    })
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn spy_doc() -> Element {
        Element::new("spySettlement")
            .with_attribute("unit", "U-1")
            .with_attribute("direction", "N")
    }

    #[test]
    fn test_question_wraps_and_classifies() {
        let question = wrap_question(42, spy_doc());
        assert_eq!(question.tag(), QUESTION_TAG);
        assert_eq!(question.attribute(REPLY_ID_ATTRIBUTE), Some("42"));

        match classify(question).expect("classify") {
            Inbound::Question { reply_id, body } => {
                assert_eq!(reply_id, 42);
                assert_eq!(body, spy_doc());
            }
            other => panic!("expected Question, got {other:?}"),
        }
    }

    #[test]
    fn test_reply_with_body_classifies() {
        let reply = wrap_reply(7, Some(spy_doc()));
        match classify(reply).expect("classify") {
            Inbound::Reply { reply_id, body } => {
                assert_eq!(reply_id, 7);
                assert_eq!(body, Some(spy_doc()));
            }
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_reply_acknowledges_without_body() {
        let reply = wrap_reply(9, None);
        assert!(reply.children().is_empty());

        match classify(reply).expect("classify") {
            Inbound::Reply { reply_id, body } => {
                assert_eq!(reply_id, 9);
                assert_eq!(body, None);
            }
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[test]
    fn test_disconnect_classifies_as_disconnect() {
        assert_eq!(
            classify(disconnect_document()).expect("classify"),
            Inbound::Disconnect
        );
    }

    #[test]
    fn test_other_tags_pass_through_as_messages() {
        match classify(spy_doc()).expect("classify") {
            Inbound::Message(doc) => assert_eq!(doc.tag(), "spySettlement"),
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[test]
    fn test_question_without_reply_id_is_malformed() {
        let envelope = Element::new(QUESTION_TAG).with_child(spy_doc());
        assert!(matches!(
            classify(envelope),
            Err(WireError::Malformed(_))
        ));
    }

    #[test]
    fn test_question_with_non_numeric_reply_id_is_malformed() {
        let envelope = Element::new(QUESTION_TAG)
            .with_attribute(REPLY_ID_ATTRIBUTE, "soon")
            .with_child(spy_doc());
        assert!(matches!(
            classify(envelope),
            Err(WireError::Malformed(_))
        ));
    }

    #[test]
    fn test_question_without_body_is_malformed() {
        let envelope = Element::new(QUESTION_TAG)
            .with_attribute(REPLY_ID_ATTRIBUTE, "1");
        assert!(matches!(
            classify(envelope),
            Err(WireError::Malformed(_))
        ));
    }

    #[test]
    fn test_error_document_shape() {
        let doc = error_document("no such unit");
        assert_eq!(doc.tag(), ERROR_TAG);
        assert_eq!(
            doc.attribute(ERROR_MESSAGE_ATTRIBUTE),
            Some("no such unit")
        );
    }
}
