use thiserror::Error;

/// Failures turning a wire document into a message.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The document's tag names no variant in the taxonomy.
    #[error("unknown message tag: {0}")]
    UnknownTag(String),

    /// A required attribute is absent.
    #[error("message '{tag}' is missing attribute '{attribute}'")]
    MissingAttribute {
        tag: &'static str,
        attribute: &'static str,
    },

    /// An attribute is present but unparsable.
    #[error("message '{tag}' has invalid {attribute} '{value}'")]
    InvalidAttribute {
        tag: &'static str,
        attribute: &'static str,
        value: String,
    },
}
