//! Codec trait and implementations for serializing documents.
//!
//! The [`Codec`] trait is the seam between documents and bytes: how a
//! record is actually serialized stays swappable without touching the
//! connection layer. [`JsonCodec`] is the one implementation provided,
//! and keeps a captured stream human-readable; a binary codec would
//! slot in without changing any other code.
//!
//! Framing is NOT the codec's job: encoded records carry no length
//! prefix and no per-record preamble. The connection layer terminates
//! each record with a single `\n` and splits inbound bytes on it, so a
//! codec must never emit a raw newline inside a record (JSON escapes
//! them, so [`JsonCodec`] is safe).

use serde::{de::DeserializeOwned, Serialize};

use crate::{Element, WireError};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the connection layer shares one codec
/// between application tasks and the receive loop. The `encode`/`decode`
/// methods are generic over the serde traits rather than hard-wired to
/// [`Element`] so envelope and document alike go through one pair of
/// functions; `DeserializeOwned` means decoded values own their data and
/// the input buffer can be reused for the next record.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into record bytes (no trailing delimiter).
    ///
    /// # Errors
    /// Returns [`WireError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, WireError>;

    /// Deserializes record bytes back into a value.
    ///
    /// # Errors
    /// Returns [`WireError::Decode`] if the bytes are malformed,
    /// truncated, or don't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8])
    -> Result<T, WireError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// One document becomes one single-line JSON object, which makes a
/// captured stream readable as-is. Behind the `json` feature flag
/// (enabled by default).
///
/// ## Example
///
/// ```rust
/// use tradewind_wire::{Codec, Element, JsonCodec};
///
/// let codec = JsonCodec;
/// let doc = Element::new("spySettlement")
///     .with_attribute("unit", "U-1")
///     .with_attribute("direction", "N");
///
/// let bytes = codec.encode(&doc).unwrap();
/// let decoded: Element = codec.decode(&bytes).unwrap();
/// assert_eq!(doc, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(value).map_err(WireError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, WireError> {
        serde_json::from_slice(data).map_err(WireError::Decode)
    }
}

// ---------------------------------------------------------------------------
// Document-level helpers
// ---------------------------------------------------------------------------

/// Encodes one document into record bytes.
pub fn encode_document(
    codec: &impl Codec,
    document: &Element,
) -> Result<Vec<u8>, WireError> {
    codec.encode(document)
}

/// Decodes record bytes into one document and checks well-formedness.
///
/// Bytes that parse but violate the document invariants (empty tag,
/// duplicate attribute names) are rejected as [`WireError::Malformed`];
/// the receive loop drops such records the same way it drops unparsable
/// ones.
pub fn decode_document(
    codec: &impl Codec,
    data: &[u8],
) -> Result<Element, WireError> {
    let document: Element = codec.decode(data)?;
    document.check_well_formed()?;
    Ok(document)
}
