//! Wire protocol for Tradewind.
//!
//! Everything a record can be on the wire lives here:
//!
//! - **Documents** ([`Element`], [`Node`]): the self-describing trees
//!   that travel on the wire, one per newline-terminated record.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how a document turns
//!   into record bytes and back.
//! - **Envelopes** ([`envelope`]): the `question`/`reply` correlation
//!   wrappers and the reserved tags the connection layer relies on.
//! - **Errors** ([`WireError`]): what can go wrong while encoding,
//!   decoding, or classifying a record.
//!
//! The wire layer knows nothing about connections or game state. It
//! maps bytes to document trees; the layers above decide what those
//! documents mean.
//!
//! ```text
//! Transport (bytes) → Wire (Element) → Taxonomy (typed Message)
//! ```

mod codec;
mod document;
pub mod envelope;
mod error;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use codec::{decode_document, encode_document};
pub use document::{Element, Node};
pub use error::WireError;
