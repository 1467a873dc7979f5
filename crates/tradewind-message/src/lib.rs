//! The message taxonomy: typed messages over wire documents.
//!
//! Every variant knows its document tag, serializes itself to one wire
//! document, decodes itself back, and carries a `handle` operation that
//! applies it to server-side [`Game`] state. Handlers fail by returning
//! a [`Rejection`] whose reason travels to the remote caller inside an
//! `error` document; no failure here crosses the connection boundary as
//! anything but data.
//!
//! The taxonomy is closed but extensible: [`decode`] is the registry,
//! one arm per variant.

mod error;
mod game;
mod message;
mod spy;
mod types;

pub use error::MessageError;
pub use game::{Game, Rejection, Settlement, Tile, Unit};
pub use message::{decode, ErrorMessage, Message};
pub use spy::SpySettlementMessage;
pub use types::{
    Ability, Direction, PlayerId, SettlementId, TileId, UnitId,
};
