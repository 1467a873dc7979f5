//! # Tradewind
//!
//! Message-oriented client/server networking for turn-based games.
//!
//! Tradewind ties three layers together: wire documents and
//! correlation envelopes (`tradewind-wire`), connections with a receive
//! loop and ask/reply correlation (`tradewind-net`), and the typed
//! message taxonomy with its game-facing handler contract
//! (`tradewind-message`).
//!
//! A server implements [`Game`], wraps it in a [`GameDispatcher`] per
//! connection, and runs a [`Server`]. A client opens a [`Connection`]
//! and talks: [`send`](Connection::send) for notifications,
//! [`ask`](Connection::ask) for request/reply exchanges.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tradewind::prelude::*;
//!
//! // Implement Game for your game state, then:
//! // let server = Server::builder()
//! //     .bind("0.0.0.0:8080")
//! //     .build()
//! //     .await?;
//! // server.run(|| next_dispatcher()).await
//! ```

mod dispatch;
mod error;
mod server;

pub use dispatch::GameDispatcher;
pub use error::TradewindError;
pub use server::{Server, ServerBuilder};

pub use tradewind_message::{
    decode, Ability, Direction, ErrorMessage, Game, Message, MessageError,
    PlayerId, Rejection, Settlement, SettlementId, SpySettlementMessage,
    Tile, TileId, Unit, UnitId,
};
pub use tradewind_net::{
    async_trait, Connection, ConnectionConfig, ConnectionId, DispatchError,
    DispatchMode, Dispatcher, NetError,
};
pub use tradewind_wire::{envelope, Element, Node, WireError};

/// Everything an application usually needs.
pub mod prelude {
    pub use crate::{
        async_trait, decode, Ability, Connection, ConnectionConfig,
        Direction, DispatchError, DispatchMode, Dispatcher, Element,
        ErrorMessage, Game, GameDispatcher, Message, NetError, PlayerId,
        Rejection, Server, ServerBuilder, Settlement, SettlementId,
        SpySettlementMessage, Tile, TileId, TradewindError, Unit, UnitId,
    };
}
