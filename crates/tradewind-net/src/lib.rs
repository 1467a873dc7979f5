//! Connection layer for Tradewind.
//!
//! One [`Connection`] owns one TCP socket and everything that happens on
//! it: the exclusive-write discipline over the output half, the receive
//! loop task draining the input half, the pending-reply table that
//! correlates `ask` calls with their answers, and the installed
//! [`Dispatcher`] that handles whatever the peer sends on its own
//! initiative.
//!
//! Three ways to talk:
//!
//! - [`Connection::send`]: fire-and-forget notification.
//! - [`Connection::ask`]: send a `question`, suspend until the
//!   correlated `reply` arrives (or the timeout / the connection's end).
//! - [`Connection::send_and_wait`]: `ask`, then run the reply through
//!   the local dispatcher, for peers that answer with a counter-request.
//!
//! ```text
//! caller ──ask──▶ Connection ──question──▶ peer
//!                     ▲                      │ dispatch + handle
//!                     │                      ▼
//!              receive loop ◀────reply───── peer
//!                     │
//!              fulfill pending slot ──▶ caller resumes
//! ```
//!
//! Inbound records that fail to decode are logged and dropped; a
//! corrupt record never terminates the connection. Only end-of-stream,
//! a fatal read error, or the peer's `disconnect` notice stop the loop,
//! and all of them release every blocked asker with
//! [`NetError::Closed`].

mod config;
mod connection;
mod correlator;
mod dispatcher;
mod error;

pub use config::{ConnectionConfig, DispatchMode};
pub use connection::Connection;
pub use correlator::PendingReplies;
pub use dispatcher::{DispatchError, Dispatcher};
pub use error::NetError;

// Implementors of `Dispatcher` need the macro; re-exported so they don't
// have to depend on the crate themselves.
pub use async_trait::async_trait;

use std::fmt;

/// Process-unique identifier of one [`Connection`].
///
/// Allocated from a process-wide counter when the connection is built;
/// logs render it as `conn-N`. The raw value doubles as the receive
/// loop's task-local marker for the self-wait check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw counter value behind this id.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
