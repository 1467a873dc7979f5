//! Per-connection configuration.

use std::time::Duration;

// ---------------------------------------------------------------------------
// ConnectionConfig
// ---------------------------------------------------------------------------

/// Configuration for one connection.
///
/// Both constructors have a `*_with` variant taking this; the plain
/// forms use [`ConnectionConfig::default`].
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// How long [`ask`](crate::Connection::ask) waits for the correlated
    /// reply before failing with a reply timeout.
    pub ask_timeout: Duration,

    /// Where inbound unsolicited documents are dispatched.
    pub dispatch: DispatchMode,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ask_timeout: Duration::from_secs(30),
            dispatch: DispatchMode::Spawned,
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchMode
// ---------------------------------------------------------------------------

/// Where the receive loop runs the dispatcher for an inbound question or
/// notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Dispatch on a freshly spawned task (the default). The loop goes
    /// straight back to reading, so a slow handler cannot starve the
    /// delivery of replies other askers are waiting on, and a handler
    /// may itself call `ask` on the same connection.
    Spawned,

    /// Dispatch inline on the receive loop task. Records are handled
    /// strictly one at a time in arrival order. A handler running inline
    /// must not `ask` on its own connection (the reply could never be
    /// read), so `ask` fails fast with
    /// [`NetError::SelfWait`](crate::NetError::SelfWait) there.
    Inline,
}
