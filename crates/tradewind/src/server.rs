//! `Server` builder and accept loop.
//!
//! The server is deliberately thin: it owns the listener and turns each
//! accepted socket into a [`Connection`] with its own dispatcher.
//! Everything after the accept (framing, correlation, dispatch,
//! teardown) is the connection's job.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tradewind_net::{Connection, ConnectionConfig, Dispatcher};

use crate::TradewindError;

/// Configures a Tradewind server before it binds.
///
/// # Example
///
/// ```rust,ignore
/// use tradewind::prelude::*;
///
/// let server = Server::builder()
///     .bind("0.0.0.0:3025")
///     .build()
///     .await?;
/// server.run(|| next_dispatcher()).await
/// ```
pub struct ServerBuilder {
    bind_addr: String,
    connection_config: ConnectionConfig,
}

impl ServerBuilder {
    /// Starts from the defaults: loopback on port 8080, default
    /// connection configuration.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            connection_config: ConnectionConfig::default(),
        }
    }

    /// Sets the listen address (use port 0 to let the OS pick one).
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration applied to every accepted connection.
    pub fn connection_config(mut self, config: ConnectionConfig) -> Self {
        self.connection_config = config;
        self
    }

    /// Binds the listener and returns the server, ready to run.
    pub async fn build(self) -> Result<Server, TradewindError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        Ok(Server {
            listener,
            connection_config: self.connection_config,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Tradewind server; [`run()`](Self::run) starts accepting.
pub struct Server {
    listener: TcpListener,
    connection_config: ConnectionConfig,
}

impl Server {
    /// Returns a fresh [`ServerBuilder`].
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// The address the listener actually bound. With port 0 this is
    /// where the OS put the server.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// `make_dispatcher` is called once per accepted socket, so every
    /// connection gets its own dispatcher, typically a
    /// [`GameDispatcher`](crate::GameDispatcher) bound to whichever
    /// player that socket speaks for. Each connection then runs itself;
    /// a failed accept or a failed connection setup is logged and the
    /// loop moves on.
    pub async fn run<F>(self, mut make_dispatcher: F) -> Result<(), TradewindError>
    where
        F: FnMut() -> Arc<dyn Dispatcher> + Send,
    {
        tracing::info!("Tradewind server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let dispatcher = make_dispatcher();
                    let config = self.connection_config.clone();
                    match Connection::from_stream_with(
                        stream, dispatcher, config,
                    )
                    .await
                    {
                        Ok(connection) => {
                            tracing::debug!(
                                id = %connection.id(),
                                %peer,
                                "accepted"
                            );
                        }
                        Err(e) => {
                            tracing::debug!(
                                %peer,
                                error = %e,
                                "connection setup failed"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
