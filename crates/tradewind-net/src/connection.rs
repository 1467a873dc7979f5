//! One socket, the receive loop that drains it, and the write
//! discipline over its output half.
//!
//! The output half lives behind an async mutex held for exactly one
//! record per write, so concurrent senders (application tasks and the
//! loop answering questions) never interleave mid-record. The input
//! half belongs to the receive loop task, which frames records on `\n`,
//! decodes them, and routes replies to the pending table and everything
//! else to the dispatcher.
//!
//! A connection is Open until `close`/`shutdown` or until the loop stops
//! (end-of-stream, fatal read error, or the peer's `disconnect` notice).
//! Closed is terminal: create a new connection to talk again.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use tradewind_wire::envelope::{self, Inbound};
use tradewind_wire::{decode_document, encode_document, Element, JsonCodec};

use crate::correlator::PendingReplies;
use crate::{
    ConnectionConfig, ConnectionId, DispatchMode, Dispatcher, NetError,
};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    /// Raw id of the connection whose receive loop runs on this task.
    ///
    /// This is the self-wait check's whole world: `ask` refuses to
    /// suspend a task that is the only reader able to deliver its reply.
    /// Loop lifecycle is tracked separately (the stored `JoinHandle`),
    /// so identity and teardown stay independent.
    static RECEIVE_LOOP: u64;
}

/// A bidirectional message connection over one TCP stream.
///
/// Cheap to clone; all clones share the same socket, pending-reply table
/// and dispatcher. See the crate docs for the three ways to talk.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

struct Inner {
    id: ConnectionId,
    peer: SocketAddr,
    config: ConnectionConfig,
    codec: JsonCodec,
    /// Output half. `None` once released; taking it is the point of no
    /// return for writes.
    writer: Mutex<Option<BufWriter<OwnedWriteHalf>>>,
    pending: PendingReplies,
    dispatcher: RwLock<Arc<dyn Dispatcher>>,
    closed: AtomicBool,
    recv_task: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    /// Releases transport resources and fails outstanding asks. Reached
    /// from both teardown paths (local close, loop exit); later calls
    /// find nothing left to release.
    async fn release(&self) {
        if let Some(mut writer) = self.writer.lock().await.take() {
            // Flush what we can and send FIN so the peer reads EOF.
            let _ = writer.shutdown().await;
        }
        self.pending.fail_all().await;
    }
}

impl Connection {
    /// Connects to a peer and starts the receive loop, with the default
    /// [`ConnectionConfig`].
    pub async fn connect(
        addr: impl ToSocketAddrs,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Self, NetError> {
        Self::connect_with(addr, dispatcher, ConnectionConfig::default())
            .await
    }

    /// Connects to a peer with an explicit configuration.
    pub async fn connect_with(
        addr: impl ToSocketAddrs,
        dispatcher: Arc<dyn Dispatcher>,
        config: ConnectionConfig,
    ) -> Result<Self, NetError> {
        let stream = TcpStream::connect(addr).await?;
        Self::from_stream_with(stream, dispatcher, config).await
    }

    /// Wraps an already-established stream (typically one just accepted
    /// by a listener) and starts the receive loop.
    pub async fn from_stream(
        stream: TcpStream,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Result<Self, NetError> {
        Self::from_stream_with(stream, dispatcher, ConnectionConfig::default())
            .await
    }

    /// Wraps an already-established stream with an explicit
    /// configuration.
    pub async fn from_stream_with(
        stream: TcpStream,
        dispatcher: Arc<dyn Dispatcher>,
        config: ConnectionConfig,
    ) -> Result<Self, NetError> {
        let peer = stream.peer_addr()?;
        let (read_half, write_half) = stream.into_split();

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        let inner = Arc::new(Inner {
            id,
            peer,
            config,
            codec: JsonCodec,
            writer: Mutex::new(Some(BufWriter::new(write_half))),
            pending: PendingReplies::new(),
            dispatcher: RwLock::new(dispatcher),
            closed: AtomicBool::new(false),
            recv_task: Mutex::new(None),
        });

        let task = tokio::spawn(RECEIVE_LOOP.scope(
            id.into_inner(),
            receive_loop(Arc::clone(&inner), read_half),
        ));
        inner.recv_task.lock().await.replace(task);

        tracing::debug!(%id, %peer, "connection up");
        Ok(Self { inner })
    }

    /// Returns this connection's process-unique id.
    pub fn id(&self) -> ConnectionId {
        self.inner.id
    }

    /// Returns the peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.inner.peer
    }

    /// Returns `true` until the connection is closed, locally or by
    /// the peer going away.
    pub fn is_open(&self) -> bool {
        !self.inner.closed.load(Ordering::SeqCst)
    }

    /// Number of asks currently waiting for a reply.
    pub async fn outstanding_asks(&self) -> usize {
        self.inner.pending.outstanding().await
    }

    /// Replaces the installed dispatcher. Records already handed to the
    /// old dispatcher finish there; subsequent records go to the new
    /// one.
    pub async fn set_dispatcher(&self, dispatcher: Arc<dyn Dispatcher>) {
        *self.inner.dispatcher.write().await = dispatcher;
    }

    /// Sends one message document as a fire-and-forget notification.
    ///
    /// # Errors
    /// [`NetError::Closed`] once the connection is closed;
    /// [`NetError::Io`] on transport failure, which is connection-fatal.
    pub async fn send(&self, document: &Element) -> Result<(), NetError> {
        if !self.is_open() {
            return Err(NetError::Closed);
        }
        self.send_document(document).await
    }

    /// Sends a `question` and suspends until the correlated `reply`
    /// arrives, using the configured ask timeout.
    ///
    /// Returns the reply body, or `None` when the peer's handler owed no
    /// content (the bare acknowledgement).
    pub async fn ask(
        &self,
        document: Element,
    ) -> Result<Option<Element>, NetError> {
        self.ask_with_timeout(document, self.inner.config.ask_timeout)
            .await
    }

    /// [`ask`](Self::ask) with an explicit timeout.
    ///
    /// # Errors
    /// [`NetError::SelfWait`] when called on the receive loop's own task
    /// (nothing is sent); [`NetError::ReplyTimeout`] when the peer stays
    /// silent; [`NetError::Closed`] when the connection ends first;
    /// [`NetError::Rejected`] when the peer answers with an `error`
    /// document; [`NetError::MalformedReply`] when that document has no
    /// reason.
    pub async fn ask_with_timeout(
        &self,
        document: Element,
        timeout: Duration,
    ) -> Result<Option<Element>, NetError> {
        if self.is_receive_loop_task() {
            tracing::warn!(
                id = %self.inner.id,
                "refusing ask from the receive loop task"
            );
            return Err(NetError::SelfWait);
        }
        if !self.is_open() {
            return Err(NetError::Closed);
        }

        let reply_id = self.inner.pending.next_id();
        // Slot first, then send: the reply cannot race past it.
        let rx = self.inner.pending.register(reply_id).await?;
        let question = envelope::wrap_question(reply_id, document);

        if let Err(e) = self.send_document(&question).await {
            self.inner.pending.abandon(reply_id).await;
            return Err(e);
        }

        match self.inner.pending.wait(reply_id, rx, timeout).await? {
            Some(reply) if reply.tag() == envelope::ERROR_TAG => {
                match reply.attribute(envelope::ERROR_MESSAGE_ATTRIBUTE) {
                    Some(reason) => {
                        Err(NetError::Rejected(reason.to_string()))
                    }
                    None => Err(NetError::MalformedReply(
                        "error reply without a message".into(),
                    )),
                }
            }
            body => Ok(body),
        }
    }

    /// `ask`, then feed the reply through the local dispatcher.
    ///
    /// For exchanges where the peer answers with a counter-request the
    /// local side must act on; a document produced by that local
    /// dispatch is sent back as a bare message. Dispatch failures are
    /// logged, not returned; by the time the reply is here, the
    /// exchange on the wire already succeeded.
    pub async fn send_and_wait(
        &self,
        document: Element,
    ) -> Result<(), NetError> {
        if let Some(reply) = self.ask(document).await? {
            match self.dispatch_document(reply).await {
                Ok(Some(follow_up)) => self.send(&follow_up).await?,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        id = %self.inner.id,
                        error = %e,
                        "reply handler failed"
                    );
                }
            }
        }
        Ok(())
    }

    /// Closes the connection: best-effort `disconnect` notice, then
    /// unconditional release of the socket, the receive loop, and every
    /// outstanding ask. Closing twice is a no-op.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        // The notice is a courtesy; the peer may already be gone.
        let notice = envelope::disconnect_document();
        if let Err(e) = self.send_document(&notice).await {
            tracing::debug!(
                id = %self.inner.id,
                error = %e,
                "disconnect notice not sent"
            );
        }
        self.teardown().await;
    }

    /// Releases the connection without the `disconnect` notice. Used
    /// when the peer is known to be gone and a farewell would only fail.
    pub async fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.teardown().await;
    }

    /// Runs the installed dispatcher on one document.
    pub(crate) async fn dispatch_document(
        &self,
        document: Element,
    ) -> Result<Option<Element>, crate::DispatchError> {
        let dispatcher = Arc::clone(&*self.inner.dispatcher.read().await);
        dispatcher.dispatch(self, document).await
    }

    /// Writes one record (encoded document, then the delimiter, then a
    /// flush) under the writer lock, so records never interleave. Does
    /// not consult the closed flag; `close` uses this for the farewell
    /// after flagging.
    async fn send_document(&self, document: &Element) -> Result<(), NetError> {
        // Encode outside the lock; hold it for exactly one write.
        let bytes = encode_document(&self.inner.codec, document)?;

        let mut guard = self.inner.writer.lock().await;
        let writer = guard.as_mut().ok_or(NetError::Closed)?;
        writer.write_all(&bytes).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        tracing::trace!(id = %self.inner.id, tag = document.tag(), "sent");
        Ok(())
    }

    fn is_receive_loop_task(&self) -> bool {
        RECEIVE_LOOP
            .try_with(|owner| *owner == self.inner.id.into_inner())
            .unwrap_or(false)
    }

    async fn teardown(&self) {
        // An inline handler may close its own connection; aborting the
        // task we are running on would cut this teardown short, so the
        // loop is left to notice the closed flag and exit on its own.
        let on_loop_task = self.is_receive_loop_task();
        if let Some(task) = self.inner.recv_task.lock().await.take() {
            if !on_loop_task {
                task.abort();
            }
        }
        self.inner.release().await;
        tracing::debug!(id = %self.inner.id, "connection closed");
    }
}

// ---------------------------------------------------------------------------
// Receive loop
// ---------------------------------------------------------------------------

/// Drains the input half until the stream ends, a read fails, or the
/// peer says `disconnect`. One bad record is one warning, never the end
/// of the loop.
async fn receive_loop(inner: Arc<Inner>, read_half: OwnedReadHalf) {
    let id = inner.id;
    let mut reader = BufReader::new(read_half);
    let mut buf = Vec::new();

    loop {
        // Set mid-dispatch when an inline handler closes the connection.
        if inner.closed.load(Ordering::SeqCst) {
            break;
        }

        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                tracing::debug!(%id, "peer closed the stream");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    %id,
                    error = %e,
                    "read failed, stopping the receive loop"
                );
                break;
            }
        }

        let record = match buf.split_last() {
            Some((&b'\n', record)) => record,
            // End-of-stream can truncate the delimiter off a final record.
            _ => &buf[..],
        };
        if record.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let document = match decode_document(&inner.codec, record) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(%id, error = %e, "dropping malformed record");
                continue;
            }
        };
        tracing::trace!(%id, tag = document.tag(), "received");

        match envelope::classify(document) {
            Ok(Inbound::Reply { reply_id, body }) => {
                inner.pending.fulfill(reply_id, body).await;
            }
            Ok(Inbound::Question { reply_id, body }) => {
                let connection = Connection {
                    inner: Arc::clone(&inner),
                };
                match inner.config.dispatch {
                    DispatchMode::Spawned => {
                        tokio::spawn(answer_question(
                            connection, reply_id, body,
                        ));
                    }
                    DispatchMode::Inline => {
                        answer_question(connection, reply_id, body).await;
                    }
                }
            }
            Ok(Inbound::Message(document)) => {
                let connection = Connection {
                    inner: Arc::clone(&inner),
                };
                match inner.config.dispatch {
                    DispatchMode::Spawned => {
                        tokio::spawn(handle_notification(
                            connection, document,
                        ));
                    }
                    DispatchMode::Inline => {
                        handle_notification(connection, document).await;
                    }
                }
            }
            Ok(Inbound::Disconnect) => {
                tracing::debug!(%id, "peer announced disconnect");
                break;
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "dropping malformed envelope");
            }
        }
    }

    inner.closed.store(true, Ordering::SeqCst);
    inner.release().await;
    tracing::debug!(%id, "receive loop stopped");
}

/// Answers one inbound question: dispatch the body, wrap the outcome in
/// a `reply` envelope, send it back. The envelope is bare when the
/// handler owes nothing and carries an `error` document when it fails,
/// so the asker on the other side always unblocks.
async fn answer_question(connection: Connection, reply_id: u32, body: Element) {
    let reply = match connection.dispatch_document(body).await {
        Ok(body) => envelope::wrap_reply(reply_id, body),
        Err(e) => {
            tracing::debug!(
                id = %connection.id(),
                reply_id,
                error = %e,
                "question refused, answering with an error"
            );
            envelope::wrap_reply(
                reply_id,
                Some(envelope::error_document(&e.to_string())),
            )
        }
    };
    if let Err(e) = connection.send(&reply).await {
        tracing::warn!(
            id = %connection.id(),
            reply_id,
            error = %e,
            "failed to send reply"
        );
    }
}

/// Handles one bare notification. A produced document goes back
/// unwrapped; a dispatch failure is logged and dropped, as nobody is
/// waiting on the other side.
async fn handle_notification(connection: Connection, document: Element) {
    let tag = document.tag().to_string();
    match connection.dispatch_document(document).await {
        Ok(Some(reply)) => {
            if let Err(e) = connection.send(&reply).await {
                tracing::warn!(
                    id = %connection.id(),
                    error = %e,
                    "failed to send follow-up"
                );
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(
                id = %connection.id(),
                tag = %tag,
                error = %e,
                "dropping unhandled notification"
            );
        }
    }
}
