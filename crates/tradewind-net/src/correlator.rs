//! Reply correlation: the table of asks still waiting for their answer.
//!
//! Every `ask` allocates a fresh correlation id, registers a one-shot
//! slot under it, and sends the id out inside the `question` envelope.
//! When the receive loop sees a `reply` carrying that id it fulfills the
//! slot, and the suspended caller resumes with the reply body. A slot
//! has one waiter and is fulfilled at most once; "already fulfilled"
//! and "already timed out" are the two ends of a closed channel, not
//! races.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tradewind_wire::Element;

use crate::NetError;

/// A reply body: the document inside the `reply` envelope, or `None`
/// for the bare acknowledgement.
type ReplyBody = Option<Element>;

/// The pending-reply table for one connection.
///
/// Shared between application tasks (which register and wait) and the
/// receive loop (which fulfills). Teardown fails every outstanding slot
/// so no caller waits past the connection's lifetime.
pub struct PendingReplies {
    /// Source of correlation ids. Strictly increasing from 1; wraps at
    /// `u32::MAX`, which can only collide with a still-outstanding id if
    /// 2^32 asks are in flight at once.
    next_id: AtomicU32,
    slots: Mutex<HashMap<u32, oneshot::Sender<ReplyBody>>>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a fresh correlation id.
    pub fn next_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Creates the slot for `id` and hands back the receiving end.
    ///
    /// Register happens before the question is written, so a reply can
    /// never race past its own slot.
    ///
    /// # Errors
    /// Returns [`NetError::DuplicateReplyId`] if `id` already has a
    /// slot; ids from [`next_id`](Self::next_id) cannot collide until
    /// the counter wraps.
    pub async fn register(
        &self,
        id: u32,
    ) -> Result<oneshot::Receiver<ReplyBody>, NetError> {
        use std::collections::hash_map::Entry;

        let mut slots = self.slots.lock().await;
        match slots.entry(id) {
            Entry::Occupied(_) => Err(NetError::DuplicateReplyId(id)),
            Entry::Vacant(entry) => {
                let (tx, rx) = oneshot::channel();
                entry.insert(tx);
                Ok(rx)
            }
        }
    }

    /// Suspends until the slot for `id` is fulfilled, the `timeout`
    /// elapses, or the connection tears the table down.
    ///
    /// # Errors
    /// [`NetError::ReplyTimeout`] after `timeout` (the slot is
    /// deregistered first, so a late reply is dropped as stale);
    /// [`NetError::Closed`] when teardown dropped the slot.
    pub async fn wait(
        &self,
        id: u32,
        rx: oneshot::Receiver<ReplyBody>,
        timeout: Duration,
    ) -> Result<ReplyBody, NetError> {
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(body)) => Ok(body),
            Ok(Err(_)) => Err(NetError::Closed),
            Err(_) => {
                self.abandon(id).await;
                Err(NetError::ReplyTimeout(id))
            }
        }
    }

    /// Deposits a reply and releases the waiter for `id`.
    ///
    /// Returns `false` for an unknown id (stale, duplicate, or foreign);
    /// the reply is dropped with a warning and nothing else happens, so
    /// the receive loop keeps running no matter what the peer sends.
    pub async fn fulfill(&self, id: u32, body: ReplyBody) -> bool {
        let sender = self.slots.lock().await.remove(&id);
        match sender {
            Some(sender) => {
                // Send fails only if the waiter gave up between its
                // timeout and our lookup; the reply is stale either way.
                if sender.send(body).is_err() {
                    tracing::warn!(
                        reply_id = id,
                        "reply arrived after its asker gave up"
                    );
                    return false;
                }
                true
            }
            None => {
                tracing::warn!(reply_id = id, "reply with no pending slot");
                false
            }
        }
    }

    /// Removes the slot for `id` without fulfilling it.
    pub async fn abandon(&self, id: u32) {
        self.slots.lock().await.remove(&id);
    }

    /// Fails every outstanding slot; their waiters resume with
    /// [`NetError::Closed`]. Called on connection teardown.
    pub async fn fail_all(&self) {
        let mut slots = self.slots.lock().await;
        if !slots.is_empty() {
            tracing::debug!(
                pending = slots.len(),
                "failing outstanding asks, connection is closing"
            );
        }
        // Dropping the senders closes the channels and wakes the waiters.
        slots.clear();
    }

    /// Number of asks currently waiting for a reply.
    pub async fn outstanding(&self) -> usize {
        self.slots.lock().await.len()
    }
}

impl Default for PendingReplies {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
