//! In-process channel pair.
//!
//! Two [`MemoryChannel`] endpoints connected by unbounded queues, preserving
//! send order and never dropping messages, so they satisfy the ordered,
//! reliable contract the session core assumes. Used by tests and loopback
//! transfers.

use crate::channel::{
    ChannelError, ChannelEvent, ChannelMessage, ChannelResult, ChannelStats, MessageChannel,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::sync::mpsc;

/// Create a connected channel pair.
///
/// Both endpoints observe [`ChannelEvent::Open`] as their first event,
/// matching the open-fires-once contract.
#[must_use]
pub fn channel_pair() -> (MemoryChannel, MemoryChannel) {
    let (a_tx, a_rx) = mpsc::unbounded_channel();
    let (b_tx, b_rx) = mpsc::unbounded_channel();
    let closed = Arc::new(AtomicBool::new(false));

    // Open is queued up-front; the first next_event() call on either side
    // observes it before any message.
    let _ = a_tx.send(ChannelEvent::Open);
    let _ = b_tx.send(ChannelEvent::Open);

    let a = MemoryChannel {
        peer_tx: b_tx.clone(),
        own_tx: a_tx.clone(),
        events: Mutex::new(a_rx),
        closed: Arc::clone(&closed),
        drained: AtomicBool::new(false),
        counters: Counters::default(),
    };
    let b = MemoryChannel {
        peer_tx: a_tx,
        own_tx: b_tx,
        events: Mutex::new(b_rx),
        closed,
        drained: AtomicBool::new(false),
        counters: Counters::default(),
    };
    (a, b)
}

#[derive(Default)]
struct Counters {
    messages_sent: AtomicU64,
    bytes_sent: AtomicU64,
    messages_received: AtomicU64,
    bytes_received: AtomicU64,
}

/// One endpoint of an in-process channel pair.
pub struct MemoryChannel {
    peer_tx: mpsc::UnboundedSender<ChannelEvent>,
    own_tx: mpsc::UnboundedSender<ChannelEvent>,
    events: Mutex<mpsc::UnboundedReceiver<ChannelEvent>>,
    closed: Arc<AtomicBool>,
    // This endpoint has already delivered Closed; next_event returns None.
    drained: AtomicBool,
    counters: Counters,
}

#[async_trait]
impl MessageChannel for MemoryChannel {
    async fn send(&self, message: ChannelMessage) -> ChannelResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ChannelError::Closed);
        }
        let len = message.len() as u64;
        self.peer_tx
            .send(ChannelEvent::Message(message))
            .map_err(|_| ChannelError::Closed)?;
        self.counters.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.counters.bytes_sent.fetch_add(len, Ordering::Relaxed);
        Ok(())
    }

    async fn next_event(&self) -> Option<ChannelEvent> {
        if self.drained.load(Ordering::Acquire) {
            return None;
        }
        let event = self.events.lock().await.recv().await?;
        match &event {
            ChannelEvent::Message(message) => {
                self.counters
                    .messages_received
                    .fetch_add(1, Ordering::Relaxed);
                self.counters
                    .bytes_received
                    .fetch_add(message.len() as u64, Ordering::Relaxed);
            }
            ChannelEvent::Closed => {
                self.drained.store(true, Ordering::Release);
            }
            _ => {}
        }
        Some(event)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!("memory channel closed");
        // Both sides observe Closed, like a torn-down data channel.
        let _ = self.peer_tx.send(ChannelEvent::Closed);
        let _ = self.own_tx.send(ChannelEvent::Closed);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn stats(&self) -> ChannelStats {
        ChannelStats {
            messages_sent: self.counters.messages_sent.load(Ordering::Relaxed),
            bytes_sent: self.counters.bytes_sent.load(Ordering::Relaxed),
            messages_received: self.counters.messages_received.load(Ordering::Relaxed),
            bytes_received: self.counters.bytes_received.load(Ordering::Relaxed),
        }
    }
}
