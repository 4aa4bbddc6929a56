//! Channel trait abstraction over ordered, reliable, message transports.
//!
//! The contract mirrors a browser data channel: one `Open` notification,
//! then a stream of messages in exactly the order the peer sent them, then
//! `Closed` (or `Error`). Ordering and reliability are whatever the
//! underlying transport guarantees; the session core assumes both and an
//! unordered or lossy transport is out of scope.

use async_trait::async_trait;

/// Channel adapter errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChannelError {
    /// Channel is closed
    #[error("channel is closed")]
    Closed,

    /// Send failed
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Transport-reported failure
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// One transport message.
///
/// The two variants map onto the transport's own type tagging (string vs.
/// binary payload); the session core uses text for control frames and binary
/// for file chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelMessage {
    /// Text frame (JSON control message)
    Text(String),
    /// Binary frame (raw file chunk)
    Binary(Vec<u8>),
}

impl ChannelMessage {
    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(s) => s.len(),
            Self::Binary(b) => b.len(),
        }
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lifecycle and data events observed on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Channel became usable; fires once
    Open,
    /// A message arrived, in send order
    Message(ChannelMessage),
    /// Channel closed (locally or by the peer)
    Closed,
    /// Transport-level failure
    Error(String),
}

/// Async channel adapter for ordered, reliable, message-based transports.
///
/// Implementations deliver events in order through [`next_event`] and accept
/// outbound messages through [`send`]. After `Closed` or a terminal `Error`,
/// `next_event` returns `None` and `send` fails with
/// [`ChannelError::Closed`].
///
/// [`next_event`]: MessageChannel::next_event
/// [`send`]: MessageChannel::send
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Send one message to the peer.
    ///
    /// # Errors
    /// Returns [`ChannelError::Closed`] once the channel is closed, or a
    /// transport-specific error.
    async fn send(&self, message: ChannelMessage) -> ChannelResult<()>;

    /// Wait for the next channel event.
    ///
    /// Returns `None` once the channel is closed and all queued events have
    /// been drained.
    async fn next_event(&self) -> Option<ChannelEvent>;

    /// Close the channel; the peer observes `Closed`.
    async fn close(&self);

    /// Whether the channel has been closed.
    fn is_closed(&self) -> bool;

    /// Channel statistics (optional).
    fn stats(&self) -> ChannelStats {
        ChannelStats::default()
    }
}

/// Channel statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelStats {
    /// Messages sent
    pub messages_sent: u64,
    /// Payload bytes sent
    pub bytes_sent: u64,
    /// Messages received
    pub messages_received: u64,
    /// Payload bytes received
    pub bytes_received: u64,
}
