//! Hand-carried blob exchange.
//!
//! The application shows the published blob to the user (to copy, mail, or
//! read aloud) and pastes the peer's blob back in. The bridge itself is just
//! a pair of queues with a wait bound.

use crate::error::SignalingError;
use crate::{DEFAULT_SIGNALING_TIMEOUT, SignalHandle, SignalingBridge};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

/// Application side of a [`ManualExchange`].
pub struct ManualPort {
    /// Blobs published by the session, to be shown to the user.
    pub outgoing: mpsc::UnboundedReceiver<String>,
    incoming: mpsc::UnboundedSender<String>,
}

impl ManualPort {
    /// Hand a pasted counterpart blob to the waiting session.
    pub fn deliver(&self, blob: impl Into<String>) -> Result<(), SignalingError> {
        self.incoming
            .send(blob.into())
            .map_err(|_| SignalingError::ExchangeClosed)
    }
}

/// Copy/paste signaling bridge.
pub struct ManualExchange {
    outbox: mpsc::UnboundedSender<String>,
    inbox: Mutex<mpsc::UnboundedReceiver<String>>,
    wait_bound: Duration,
}

impl ManualExchange {
    /// Create a bridge and its application port with the default wait bound.
    #[must_use]
    pub fn new() -> (Self, ManualPort) {
        Self::with_wait_bound(DEFAULT_SIGNALING_TIMEOUT)
    }

    /// Create a bridge with a custom wait bound.
    #[must_use]
    pub fn with_wait_bound(wait_bound: Duration) -> (Self, ManualPort) {
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        (
            Self {
                outbox: outbox_tx,
                inbox: Mutex::new(inbox_rx),
                wait_bound,
            },
            ManualPort {
                outgoing: outbox_rx,
                incoming: inbox_tx,
            },
        )
    }
}

#[async_trait]
impl SignalingBridge for ManualExchange {
    async fn publish(&self, blob: String) -> Result<SignalHandle, SignalingError> {
        self.outbox
            .send(blob)
            .map_err(|_| SignalingError::ExchangeClosed)?;
        Ok(SignalHandle::new("manual"))
    }

    async fn await_counterpart(&self, _handle: &SignalHandle) -> Result<String, SignalingError> {
        let mut inbox = self.inbox.lock().await;
        match tokio::time::timeout(self.wait_bound, inbox.recv()).await {
            Ok(Some(blob)) => Ok(blob),
            Ok(None) => Err(SignalingError::ExchangeClosed),
            Err(_) => Err(SignalingError::Timeout(self.wait_bound)),
        }
    }
}
