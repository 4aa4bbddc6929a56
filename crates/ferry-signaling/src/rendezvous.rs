//! Numeric-code rendezvous over a shared key-value store.
//!
//! The initiator claims a fresh 6-digit code and parks its blob under the
//! code's offer slot; the responder, given the code out of band, reads the
//! offer and parks its answer, which the initiator polls for. Any shared
//! store (in-process map, browser local storage, a tiny HTTP key-value
//! service) works as long as both peers see the same keys.

use crate::error::SignalingError;
use crate::{DEFAULT_SIGNALING_TIMEOUT, SignalHandle, SignalingBridge};
use async_trait::async_trait;
use dashmap::DashMap;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Default interval between store polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Attempts at claiming a fresh code before giving up.
const CODE_CLAIM_ATTEMPTS: usize = 16;

/// Shared key-value space both peers can reach.
pub trait RendezvousStore: Send + Sync {
    /// Store `value` under `key` if the key is free; returns false when taken.
    fn put_if_absent(&self, key: &str, value: String) -> bool;

    /// Read the value under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Remove `key` once consumed.
    fn remove(&self, key: &str);
}

/// In-process store for same-machine rendezvous and tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RendezvousStore for MemoryStore {
    fn put_if_absent(&self, key: &str, value: String) -> bool {
        use dashmap::mapref::entry::Entry;
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.clone())
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Which end of the exchange this bridge instance serves.
#[derive(Debug, Clone)]
pub enum RendezvousSide {
    /// Claims a fresh code and waits for the answer slot.
    Initiator,
    /// Joins an existing code carried out of band (typed in by the user)
    /// and fills the answer slot.
    Responder {
        /// The 6-digit code the initiator displayed.
        code: String,
    },
}

/// Short-code signaling bridge over a [`RendezvousStore`].
///
/// Both sides use the same [`SignalingBridge`] calls; only the slot layout
/// differs. A responder may call `await_counterpart` before `publish` (the
/// answer usually depends on the offer) by constructing the handle from the
/// known code.
pub struct CodeRendezvous<S> {
    store: Arc<S>,
    side: RendezvousSide,
    poll_interval: Duration,
    wait_bound: Duration,
}

impl<S: RendezvousStore> CodeRendezvous<S> {
    /// Create a bridge with default polling and wait bounds.
    #[must_use]
    pub fn new(store: Arc<S>, side: RendezvousSide) -> Self {
        Self {
            store,
            side,
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_bound: DEFAULT_SIGNALING_TIMEOUT,
        }
    }

    /// Override the polling interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Override the wait bound.
    #[must_use]
    pub fn with_wait_bound(mut self, wait_bound: Duration) -> Self {
        self.wait_bound = wait_bound;
        self
    }

    fn counterpart_slot(&self, code: &str) -> String {
        match self.side {
            RendezvousSide::Initiator => format!("{code}/answer"),
            RendezvousSide::Responder { .. } => format!("{code}/offer"),
        }
    }

    async fn poll_slot(&self, slot: String) -> Result<String, SignalingError> {
        let poll = async {
            loop {
                if let Some(blob) = self.store.get(&slot) {
                    self.store.remove(&slot);
                    return blob;
                }
                sleep(self.poll_interval).await;
            }
        };
        timeout(self.wait_bound, poll)
            .await
            .map_err(|_| SignalingError::Timeout(self.wait_bound))
    }
}

#[async_trait]
impl<S: RendezvousStore> SignalingBridge for CodeRendezvous<S> {
    async fn publish(&self, blob: String) -> Result<SignalHandle, SignalingError> {
        match &self.side {
            RendezvousSide::Initiator => {
                let mut attempts = 0;
                while attempts < CODE_CLAIM_ATTEMPTS {
                    let code = {
                        let mut rng = rand::thread_rng();
                        format!("{:06}", rng.gen_range(0..1_000_000u32))
                    };
                    if self
                        .store
                        .put_if_absent(&format!("{code}/offer"), blob.clone())
                    {
                        tracing::debug!(%code, "claimed rendezvous code");
                        return Ok(SignalHandle::new(code));
                    }
                    attempts += 1;
                }
                Err(SignalingError::CodeUnavailable(CODE_CLAIM_ATTEMPTS))
            }
            RendezvousSide::Responder { code } => {
                let slot = format!("{code}/answer");
                if self.store.put_if_absent(&slot, blob) {
                    Ok(SignalHandle::new(code.clone()))
                } else {
                    Err(SignalingError::CodeUnavailable(1))
                }
            }
        }
    }

    async fn await_counterpart(&self, handle: &SignalHandle) -> Result<String, SignalingError> {
        self.poll_slot(self.counterpart_slot(handle.as_str())).await
    }
}
