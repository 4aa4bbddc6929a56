//! # ferry signaling
//!
//! Out-of-band exchange of session-description blobs.
//!
//! Establishing the peer-to-peer channel requires carrying two opaque blobs
//! between the peers (initiator → responder and back) before any data flows.
//! The session core never inspects blob contents; it only needs the
//! [`SignalingBridge`] contract: `publish` a local blob, then
//! `await_counterpart` for the remote one. Any concrete mechanism satisfies
//! it:
//!
//! - [`ManualExchange`] — the application carries the blobs by hand
//!   (copy/paste between browsers, chat, email).
//! - [`fragment`] — blobs folded into a shareable URL fragment.
//! - [`CodeRendezvous`] — a short numeric code keyed into a shared
//!   key-value store, polled until the counterpart appears.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fragment;
pub mod manual;
pub mod rendezvous;

pub use error::SignalingError;
pub use manual::{ManualExchange, ManualPort};
pub use rendezvous::{CodeRendezvous, MemoryStore, RendezvousSide, RendezvousStore};

use async_trait::async_trait;
use std::time::Duration;

/// Default bound on waiting for the counterpart blob (5 minutes).
pub const DEFAULT_SIGNALING_TIMEOUT: Duration = Duration::from_secs(300);

/// Token returned by [`SignalingBridge::publish`] and redeemed by
/// [`SignalingBridge::await_counterpart`].
///
/// For code-based bridges this is the short code shown to the user; a
/// responder that received a code out of band can construct the handle
/// directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalHandle(String);

impl SignalHandle {
    /// Wrap an externally communicated token (e.g. a typed-in code).
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SignalHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Out-of-band carrier for the two session-description blobs.
///
/// `publish` makes the local blob available to the peer and returns a
/// handle; `await_counterpart` suspends until the peer's blob is available
/// or the bridge's wait bound elapses with
/// [`SignalingError::Timeout`]. Each blob is delivered exactly once, in
/// order (there is only one per direction).
#[async_trait]
pub trait SignalingBridge: Send + Sync {
    /// Make the local session-description blob available to the peer.
    async fn publish(&self, blob: String) -> Result<SignalHandle, SignalingError>;

    /// Wait for the peer's session-description blob.
    async fn await_counterpart(&self, handle: &SignalHandle) -> Result<String, SignalingError>;
}
