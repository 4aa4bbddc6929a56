//! Session description exchange.
//!
//! The core never looks inside a session-description blob; it publishes the
//! local one through whatever bridge the application chose and waits for the
//! counterpart, bounded by the bridge's wait limit. The returned remote blob
//! is fed into the underlying connection setup by the caller.

use crate::error::Result;
use ferry_signaling::{SignalHandle, SignalingBridge};

/// Publish the local session description and wait for the counterpart.
///
/// Returns the bridge handle (e.g. the short code to show the user) together
/// with the remote blob. Fails with
/// [`SessionError::SignalingTimeout`](crate::error::SessionError::SignalingTimeout)
/// when the counterpart never shows up.
pub async fn exchange_descriptions<B>(bridge: &B, local_blob: String) -> Result<(SignalHandle, String)>
where
    B: SignalingBridge + ?Sized,
{
    let handle = bridge.publish(local_blob).await?;
    tracing::debug!(%handle, "local description published");
    let remote = bridge.await_counterpart(&handle).await?;
    tracing::debug!(%handle, "counterpart description received");
    Ok((handle, remote))
}
