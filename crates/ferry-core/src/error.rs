//! Error types for the transfer session protocol.
//!
//! The taxonomy separates what kills a session from what it survives:
//!
//! - **Fatal**: transport failure, signaling timeout, bad configuration.
//!   The session lands in `Failed` (or never starts) and the caller begins a
//!   fresh session if it wants to retry; nothing is retried here.
//! - **Recoverable**: malformed or out-of-sequence control frames, chunks
//!   with no open buffer, a corrupt file. Logged and surfaced as events; the
//!   session keeps serving the rest of the batch.

use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by transfer sessions
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// Configuration rejected before the session started
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(Cow<'static, str>),

    /// Malformed or out-of-sequence frame; the session continues
    #[error("protocol violation: {0}")]
    ProtocolViolation(Cow<'static, str>),

    /// Reconstructed file does not match its announced size
    #[error("corrupt transfer of file {file_index}: expected {expected} bytes, got {actual}")]
    CorruptTransfer {
        /// Index of the affected file
        file_index: u32,
        /// Announced size
        expected: u64,
        /// Bytes actually received
        actual: u64,
    },

    /// Counterpart session description never arrived
    #[error("signaling timed out after {0:?}")]
    SignalingTimeout(Duration),

    /// Signaling failed for a reason other than the wait bound
    #[error("signaling failed: {0}")]
    Signaling(String),

    /// Transport-level failure
    #[error("channel error: {0}")]
    Channel(Cow<'static, str>),

    /// Channel closed while a batch was in flight
    #[error("channel closed mid-transfer")]
    ChannelClosed,
}

impl SessionError {
    /// True when the session cannot continue and must be restarted.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidConfiguration(_)
                | SessionError::SignalingTimeout(_)
                | SessionError::Signaling(_)
                | SessionError::Channel(_)
                | SessionError::ChannelClosed
        )
    }

    /// True when the session keeps running after reporting the error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionError::ProtocolViolation(_) | SessionError::CorruptTransfer { .. }
        )
    }

    /// Create an invalid-configuration error with static context.
    #[must_use]
    pub const fn invalid_config(context: &'static str) -> Self {
        SessionError::InvalidConfiguration(Cow::Borrowed(context))
    }

    /// Create a protocol-violation error with static context.
    #[must_use]
    pub const fn protocol(context: &'static str) -> Self {
        SessionError::ProtocolViolation(Cow::Borrowed(context))
    }

    /// Create a channel error with static context.
    #[must_use]
    pub const fn channel(context: &'static str) -> Self {
        SessionError::Channel(Cow::Borrowed(context))
    }
}

impl From<ferry_transport::ChannelError> for SessionError {
    fn from(err: ferry_transport::ChannelError) -> Self {
        match err {
            ferry_transport::ChannelError::Closed => SessionError::ChannelClosed,
            other => SessionError::Channel(other.to_string().into()),
        }
    }
}

impl From<ferry_signaling::SignalingError> for SessionError {
    fn from(err: ferry_signaling::SignalingError) -> Self {
        match err {
            ferry_signaling::SignalingError::Timeout(bound) => {
                SessionError::SignalingTimeout(bound)
            }
            other => SessionError::Signaling(other.to_string()),
        }
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
