//! Error types for signaling bridges.

use std::time::Duration;
use thiserror::Error;

/// Signaling bridge errors
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Counterpart blob never arrived within the wait bound
    #[error("signaling timed out after {0:?}")]
    Timeout(Duration),

    /// No free rendezvous code could be claimed
    #[error("no free rendezvous code after {0} attempts")]
    CodeUnavailable(usize),

    /// The application side of a manual exchange went away
    #[error("manual exchange closed")]
    ExchangeClosed,

    /// Share fragment could not be decoded
    #[error("invalid share fragment: {0}")]
    InvalidFragment(String),
}
