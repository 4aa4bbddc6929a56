//! Session configuration.

use crate::error::SessionError;
use ferry_files::{DEFAULT_CHUNK_SIZE, FileChunker};
use ferry_signaling::DEFAULT_SIGNALING_TIMEOUT;
use std::time::Duration;

/// Pacing between binary chunk sends.
///
/// Purely a fairness aid so a large transfer does not starve other tasks on
/// the same runtime; ordering and completion never depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingMode {
    /// Send chunks back to back
    None,
    /// Yield to the scheduler between chunks
    Yield,
    /// Sleep a fixed delay between chunks
    Delay(Duration),
}

/// Transfer session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Chunk size for binary frames
    pub chunk_size: usize,

    /// Bound on waiting for the counterpart session description
    pub signaling_timeout: Duration,

    /// Pacing between chunk sends
    pub pacing: PacingMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            signaling_timeout: DEFAULT_SIGNALING_TIMEOUT,
            pacing: PacingMode::Yield,
        }
    }
}

impl SessionConfig {
    /// Build the chunker, validating the configured chunk size.
    pub fn chunker(&self) -> Result<FileChunker, SessionError> {
        FileChunker::new(self.chunk_size)
            .map_err(|e| SessionError::InvalidConfiguration(e.to_string().into()))
    }
}
