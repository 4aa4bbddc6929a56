//! Session phases and state snapshots.

use ferry_files::FileDescriptor;

/// Identifier of one transfer batch, for logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchId([u8; 8]);

impl BatchId {
    /// Generate a random batch ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(rand::random())
    }

    /// Raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Which end of the transfer this session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Emits the manifest, announcements and chunks
    Sender,
    /// Consumes them and reconstructs files
    Receiver,
}

/// Lifecycle phase of a transfer session.
///
/// Both roles move through the same shape; they differ only in which
/// transitions are locally triggered and which are observed from the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No active channel
    Idle,
    /// Waiting for the counterpart session description / channel open
    Negotiating,
    /// Channel open, no file in flight
    Connected,
    /// File at this index is being transferred
    Transferring {
        /// 0-based index of the file in flight
        file_index: u32,
    },
    /// Batch finished; the channel may stay open for another manifest
    AllComplete,
    /// Channel failed or closed mid-batch; terminal
    Failed,
}

impl SessionPhase {
    /// Phases in which a channel close is not a failure.
    #[must_use]
    pub fn close_is_benign(&self) -> bool {
        matches!(self, SessionPhase::Idle | SessionPhase::AllComplete)
    }

    /// Terminal phases.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Failed)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Negotiating => write!(f, "negotiating"),
            Self::Connected => write!(f, "connected"),
            Self::Transferring { file_index } => write!(f, "transferring file {file_index}"),
            Self::AllComplete => write!(f, "all complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Point-in-time view of a session, for consumers that poll instead of
/// subscribing to events.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Session role
    pub role: Role,
    /// Current phase
    pub phase: SessionPhase,
    /// Index of the file in flight, if any
    pub current_file_index: Option<u32>,
    /// Descriptors of files completed so far, across batches
    pub files_completed: Vec<FileDescriptor>,
    /// Bytes planned for the current batch
    pub total_bytes_planned: u64,
    /// Bytes moved so far in the current batch
    pub total_bytes_transferred: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_id_displays_as_hex() {
        let id = BatchId([0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0]);
        assert_eq!(id.to_string(), "123456789abcdef0");
    }

    #[test]
    fn test_close_classification() {
        assert!(SessionPhase::Idle.close_is_benign());
        assert!(SessionPhase::AllComplete.close_is_benign());
        assert!(!SessionPhase::Connected.close_is_benign());
        assert!(!SessionPhase::Transferring { file_index: 0 }.close_is_benign());
    }
}
