//! Session observer events.
//!
//! The state machine never writes into shared application state from channel
//! callbacks; it emits explicit events through a registered sink and the
//! consumer renders them however it likes. A sink backed by an unbounded
//! channel never blocks the transfer, and a dropped receiver simply mutes
//! the events.

use crate::progress::SessionReport;
use crate::session::SessionPhase;
use ferry_files::FileDescriptor;
use tokio::sync::mpsc;

/// Events emitted by sender and receiver sessions.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Session phase changed
    PhaseChanged(SessionPhase),
    /// Receiver learned the batch shape (receiver only)
    ManifestReceived {
        /// Files the batch will carry
        file_count: u32,
        /// Sum of announced sizes
        total_bytes: u64,
    },
    /// One chunk moved for the file in flight
    FileProgress {
        /// Index of the file in flight
        file_index: u32,
        /// Bytes moved for this file
        bytes: u64,
        /// Announced size of this file
        size: u64,
        /// This file's progress percentage
        file_percent: f64,
        /// Whole-batch progress percentage
        overall_percent: f64,
    },
    /// A file finished and verified
    FileCompleted {
        /// Index of the finished file
        file_index: u32,
        /// Its descriptor
        descriptor: FileDescriptor,
    },
    /// A file finished with the wrong byte count
    FileFailed {
        /// Index of the corrupt file
        file_index: u32,
        /// Announced size
        expected: u64,
        /// Bytes actually accumulated
        actual: u64,
    },
    /// Every file of the batch has been processed
    AllComplete(SessionReport),
    /// Recoverable protocol violation; the session continues
    ProtocolError {
        /// What was observed
        detail: String,
    },
    /// The session failed and will not continue
    Failed {
        /// What went wrong
        detail: String,
    },
}

/// Destination for session events.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl EventSink {
    /// Create a sink and the receiver that observes it.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink that drops every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Emit one event. A gone receiver mutes the sink rather than failing
    /// the transfer.
    pub fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
