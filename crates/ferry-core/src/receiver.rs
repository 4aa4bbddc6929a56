//! Receiver side of the transfer session.
//!
//! The engine consumes channel events: a manifest fixes the batch shape, each
//! announcement opens a reception buffer, each binary chunk feeds it, and a
//! file completes once its announced byte count is reached. Protocol
//! violations are logged and reported but never take the session down; only
//! channel failure does.

use crate::error::{Result, SessionError};
use crate::events::{EventSink, SessionEvent};
use crate::message::ControlMessage;
use crate::progress::{BatchProgress, SessionReport};
use crate::session::{BatchId, Role, SessionPhase, SessionState};
use ferry_files::{FileDescriptor, FileError, ReceivedFile, ReceptionBuffer};
use ferry_transport::{ChannelEvent, ChannelMessage, MessageChannel};

struct InFlightFile {
    descriptor: FileDescriptor,
    buffer: ReceptionBuffer,
}

/// Files and summary of one finished batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Completed, size-verified files
    pub files: Vec<ReceivedFile>,
    /// Batch summary
    pub report: SessionReport,
}

/// Event consumer for one receiving peer.
pub struct ReceiverEngine {
    phase: SessionPhase,
    events: EventSink,
    batch_id: BatchId,
    file_count: u32,
    next_index: u32,
    current: Option<InFlightFile>,
    batch_files: Vec<ReceivedFile>,
    completed_descriptors: Vec<FileDescriptor>,
    progress: Option<BatchProgress>,
    pending_report: Option<SessionReport>,
}

impl ReceiverEngine {
    /// Create an engine in the idle phase.
    #[must_use]
    pub fn new(events: EventSink) -> Self {
        Self {
            phase: SessionPhase::Idle,
            events,
            batch_id: BatchId::generate(),
            file_count: 0,
            next_index: 0,
            current: None,
            batch_files: Vec::new(),
            completed_descriptors: Vec::new(),
            progress: None,
            pending_report: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Point-in-time state snapshot.
    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState {
            role: Role::Receiver,
            phase: self.phase,
            current_file_index: match self.phase {
                SessionPhase::Transferring { file_index } => Some(file_index),
                _ => None,
            },
            files_completed: self.completed_descriptors.clone(),
            total_bytes_planned: self.progress.as_ref().map_or(0, BatchProgress::total_bytes),
            total_bytes_transferred: self
                .progress
                .as_ref()
                .map_or(0, BatchProgress::bytes_transferred),
        }
    }

    /// Files completed for the batch in flight (or just finished).
    #[must_use]
    pub fn files_completed(&self) -> &[ReceivedFile] {
        &self.batch_files
    }

    /// The channel reported open.
    pub fn on_open(&mut self) {
        if self.phase == SessionPhase::Idle || self.phase == SessionPhase::Negotiating {
            self.transition(SessionPhase::Connected);
        } else {
            tracing::debug!(phase = %self.phase, "duplicate open ignored");
        }
    }

    /// One inbound channel message.
    pub fn on_message(&mut self, message: ChannelMessage) {
        match message {
            ChannelMessage::Text(raw) => self.on_control(&raw),
            ChannelMessage::Binary(bytes) => self.on_chunk(bytes),
        }
    }

    /// The channel closed or errored; returns the failure when it was fatal.
    pub fn on_channel_down(&mut self, detail: &str) -> Option<SessionError> {
        if self.phase.close_is_benign() {
            tracing::debug!(phase = %self.phase, "channel closed between batches");
            return None;
        }
        tracing::warn!(batch_id = %self.batch_id, phase = %self.phase, detail, "receiver failed");
        self.current = None;
        self.transition(SessionPhase::Failed);
        self.events.emit(SessionEvent::Failed {
            detail: detail.to_string(),
        });
        Some(SessionError::ChannelClosed)
    }

    /// Whether a finished batch is waiting to be taken.
    #[must_use]
    pub fn batch_ready(&self) -> bool {
        self.pending_report.is_some()
    }

    /// Take the finished batch. Call only after [`ReceiverEngine::batch_ready`].
    pub fn take_batch(&mut self) -> Option<BatchOutcome> {
        let report = self.pending_report.take()?;
        Some(BatchOutcome {
            files: std::mem::take(&mut self.batch_files),
            report,
        })
    }

    fn on_control(&mut self, raw: &str) {
        match ControlMessage::decode(raw) {
            Ok(ControlMessage::Manifest { count, total_size }) => {
                self.on_manifest(count, total_size);
            }
            Ok(ControlMessage::FileMetadata {
                file_index,
                name,
                size,
                file_type,
            }) => self.on_announcement(file_index, name, size, file_type),
            Err(err) => self.violation(&err.to_string()),
        }
    }

    fn on_manifest(&mut self, count: u32, total_size: u64) {
        match self.phase {
            SessionPhase::Connected if self.progress.is_none() => {}
            // A finished batch may be followed by another manifest on the
            // same channel without renegotiating.
            SessionPhase::AllComplete => {
                self.batch_files.clear();
                self.pending_report = None;
                self.transition(SessionPhase::Connected);
            }
            _ => {
                self.violation("manifest out of sequence");
                return;
            }
        }

        self.batch_id = BatchId::generate();
        self.file_count = count;
        self.next_index = 0;
        self.current = None;
        self.progress = Some(BatchProgress::new(count, total_size));
        tracing::info!(batch_id = %self.batch_id, count, total_size, "manifest received");
        self.events.emit(SessionEvent::ManifestReceived {
            file_count: count,
            total_bytes: total_size,
        });

        if count == 0 {
            self.complete_batch();
        }
    }

    fn on_announcement(&mut self, file_index: u32, name: String, size: u64, file_type: String) {
        if self.progress.is_none() {
            self.violation("announcement before manifest");
            return;
        }
        if file_index != self.next_index || file_index >= self.file_count {
            self.violation("announcement index out of sequence");
            return;
        }
        let descriptor = match FileDescriptor::new(name, size, file_type) {
            Ok(d) => d,
            Err(err) => {
                self.violation(&format!("bad announcement: {err}"));
                return;
            }
        };

        // No resume semantics: a new announcement abandons whatever was
        // accumulating, data loss included.
        if let Some(abandoned) = self.current.take() {
            tracing::warn!(
                batch_id = %self.batch_id,
                name = %abandoned.descriptor.name,
                received = abandoned.buffer.received(),
                expected = abandoned.buffer.expected_size(),
                "abandoning incomplete file"
            );
            self.events.emit(SessionEvent::FileFailed {
                file_index: self.next_index.saturating_sub(1),
                expected: abandoned.buffer.expected_size(),
                actual: abandoned.buffer.received(),
            });
            if let Some(progress) = &mut self.progress {
                progress.finish_file();
            }
        }

        tracing::debug!(
            batch_id = %self.batch_id,
            file_index,
            name = %descriptor.name,
            size,
            "announcement received"
        );
        self.transition(SessionPhase::Transferring { file_index });
        if let Some(progress) = &mut self.progress {
            progress.begin_file(size);
        }
        self.current = Some(InFlightFile {
            descriptor,
            buffer: ReceptionBuffer::new(size),
        });
        self.next_index += 1;

        // Nothing follows a zero-byte announcement.
        if size == 0 {
            self.finish_current_file();
        }
    }

    fn on_chunk(&mut self, bytes: Vec<u8>) {
        let Some(current) = &mut self.current else {
            self.violation("chunk with no announced file");
            return;
        };
        let len = bytes.len() as u64;
        current.buffer.push(bytes);

        let file_index = self.next_index - 1;
        let size = current.buffer.expected_size();
        let received = current.buffer.received();
        let complete = current.buffer.is_complete();

        if let Some(progress) = &mut self.progress {
            progress.record_chunk(len);
        }
        if let Some(progress) = &self.progress {
            self.events.emit(SessionEvent::FileProgress {
                file_index,
                bytes: received,
                size,
                file_percent: progress.file_percent(),
                overall_percent: progress.overall_percent(),
            });
        }

        if complete {
            self.finish_current_file();
        }
    }

    fn finish_current_file(&mut self) {
        let Some(InFlightFile { descriptor, buffer }) = self.current.take() else {
            return;
        };
        let file_index = self.next_index - 1;

        match buffer.finalize() {
            Ok(bytes) => {
                tracing::info!(
                    batch_id = %self.batch_id,
                    file_index,
                    name = %descriptor.name,
                    size = bytes.len(),
                    "file completed"
                );
                self.completed_descriptors.push(descriptor.clone());
                self.events.emit(SessionEvent::FileCompleted {
                    file_index,
                    descriptor: descriptor.clone(),
                });
                self.batch_files.push(ReceivedFile { descriptor, bytes });
            }
            Err(FileError::SizeMismatch { expected, actual }) => {
                let err = SessionError::CorruptTransfer {
                    file_index,
                    expected,
                    actual,
                };
                tracing::warn!(batch_id = %self.batch_id, %err, "file failed verification");
                self.events.emit(SessionEvent::FileFailed {
                    file_index,
                    expected,
                    actual,
                });
            }
            Err(other) => {
                self.violation(&format!("finalize failed: {other}"));
            }
        }

        if let Some(progress) = &mut self.progress {
            progress.finish_file();
        }
        if self.next_index == self.file_count {
            self.complete_batch();
        }
    }

    fn complete_batch(&mut self) {
        self.transition(SessionPhase::AllComplete);
        let report = self.progress.as_ref().map(|p| {
            p.report(self.batch_id, self.batch_files.len() as u32)
        });
        if let Some(report) = report {
            tracing::info!(batch_id = %self.batch_id, %report, "batch complete");
            self.events.emit(SessionEvent::AllComplete(report.clone()));
            self.pending_report = Some(report);
        }
    }

    fn violation(&mut self, detail: &str) {
        tracing::warn!(batch_id = %self.batch_id, phase = %self.phase, detail, "protocol violation");
        self.events.emit(SessionEvent::ProtocolError {
            detail: detail.to_string(),
        });
    }

    fn transition(&mut self, next: SessionPhase) {
        if self.phase != next {
            tracing::debug!(batch_id = %self.batch_id, from = %self.phase, to = %next, "receiver phase");
            self.phase = next;
            self.events.emit(SessionEvent::PhaseChanged(next));
        }
    }
}

/// Async receiver driver: pumps channel events into the engine.
pub struct ReceiverSession<C> {
    channel: C,
    engine: ReceiverEngine,
}

impl<C: MessageChannel> ReceiverSession<C> {
    /// Wrap a channel for receiving.
    pub fn new(channel: C, events: EventSink) -> Self {
        Self {
            channel,
            engine: ReceiverEngine::new(events),
        }
    }

    /// Receive one full batch.
    ///
    /// Returns `Ok(Some(outcome))` when a batch finishes, `Ok(None)` when the
    /// channel closes with no batch in flight (a clean end of session), and
    /// an error when the channel goes down mid-batch. Call again after a
    /// finished batch to serve the next manifest on the same channel.
    pub async fn next_batch(&mut self) -> Result<Option<BatchOutcome>> {
        loop {
            match self.channel.next_event().await {
                Some(ChannelEvent::Open) => self.engine.on_open(),
                Some(ChannelEvent::Message(message)) => {
                    self.engine.on_message(message);
                    if self.engine.batch_ready() {
                        if let Some(outcome) = self.engine.take_batch() {
                            return Ok(Some(outcome));
                        }
                    }
                }
                Some(ChannelEvent::Error(detail)) => {
                    if self.engine.on_channel_down(&detail).is_some() {
                        return Err(SessionError::Channel(detail.into()));
                    }
                    return Ok(None);
                }
                Some(ChannelEvent::Closed) | None => {
                    if let Some(err) = self.engine.on_channel_down("channel closed") {
                        return Err(err);
                    }
                    return Ok(None);
                }
            }
        }
    }

    /// Point-in-time state snapshot.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.engine.state()
    }

    /// Files completed in the batch in flight; survives a failed batch for
    /// inspection.
    #[must_use]
    pub fn files_completed(&self) -> &[ReceivedFile] {
        self.engine.files_completed()
    }

    /// Access the underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }
}
