//! Sender side of the transfer session.
//!
//! The engine is a synchronous frame source: it hands out the manifest, then
//! per file an announcement followed by that file's chunks in strict order,
//! updating progress and emitting events as frames are produced. The session
//! driver pumps those frames into a channel with optional pacing.

use crate::config::{PacingMode, SessionConfig};
use crate::error::{Result, SessionError};
use crate::events::{EventSink, SessionEvent};
use crate::message::ControlMessage;
use crate::progress::{BatchProgress, SessionReport};
use crate::session::{BatchId, Role, SessionPhase, SessionState};
use ferry_files::{FileChunker, FileDescriptor, OutboundFile};
use ferry_transport::{ChannelMessage, MessageChannel};

/// Frame source for one outgoing batch.
pub struct SenderEngine {
    chunker: FileChunker,
    files: Vec<OutboundFile>,
    batch_id: BatchId,
    phase: SessionPhase,
    progress: BatchProgress,
    events: EventSink,
    manifest_sent: bool,
    file_index: usize,
    announced: bool,
    offset: u64,
    completed: Vec<FileDescriptor>,
}

impl SenderEngine {
    /// Queue a batch of files for sending.
    ///
    /// Rejects an empty batch and an invalid chunk size before any frame is
    /// produced.
    pub fn new(
        config: &SessionConfig,
        files: Vec<OutboundFile>,
        events: EventSink,
    ) -> Result<Self> {
        if files.is_empty() {
            return Err(SessionError::invalid_config("batch has no files"));
        }
        let chunker = config.chunker()?;
        let total_bytes = files.iter().map(|f| f.descriptor.size).sum();
        let batch_id = BatchId::generate();
        tracing::info!(%batch_id, files = files.len(), total_bytes, "queued batch");
        Ok(Self {
            chunker,
            progress: BatchProgress::new(files.len() as u32, total_bytes),
            files,
            batch_id,
            phase: SessionPhase::Idle,
            events,
            manifest_sent: false,
            file_index: 0,
            announced: false,
            offset: 0,
            completed: Vec::new(),
        })
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
            role: Role::Sender,
            phase: self.phase,
            current_file_index: match self.phase {
                SessionPhase::Transferring { file_index } => Some(file_index),
                _ => None,
            },
            files_completed: self.completed.clone(),
            total_bytes_planned: self.progress.total_bytes(),
            total_bytes_transferred: self.progress.bytes_transferred(),
        }
    }

    /// The channel is being negotiated.
    pub fn mark_negotiating(&mut self) {
        self.transition(SessionPhase::Negotiating);
    }

    /// The channel reported open.
    pub fn mark_connected(&mut self) {
        self.transition(SessionPhase::Connected);
    }

    /// The channel failed; terminal.
    pub fn mark_failed(&mut self, detail: &str) {
        tracing::warn!(batch_id = %self.batch_id, detail, "sender failed");
        self.transition(SessionPhase::Failed);
        self.events.emit(SessionEvent::Failed {
            detail: detail.to_string(),
        });
    }

    /// Produce the next frame to send, or `None` once the batch is done.
    pub fn next_frame(&mut self) -> Result<Option<ChannelMessage>> {
        if matches!(self.phase, SessionPhase::AllComplete | SessionPhase::Failed) {
            return Ok(None);
        }

        if !self.manifest_sent {
            self.manifest_sent = true;
            let manifest = ControlMessage::Manifest {
                count: self.files.len() as u32,
                total_size: self.progress.total_bytes(),
            };
            return Ok(Some(ChannelMessage::Text(manifest.encode()?)));
        }

        if !self.announced {
            return Ok(Some(self.announce_current()?));
        }

        self.chunk_current()
    }

    /// Emit the announcement for the current file; zero-byte files complete
    /// on the spot since no chunks will follow.
    fn announce_current(&mut self) -> Result<ChannelMessage> {
        let index = self.file_index as u32;
        let descriptor = self.files[self.file_index].descriptor.clone();
        self.announced = true;
        self.offset = 0;
        self.transition(SessionPhase::Transferring { file_index: index });
        self.progress.begin_file(descriptor.size);
        tracing::debug!(
            batch_id = %self.batch_id,
            file_index = index,
            name = %descriptor.name,
            size = descriptor.size,
            "announcing file"
        );

        let frame = ControlMessage::announcement(index, &descriptor).encode()?;
        if descriptor.size == 0 {
            self.complete_current_file();
        }
        Ok(ChannelMessage::Text(frame))
    }

    /// Produce the next chunk of the current file.
    fn chunk_current(&mut self) -> Result<Option<ChannelMessage>> {
        let file = &self.files[self.file_index];
        let size = file.descriptor.size;
        debug_assert!(self.offset < size);

        let chunk_index = (self.offset / self.chunker.chunk_size() as u64) as usize;
        let chunk = self
            .chunker
            .split(&file.bytes)
            .nth(chunk_index)
            .ok_or_else(|| SessionError::invalid_config("source bytes shorter than descriptor"))?
            .to_vec();

        self.offset += chunk.len() as u64;
        self.progress.record_chunk(chunk.len() as u64);
        self.events.emit(SessionEvent::FileProgress {
            file_index: self.file_index as u32,
            bytes: self.offset,
            size,
            file_percent: self.progress.file_percent(),
            overall_percent: self.progress.overall_percent(),
        });

        if self.offset == size {
            self.complete_current_file();
        }
        Ok(Some(ChannelMessage::Binary(chunk)))
    }

    fn complete_current_file(&mut self) {
        let descriptor = self.files[self.file_index].descriptor.clone();
        self.events.emit(SessionEvent::FileCompleted {
            file_index: self.file_index as u32,
            descriptor: descriptor.clone(),
        });
        self.completed.push(descriptor);
        self.progress.finish_file();

        self.file_index += 1;
        self.announced = false;
        self.offset = 0;
        if self.file_index == self.files.len() {
            self.transition(SessionPhase::AllComplete);
            self.events
                .emit(SessionEvent::AllComplete(self.report()));
        }
    }

    /// Summary of the batch so far.
    #[must_use]
    pub fn report(&self) -> SessionReport {
        self.progress
            .report(self.batch_id, self.completed.len() as u32)
    }

    fn transition(&mut self, next: SessionPhase) {
        if self.phase != next {
            tracing::debug!(batch_id = %self.batch_id, from = %self.phase, to = %next, "sender phase");
            self.phase = next;
            self.events.emit(SessionEvent::PhaseChanged(next));
        }
    }
}

/// Async sender driver: pumps engine frames into a channel.
pub struct SenderSession<C> {
    channel: C,
    config: SessionConfig,
    events: EventSink,
    opened: bool,
}

impl<C: MessageChannel> SenderSession<C> {
    /// Wrap a channel for sending.
    pub fn new(channel: C, config: SessionConfig, events: EventSink) -> Self {
        Self {
            channel,
            config,
            events,
            opened: false,
        }
    }

    /// Send one batch of files over the channel.
    ///
    /// Waits for the channel to open on first use; later batches reuse the
    /// open channel without renegotiating. Any channel failure mid-batch is
    /// terminal for the session.
    pub async fn send_batch(&mut self, files: Vec<OutboundFile>) -> Result<SessionReport> {
        let mut engine = SenderEngine::new(&self.config, files, self.events.clone())?;
        self.wait_for_open(&mut engine).await?;

        while let Some(frame) = engine.next_frame()? {
            let is_chunk = matches!(frame, ChannelMessage::Binary(_));
            if let Err(err) = self.channel.send(frame).await {
                engine.mark_failed("channel send failed");
                return Err(err.into());
            }
            if is_chunk {
                self.pace().await;
            }
        }
        Ok(engine.report())
    }

    /// Close the underlying channel.
    pub async fn close(&self) {
        self.channel.close().await;
    }

    /// Access the underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    async fn wait_for_open(&mut self, engine: &mut SenderEngine) -> Result<()> {
        if self.opened {
            engine.mark_connected();
            return Ok(());
        }
        engine.mark_negotiating();
        loop {
            match self.channel.next_event().await {
                Some(ferry_transport::ChannelEvent::Open) => {
                    self.opened = true;
                    engine.mark_connected();
                    return Ok(());
                }
                Some(ferry_transport::ChannelEvent::Message(_)) => {
                    // The protocol is one-directional; inbound frames on the
                    // sender are noise, not a reason to abort.
                    tracing::warn!("unexpected inbound message before open");
                    self.events.emit(SessionEvent::ProtocolError {
                        detail: "unexpected inbound message before open".into(),
                    });
                }
                Some(ferry_transport::ChannelEvent::Error(detail)) => {
                    engine.mark_failed(&detail);
                    return Err(SessionError::Channel(detail.into()));
                }
                Some(ferry_transport::ChannelEvent::Closed) | None => {
                    engine.mark_failed("channel closed before open");
                    return Err(SessionError::ChannelClosed);
                }
            }
        }
    }

    async fn pace(&self) {
        match self.config.pacing {
            PacingMode::None => {}
            PacingMode::Yield => tokio::task::yield_now().await,
            PacingMode::Delay(delay) => tokio::time::sleep(delay).await,
        }
    }
}
