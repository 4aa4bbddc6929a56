//! # ferry core
//!
//! Transfer session protocol: the state machine that turns an ordered,
//! reliable, message-oriented channel into a framed, multi-file,
//! progress-tracked file transfer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Signaling Bridge                            │
//! │  (out-of-band exchange of two opaque session descriptions)     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                     Transfer Session                            │
//! │  (manifest → announcement → chunks, per file, with progress)   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                     Message Channel                             │
//! │  (ordered reliable transport: text and binary frames)          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One batch is: a single manifest text frame, then per file an announcement
//! text frame followed by that file's raw binary chunks, boundaries inferred
//! from the announced sizes. A session may serve several batches in sequence
//! over the same channel.
//!
//! Sender and receiver are driven by [`SenderSession`] and
//! [`ReceiverSession`]; the underlying [`SenderEngine`] and
//! [`ReceiverEngine`] are plain state machines usable without a runtime.
//! Both report through [`SessionEvent`]s instead of touching shared state.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod events;
pub mod message;
pub mod negotiate;
pub mod progress;
pub mod receiver;
pub mod sender;
pub mod session;

pub use config::{PacingMode, SessionConfig};
pub use error::{Result, SessionError};
pub use events::{EventSink, SessionEvent};
pub use message::ControlMessage;
pub use negotiate::exchange_descriptions;
pub use progress::{BatchProgress, SessionReport, format_bytes};
pub use receiver::{BatchOutcome, ReceiverEngine, ReceiverSession};
pub use sender::{SenderEngine, SenderSession};
pub use session::{BatchId, Role, SessionPhase, SessionState};
