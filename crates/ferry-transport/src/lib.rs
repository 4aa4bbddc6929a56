//! # ferry transport
//!
//! Channel adapter abstraction for the ferry transfer protocol.
//!
//! The transfer session state machine is transport-agnostic: it only needs an
//! ordered, reliable, message-oriented channel that distinguishes text frames
//! from binary frames. This crate defines that contract ([`MessageChannel`])
//! and ships an in-process implementation ([`memory::channel_pair`]) used by
//! tests and same-machine loopback transfers. A WebRTC data channel, a
//! WebSocket, or any equivalent transport can implement the same trait
//! without touching the session core.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod memory;

pub use channel::{
    ChannelError, ChannelEvent, ChannelMessage, ChannelResult, ChannelStats, MessageChannel,
};
pub use memory::{MemoryChannel, channel_pair};
