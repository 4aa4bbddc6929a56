//! Control message codec.
//!
//! Control messages ride in text frames as JSON, distinguished from binary
//! chunk frames by the transport's own type tagging. Among text frames the
//! `type` field discriminates. Wire format:
//!
//! ```text
//! {"type":"manifest","count":2,"totalSize":1048576}
//! {"type":"file_metadata","fileIndex":0,"name":"a.png","size":524288,"fileType":"image/png"}
//! ```

use crate::error::SessionError;
use ferry_files::FileDescriptor;
use serde::{Deserialize, Serialize};

/// Out-of-band control frames of the transfer protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Batch declaration; sent once, before any file data.
    Manifest {
        /// Number of files that will follow
        count: u32,
        /// Sum of all announced file sizes
        #[serde(rename = "totalSize")]
        total_size: u64,
    },
    /// Per-file metadata; sent immediately before that file's chunks.
    FileMetadata {
        /// 0-based position in the batch, strictly increasing
        #[serde(rename = "fileIndex")]
        file_index: u32,
        /// File name
        name: String,
        /// File size in bytes
        size: u64,
        /// Mime type, empty when unknown
        #[serde(rename = "fileType")]
        file_type: String,
    },
}

impl ControlMessage {
    /// Build an announcement frame from a descriptor.
    #[must_use]
    pub fn announcement(file_index: u32, descriptor: &FileDescriptor) -> Self {
        Self::FileMetadata {
            file_index,
            name: descriptor.name.clone(),
            size: descriptor.size,
            file_type: descriptor.mime_type.clone(),
        }
    }

    /// Serialize to the JSON text frame.
    pub fn encode(&self) -> Result<String, SessionError> {
        serde_json::to_string(self)
            .map_err(|e| SessionError::ProtocolViolation(format!("encode failed: {e}").into()))
    }

    /// Parse a text frame.
    ///
    /// Unknown `type` values and malformed JSON yield a recoverable
    /// [`SessionError::ProtocolViolation`]; they must never take the session
    /// down.
    pub fn decode(raw: &str) -> Result<Self, SessionError> {
        serde_json::from_str(raw).map_err(|e| {
            SessionError::ProtocolViolation(format!("malformed control frame: {e}").into())
        })
    }
}
