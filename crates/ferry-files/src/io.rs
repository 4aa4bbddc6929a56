//! Async file loading and persistence.
//!
//! The sender loads source bytes once and owns them for the duration of the
//! transfer; the receiver turns a finalized reception buffer into a
//! [`ReceivedFile`] and may persist it under its announced name.

use crate::FileDescriptor;
use crate::error::FileError;
use std::path::{Path, PathBuf};

/// A file queued for sending: descriptor plus source bytes.
#[derive(Debug, Clone)]
pub struct OutboundFile {
    /// Descriptor announced to the receiver
    pub descriptor: FileDescriptor,
    /// Source bytes, read once at queue time
    pub bytes: Vec<u8>,
}

impl OutboundFile {
    /// Queue in-memory bytes under an explicit name and mime type.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, FileError> {
        let descriptor = FileDescriptor::new(name, bytes.len() as u64, mime_type)?;
        Ok(Self { descriptor, bytes })
    }

    /// Load a file from disk, deriving the descriptor from the path.
    ///
    /// The mime type is guessed from the extension, falling back to empty
    /// (unknown) the way a browser file input reports it.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FileError::InvalidPath(path.display().to_string()))?
            .to_string();
        let mime_type = mime_from_extension(path);
        let bytes = tokio::fs::read(path).await?;
        let descriptor = FileDescriptor::new(name, bytes.len() as u64, mime_type)?;
        Ok(Self { descriptor, bytes })
    }
}

/// A fully received and verified file.
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    /// Descriptor from the announcement frame
    pub descriptor: FileDescriptor,
    /// Reconstructed contents
    pub bytes: Vec<u8>,
}

impl ReceivedFile {
    /// Persist under the announced file name inside `dir`.
    ///
    /// Returns the written path. The announced name is reduced to its final
    /// path component so a peer cannot steer the write outside `dir`.
    pub async fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, FileError> {
        let file_name = Path::new(&self.descriptor.name)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FileError::InvalidPath(self.descriptor.name.clone()))?;
        let target = dir.as_ref().join(file_name);
        tokio::fs::write(&target, &self.bytes).await?;
        tracing::debug!(path = %target.display(), size = self.bytes.len(), "wrote received file");
        Ok(target)
    }
}

/// Best-effort mime type from a file extension.
fn mime_from_extension(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("txt") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        _ => "",
    }
}
