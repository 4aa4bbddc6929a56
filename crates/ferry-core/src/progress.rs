//! Batch progress tracking.
//!
//! Per-file progress is the fraction of the announced size moved so far;
//! overall progress folds completed files and the current file's fraction
//! into one monotone percentage that reaches exactly 100 when the batch
//! finishes.

use crate::session::BatchId;
use std::time::{Duration, Instant};

/// Progress of one transfer batch.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    file_count: u32,
    total_bytes: u64,
    files_processed: u32,
    bytes_transferred: u64,
    current_file_bytes: u64,
    current_file_size: Option<u64>,
    started_at: Instant,
}

impl BatchProgress {
    /// Start tracking a batch of `file_count` files, `total_bytes` in sum.
    #[must_use]
    pub fn new(file_count: u32, total_bytes: u64) -> Self {
        Self {
            file_count,
            total_bytes,
            files_processed: 0,
            bytes_transferred: 0,
            current_file_bytes: 0,
            current_file_size: None,
            started_at: Instant::now(),
        }
    }

    /// A file of `size` bytes starts transferring.
    pub fn begin_file(&mut self, size: u64) {
        self.current_file_bytes = 0;
        self.current_file_size = Some(size);
    }

    /// One chunk of `len` bytes moved for the current file.
    pub fn record_chunk(&mut self, len: u64) {
        self.current_file_bytes += len;
        self.bytes_transferred += len;
    }

    /// The current file is finished (completed or abandoned).
    pub fn finish_file(&mut self) {
        self.files_processed += 1;
        self.current_file_bytes = 0;
        self.current_file_size = None;
    }

    /// Bytes moved for the current file.
    #[must_use]
    pub fn current_file_bytes(&self) -> u64 {
        self.current_file_bytes
    }

    /// Bytes moved across the batch.
    #[must_use]
    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    /// Total bytes declared by the manifest.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Fraction of the current file moved, in [0.0, 1.0].
    #[must_use]
    pub fn file_fraction(&self) -> f64 {
        match self.current_file_size {
            None => 0.0,
            Some(0) => 1.0,
            Some(size) => (self.current_file_bytes as f64 / size as f64).min(1.0),
        }
    }

    /// Current file progress as a percentage.
    #[must_use]
    pub fn file_percent(&self) -> f64 {
        self.file_fraction() * 100.0
    }

    /// Overall batch progress as a percentage; monotone, exactly 100.0 once
    /// every file has finished.
    #[must_use]
    pub fn overall_percent(&self) -> f64 {
        if self.file_count == 0 {
            return 100.0;
        }
        let done = f64::from(self.files_processed) + self.file_fraction();
        (done / f64::from(self.file_count) * 100.0).min(100.0)
    }

    /// Mean transfer speed in bytes/second.
    #[must_use]
    pub fn speed(&self) -> f64 {
        let elapsed = self.started_at.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.bytes_transferred as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Estimated time remaining, when the speed is measurable.
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        let speed = self.speed();
        if speed > 0.0 && self.bytes_transferred < self.total_bytes {
            let remaining = self.total_bytes - self.bytes_transferred;
            Some(Duration::from_secs_f64(remaining as f64 / speed))
        } else {
            None
        }
    }

    /// Time since the batch started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Summarize the batch.
    #[must_use]
    pub fn report(&self, batch_id: BatchId, files_completed: u32) -> SessionReport {
        SessionReport {
            batch_id,
            file_count: self.file_count,
            files_completed,
            bytes_transferred: self.bytes_transferred,
            elapsed: self.elapsed(),
        }
    }
}

/// Summary of a finished (or failed) batch.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Batch identifier
    pub batch_id: BatchId,
    /// Files the manifest declared
    pub file_count: u32,
    /// Files that completed and verified
    pub files_completed: u32,
    /// Bytes moved
    pub bytes_transferred: u64,
    /// Wall time for the batch
    pub elapsed: Duration,
}

impl SessionReport {
    /// Mean throughput in bytes/second.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes_transferred as f64 / secs
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for SessionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "batch {}: {}/{} files, {} in {:.1}s ({}/s)",
            self.batch_id,
            self.files_completed,
            self.file_count,
            format_bytes(self.bytes_transferred),
            self.elapsed.as_secs_f64(),
            format_bytes(self.throughput() as u64),
        )
    }
}

/// Human-readable byte count (1024-based).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_file_percent_steps() {
        let mut progress = BatchProgress::new(1, 10);
        progress.begin_file(10);

        progress.record_chunk(4);
        assert!((progress.file_percent() - 40.0).abs() < 1e-9);
        progress.record_chunk(4);
        assert!((progress.file_percent() - 80.0).abs() < 1e-9);
        progress.record_chunk(2);
        assert!((progress.file_percent() - 100.0).abs() < 1e-9);

        progress.finish_file();
        assert!((progress.overall_percent() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_overall_percent_is_monotone() {
        let mut progress = BatchProgress::new(2, 8);
        let mut last = progress.overall_percent();

        for (size, chunks) in [(4u64, 2u64), (4, 2)] {
            progress.begin_file(size);
            for _ in 0..chunks {
                progress.record_chunk(size / chunks);
                let now = progress.overall_percent();
                assert!(now >= last);
                last = now;
            }
            progress.finish_file();
            let now = progress.overall_percent();
            assert!(now >= last);
            last = now;
        }
        assert!((last - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_byte_file_counts_as_done() {
        let mut progress = BatchProgress::new(2, 5);
        progress.begin_file(0);
        assert!((progress.file_percent() - 100.0).abs() < 1e-9);
        assert!((progress.overall_percent() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_overshoot_is_capped() {
        let mut progress = BatchProgress::new(1, 10);
        progress.begin_file(10);
        progress.record_chunk(12);
        assert!((progress.file_percent() - 100.0).abs() < 1e-9);
        assert!(progress.overall_percent() <= 100.0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
    }
}
