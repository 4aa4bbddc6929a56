//! Ordered chunk reassembly.

use crate::error::FileError;

/// Accumulates binary chunks for the file currently in flight.
///
/// Chunks are appended in arrival order; the buffer relies entirely on the
/// channel's ordered, reliable delivery and does not tolerate reordering or
/// duplication. The buffer is created when a file announcement arrives and
/// consumed by [`ReceptionBuffer::finalize`] once the received byte count
/// reaches the announced size.
#[derive(Debug)]
pub struct ReceptionBuffer {
    expected_size: u64,
    received: u64,
    chunks: Vec<Vec<u8>>,
}

impl ReceptionBuffer {
    /// Open a buffer for a file of `expected_size` bytes.
    #[must_use]
    pub fn new(expected_size: u64) -> Self {
        Self {
            expected_size,
            received: 0,
            chunks: Vec::new(),
        }
    }

    /// Append one chunk in arrival order.
    pub fn push(&mut self, chunk: Vec<u8>) {
        self.received += chunk.len() as u64;
        self.chunks.push(chunk);
    }

    /// Announced size of the file being received.
    #[must_use]
    pub fn expected_size(&self) -> u64 {
        self.expected_size
    }

    /// Bytes accumulated so far.
    #[must_use]
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Whether the announced byte count has been reached.
    ///
    /// Checked with `>=`: a final chunk may overshoot the announced size, and
    /// the overshoot is caught by [`ReceptionBuffer::finalize`] rather than
    /// leaving the file open forever.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.received >= self.expected_size
    }

    /// Fraction of the announced size received, in [0.0, 1.0].
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.expected_size == 0 {
            return 1.0;
        }
        (self.received as f64 / self.expected_size as f64).min(1.0)
    }

    /// Concatenate the accumulated chunks into the reconstructed file.
    ///
    /// Fails with [`FileError::SizeMismatch`] when the accumulated length
    /// differs from the announced size.
    pub fn finalize(self) -> Result<Vec<u8>, FileError> {
        if self.received != self.expected_size {
            return Err(FileError::SizeMismatch {
                expected: self.expected_size,
                actual: self.received,
            });
        }
        let mut bytes = Vec::with_capacity(self.expected_size as usize);
        for chunk in self.chunks {
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::FileChunker;

    #[test]
    fn test_roundtrip_through_chunker() {
        let data: Vec<u8> = (0..255).cycle().take(1000).collect();
        let chunker = FileChunker::new(64).unwrap();

        let mut buffer = ReceptionBuffer::new(data.len() as u64);
        for chunk in chunker.split(&data) {
            buffer.push(chunk.to_vec());
        }

        assert!(buffer.is_complete());
        assert_eq!(buffer.finalize().unwrap(), data);
    }

    #[test]
    fn test_progress_tracking() {
        let mut buffer = ReceptionBuffer::new(10);
        assert!(!buffer.is_complete());
        assert_eq!(buffer.fraction(), 0.0);

        buffer.push(vec![0; 4]);
        assert_eq!(buffer.received(), 4);
        assert!((buffer.fraction() - 0.4).abs() < f64::EPSILON);

        buffer.push(vec![0; 4]);
        buffer.push(vec![0; 2]);
        assert!(buffer.is_complete());
        assert_eq!(buffer.fraction(), 1.0);
    }

    #[test]
    fn test_zero_byte_file_is_immediately_complete() {
        let buffer = ReceptionBuffer::new(0);
        assert!(buffer.is_complete());
        assert_eq!(buffer.fraction(), 1.0);
        assert!(buffer.finalize().unwrap().is_empty());
    }

    #[test]
    fn test_short_delivery_fails_finalize() {
        let mut buffer = ReceptionBuffer::new(10);
        buffer.push(vec![0; 6]);
        assert!(!buffer.is_complete());
        assert!(matches!(
            buffer.finalize(),
            Err(FileError::SizeMismatch {
                expected: 10,
                actual: 6
            })
        ));
    }

    #[test]
    fn test_overshoot_completes_but_fails_finalize() {
        let mut buffer = ReceptionBuffer::new(10);
        buffer.push(vec![0; 8]);
        buffer.push(vec![0; 4]);
        assert!(buffer.is_complete());
        assert!(matches!(
            buffer.finalize(),
            Err(FileError::SizeMismatch {
                expected: 10,
                actual: 12
            })
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Splitting then reassembling reproduces the input for any
            /// buffer and chunk size.
            #[test]
            fn split_reassemble_roundtrip(
                data in prop::collection::vec(any::<u8>(), 0..4096),
                chunk_size in 1usize..512,
            ) {
                let chunker = FileChunker::new(chunk_size).unwrap();
                let mut buffer = ReceptionBuffer::new(data.len() as u64);
                for chunk in chunker.split(&data) {
                    prop_assert!(chunk.len() <= chunk_size);
                    buffer.push(chunk.to_vec());
                }
                prop_assert!(buffer.is_complete());
                prop_assert_eq!(buffer.finalize().unwrap(), data);
            }
        }
    }
}
