//! Property-based tests for the ferry transfer protocol.
//!
//! Uses proptest to verify invariants across large input spaces.

use proptest::prelude::*;

// ============================================================================
// Control Codec Properties
// ============================================================================

mod codec_properties {
    use super::*;
    use ferry_core::ControlMessage;

    proptest! {
        /// Manifest frames roundtrip through the wire format.
        #[test]
        fn manifest_roundtrip(count in any::<u32>(), total_size in any::<u64>()) {
            let msg = ControlMessage::Manifest { count, total_size };
            let decoded = ControlMessage::decode(&msg.encode().unwrap()).unwrap();
            prop_assert_eq!(decoded, msg);
        }

        /// Announcement frames roundtrip, including awkward names.
        #[test]
        fn announcement_roundtrip(
            file_index in any::<u32>(),
            name in "[a-zA-Z0-9 ._-]{1,64}",
            size in any::<u64>(),
            file_type in "[a-z]{0,10}(/[a-z0-9.+-]{1,20})?",
        ) {
            let msg = ControlMessage::FileMetadata { file_index, name, size, file_type };
            let decoded = ControlMessage::decode(&msg.encode().unwrap()).unwrap();
            prop_assert_eq!(decoded, msg);
        }

        /// Arbitrary text never crashes the decoder; it fails recoverably.
        #[test]
        fn decode_never_panics(raw in ".{0,256}") {
            if let Err(err) = ControlMessage::decode(&raw) {
                prop_assert!(err.is_recoverable());
            }
        }
    }
}

// ============================================================================
// Transfer Session Properties
// ============================================================================

mod transfer_properties {
    use super::*;
    use ferry_core::{
        EventSink, ReceiverEngine, SenderEngine, SessionConfig, SessionEvent, SessionPhase,
    };

    fn batch_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..2048), 1..5)
    }

    /// Run a fault-free wire between a sender and a receiver engine.
    fn pump(
        contents: &[Vec<u8>],
        chunk_size: usize,
    ) -> (ReceiverEngine, Vec<SessionEvent>) {
        let config = SessionConfig {
            chunk_size,
            ..SessionConfig::default()
        };
        let files = contents
            .iter()
            .enumerate()
            .map(|(i, bytes)| {
                ferry_files::OutboundFile::from_bytes(format!("file-{i}"), "", bytes.clone())
                    .unwrap()
            })
            .collect();

        let mut sender = SenderEngine::new(&config, files, EventSink::disabled()).unwrap();
        sender.mark_connected();

        let (sink, mut rx) = EventSink::channel();
        let mut receiver = ReceiverEngine::new(sink);
        receiver.on_open();
        while let Some(frame) = sender.next_frame().unwrap() {
            receiver.on_message(frame);
        }

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        (receiver, events)
    }

    proptest! {
        /// A fault-free channel delivers every file bit-identically, with
        /// exactly one completion per file in index order.
        #[test]
        fn fault_free_batch_reconstructs_exactly(
            contents in batch_strategy(),
            chunk_size in 1usize..1500,
        ) {
            let (mut receiver, events) = pump(&contents, chunk_size);

            prop_assert_eq!(receiver.phase(), SessionPhase::AllComplete);
            let outcome = receiver.take_batch().unwrap();
            prop_assert_eq!(outcome.files.len(), contents.len());
            for (received, sent) in outcome.files.iter().zip(&contents) {
                prop_assert_eq!(&received.bytes, sent);
            }

            let completions: Vec<u32> = events
                .iter()
                .filter_map(|e| match e {
                    SessionEvent::FileCompleted { file_index, .. } => Some(*file_index),
                    _ => None,
                })
                .collect();
            let expected: Vec<u32> = (0..contents.len() as u32).collect();
            prop_assert_eq!(completions, expected);
        }

        /// Overall progress is monotone and ends at exactly 100.
        #[test]
        fn overall_progress_is_monotone(
            contents in batch_strategy(),
            chunk_size in 1usize..1500,
        ) {
            let (_receiver, events) = pump(&contents, chunk_size);

            let mut last = 0.0f64;
            for event in &events {
                if let SessionEvent::FileProgress { overall_percent, .. } = event {
                    prop_assert!(*overall_percent >= last);
                    prop_assert!(*overall_percent <= 100.0);
                    last = *overall_percent;
                }
            }

            let final_report = events.iter().rev().find_map(|e| match e {
                SessionEvent::AllComplete(report) => Some(report.clone()),
                _ => None,
            });
            let report = final_report.unwrap();
            let total: u64 = contents.iter().map(|c| c.len() as u64).sum();
            prop_assert_eq!(report.bytes_transferred, total);
            prop_assert_eq!(report.files_completed, contents.len() as u32);
        }
    }
}
