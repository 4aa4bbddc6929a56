//! End-to-end transfer scenarios over the in-memory channel pair.

use ferry_core::{
    ControlMessage, EventSink, ReceiverSession, SenderSession, SessionConfig, SessionError,
    SessionEvent, SessionPhase, exchange_descriptions,
};
use ferry_files::OutboundFile;
use ferry_integration_tests::{completed_indices, drain_events, init_tracing, overall_percents};
use ferry_signaling::{CodeRendezvous, MemoryStore, RendezvousSide, SignalingBridge};
use ferry_transport::{ChannelMessage, MessageChannel, channel_pair};
use std::sync::Arc;
use std::time::Duration;

fn small_chunk_config() -> SessionConfig {
    SessionConfig {
        chunk_size: 1024,
        ..SessionConfig::default()
    }
}

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn text_frame(msg: &ControlMessage) -> ChannelMessage {
    ChannelMessage::Text(msg.encode().unwrap())
}

#[tokio::test]
async fn test_two_file_batch_end_to_end() {
    init_tracing();
    let (sender_end, receiver_end) = channel_pair();

    let data_a = patterned(3000);
    let data_b = patterned(1024);
    let files = vec![
        OutboundFile::from_bytes("a.bin", "application/octet-stream", data_a.clone()).unwrap(),
        OutboundFile::from_bytes("b.bin", "", data_b.clone()).unwrap(),
    ];

    let mut sender = SenderSession::new(sender_end, small_chunk_config(), EventSink::disabled());
    let report = sender.send_batch(files).await.unwrap();
    assert_eq!(report.file_count, 2);
    assert_eq!(report.files_completed, 2);
    assert_eq!(report.bytes_transferred, 4024);

    let (sink, mut rx) = EventSink::channel();
    let mut receiver = ReceiverSession::new(receiver_end, sink);
    let outcome = receiver.next_batch().await.unwrap().unwrap();

    assert_eq!(outcome.files.len(), 2);
    assert_eq!(outcome.files[0].descriptor.name, "a.bin");
    assert_eq!(outcome.files[0].bytes, data_a);
    assert_eq!(outcome.files[1].bytes, data_b);
    assert_eq!(outcome.report.files_completed, 2);

    let events = drain_events(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, SessionEvent::ManifestReceived { file_count: 2, .. }))
    );
    assert_eq!(completed_indices(&events), vec![0, 1]);

    // Overall progress never moves backwards and lands on exactly 100.
    let percents = overall_percents(&events);
    assert!(percents.windows(2).all(|w| w[1] >= w[0]));
    assert!((percents.last().unwrap() - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_two_batches_on_one_channel() {
    let (sender_end, receiver_end) = channel_pair();

    let mut sender = SenderSession::new(sender_end, small_chunk_config(), EventSink::disabled());
    sender
        .send_batch(vec![
            OutboundFile::from_bytes("first.bin", "", patterned(2000)).unwrap(),
        ])
        .await
        .unwrap();
    sender
        .send_batch(vec![
            OutboundFile::from_bytes("second.bin", "", patterned(10)).unwrap(),
        ])
        .await
        .unwrap();
    sender.close().await;

    let mut receiver = ReceiverSession::new(receiver_end, EventSink::disabled());
    let first = receiver.next_batch().await.unwrap().unwrap();
    assert_eq!(first.files[0].descriptor.name, "first.bin");

    let second = receiver.next_batch().await.unwrap().unwrap();
    assert_eq!(second.files[0].descriptor.name, "second.bin");

    // Channel closed after the second batch: a clean end, not a failure.
    assert!(receiver.next_batch().await.unwrap().is_none());
}

#[tokio::test]
async fn test_close_mid_batch_fails_with_partial_files() {
    init_tracing();
    let (sender_end, receiver_end) = channel_pair();

    // Manifest declares two files but only one arrives before the close.
    sender_end
        .send(text_frame(&ControlMessage::Manifest {
            count: 2,
            total_size: 15,
        }))
        .await
        .unwrap();
    sender_end
        .send(text_frame(&ControlMessage::FileMetadata {
            file_index: 0,
            name: "only.bin".into(),
            size: 5,
            file_type: String::new(),
        }))
        .await
        .unwrap();
    sender_end
        .send(ChannelMessage::Binary(vec![3; 5]))
        .await
        .unwrap();
    sender_end.close().await;

    let mut receiver = ReceiverSession::new(receiver_end, EventSink::disabled());
    let err = receiver.next_batch().await.unwrap_err();
    assert!(matches!(err, SessionError::ChannelClosed));
    assert_eq!(receiver.state().phase, SessionPhase::Failed);
    assert_eq!(receiver.files_completed().len(), 1);
    assert_eq!(receiver.files_completed()[0].bytes, vec![3; 5]);
}

#[tokio::test]
async fn test_orphan_chunk_does_not_break_the_session() {
    let (sender_end, receiver_end) = channel_pair();

    // A binary chunk with no announcement pending, then a proper batch.
    sender_end
        .send(ChannelMessage::Binary(vec![9; 64]))
        .await
        .unwrap();
    sender_end
        .send(text_frame(&ControlMessage::Manifest {
            count: 1,
            total_size: 4,
        }))
        .await
        .unwrap();
    sender_end
        .send(text_frame(&ControlMessage::FileMetadata {
            file_index: 0,
            name: "ok.bin".into(),
            size: 4,
            file_type: String::new(),
        }))
        .await
        .unwrap();
    sender_end
        .send(ChannelMessage::Binary(vec![1, 2, 3, 4]))
        .await
        .unwrap();

    let (sink, mut rx) = EventSink::channel();
    let mut receiver = ReceiverSession::new(receiver_end, sink);
    let outcome = receiver.next_batch().await.unwrap().unwrap();
    assert_eq!(outcome.files.len(), 1);
    assert_eq!(outcome.files[0].bytes, vec![1, 2, 3, 4]);

    let events = drain_events(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, SessionEvent::ProtocolError { .. }))
    );
}

#[tokio::test]
async fn test_zero_byte_and_normal_file() {
    let (sender_end, receiver_end) = channel_pair();

    let files = vec![
        OutboundFile::from_bytes("empty.bin", "", Vec::new()).unwrap(),
        OutboundFile::from_bytes("five.bin", "", vec![5; 5]).unwrap(),
    ];
    let mut sender = SenderSession::new(sender_end, small_chunk_config(), EventSink::disabled());
    sender.send_batch(files).await.unwrap();

    let mut receiver = ReceiverSession::new(receiver_end, EventSink::disabled());
    let outcome = receiver.next_batch().await.unwrap().unwrap();

    assert_eq!(outcome.files.len(), 2);
    assert!(outcome.files[0].bytes.is_empty());
    assert_eq!(outcome.files[1].bytes, vec![5; 5]);
}

#[tokio::test]
async fn test_rendezvous_signaling_then_transfer() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let fast = |b: CodeRendezvous<MemoryStore>| {
        b.with_poll_interval(Duration::from_millis(5))
            .with_wait_bound(Duration::from_millis(500))
    };

    // Initiator shows a 6-digit code; the responder joins with it.
    let initiator = fast(CodeRendezvous::new(
        Arc::clone(&store),
        RendezvousSide::Initiator,
    ));
    let handle = initiator.publish("offer-blob".into()).await.unwrap();
    let code = handle.as_str().to_string();

    let responder = fast(CodeRendezvous::new(
        store,
        RendezvousSide::Responder { code: code.clone() },
    ));
    let (answer, exchanged) = tokio::join!(
        initiator.await_counterpart(&handle),
        exchange_descriptions(&responder, "answer-blob".into()),
    );
    assert_eq!(answer.unwrap(), "answer-blob");
    let (resp_handle, offer) = exchanged.unwrap();
    assert_eq!(resp_handle.as_str(), code);
    assert_eq!(offer, "offer-blob");

    // Descriptions exchanged; the channel stands in for the negotiated link.
    let (sender_end, receiver_end) = channel_pair();
    let mut sender = SenderSession::new(sender_end, small_chunk_config(), EventSink::disabled());
    sender
        .send_batch(vec![
            OutboundFile::from_bytes("paired.bin", "", patterned(100)).unwrap(),
        ])
        .await
        .unwrap();

    let mut receiver = ReceiverSession::new(receiver_end, EventSink::disabled());
    let outcome = receiver.next_batch().await.unwrap().unwrap();
    assert_eq!(outcome.files[0].bytes, patterned(100));
}

#[tokio::test]
async fn test_received_file_persists_to_disk() {
    let (sender_end, receiver_end) = channel_pair();
    let data = patterned(2500);

    let mut sender = SenderSession::new(sender_end, small_chunk_config(), EventSink::disabled());
    sender
        .send_batch(vec![
            OutboundFile::from_bytes("saved.bin", "application/octet-stream", data.clone())
                .unwrap(),
        ])
        .await
        .unwrap();

    let mut receiver = ReceiverSession::new(receiver_end, EventSink::disabled());
    let outcome = receiver.next_batch().await.unwrap().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = outcome.files[0].write_to_dir(dir.path()).await.unwrap();
    assert_eq!(tokio::fs::read(path).await.unwrap(), data);
}
