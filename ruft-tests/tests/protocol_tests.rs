//! Integration tests for RUFT protocol handling
//!
//! Exercises the wire codec, the acknowledgment engine and the RTT
//! estimator through the public crate API.

use bytes::Bytes;
use ruft_protocol::{
    Ack, LossDetection, Packet, ReceiverEngine, ReceiverEvent, RttEstimator, WireError, ACK_SIZE,
    HEADER_SIZE,
};
use std::time::Duration;

fn datagram(seq: u32, payload: &[u8]) -> Vec<u8> {
    Packet::new(seq, Bytes::copy_from_slice(payload))
        .to_bytes()
        .to_vec()
}

fn ack_of(event: ReceiverEvent) -> Ack {
    match event {
        ReceiverEvent::Ack(ack) => ack,
        other => panic!("expected ack, got {:?}", other),
    }
}

#[test]
fn test_packet_roundtrip_with_full_segment() {
    let payload = vec![0xAB; 5120];
    let packet = Packet::new(999, Bytes::from(payload.clone()));

    let bytes = packet.to_bytes();
    assert_eq!(bytes.len(), HEADER_SIZE + 5120);

    let decoded = Packet::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.sequence_number, 999);
    assert_eq!(&decoded.payload[..], &payload[..]);
}

#[test]
fn test_packet_rejects_inflated_length_field() {
    let mut bytes = datagram(0, b"data");
    // Declare more payload than is present
    bytes[7] = 200;

    let err = Packet::from_bytes(&bytes).unwrap_err();
    assert!(matches!(
        err,
        WireError::PayloadLengthMismatch {
            declared: 200,
            actual: 4
        }
    ));
    assert!(!err.is_ack());
}

#[test]
fn test_ack_wire_layout_is_big_endian() {
    let ack = Ack {
        ack_number: 0x0102_0304,
        largest_acknowledged: 7,
        ack_range: 2,
        gap: true,
    };

    let bytes = ack.to_bytes();
    assert_eq!(bytes.len(), ACK_SIZE);
    assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
    assert_eq!(&bytes[4..8], &[0, 0, 0, 7]);
    assert_eq!(&bytes[8..12], &[0, 0, 0, 2]);
    assert_eq!(&bytes[12..16], &[0, 0, 0, 1]);
}

#[test]
fn test_ack_after_reordered_delivery() {
    // 0 and 1 arrive, 2 is lost, 3 arrives
    let mut engine = ReceiverEngine::new();
    engine.on_datagram(&datagram(0, b"a")).unwrap();
    engine.on_datagram(&datagram(1, b"b")).unwrap();

    let ack = ack_of(engine.on_datagram(&datagram(3, b"d")).unwrap());
    assert_eq!(ack.ack_number, 3);
    assert_eq!(ack.largest_acknowledged, 3);
    assert_eq!(ack.ack_range, 1);
    assert!(ack.gap);
}

#[test]
fn test_ack_for_lone_packet_beyond_start() {
    // Only packet 2 has arrived; the run is just packet 2 itself
    let mut engine = ReceiverEngine::new();

    let ack = ack_of(engine.on_datagram(&datagram(2, b"c")).unwrap());
    assert_eq!(ack.largest_acknowledged, 2);
    assert_eq!(ack.ack_range, 1);
    assert!(ack.gap);
}

#[test]
fn test_ack_without_gap_reaches_zero() {
    let mut engine = ReceiverEngine::new();
    for seq in 0..5u32 {
        engine.on_datagram(&datagram(seq, b"x")).unwrap();
    }

    let ack = ack_of(engine.on_datagram(&datagram(5, b"x")).unwrap());
    assert_eq!(ack.ack_range, 6);
    assert!(!ack.gap);
}

#[test]
fn test_retransmission_acks_cover_earlier_packets() {
    // A retransmitted early packet is acknowledged by its own number even
    // when much later packets have already arrived
    let mut engine = ReceiverEngine::new();
    engine.on_datagram(&datagram(9, b"late")).unwrap();

    let ack = ack_of(engine.on_datagram(&datagram(0, b"early")).unwrap());
    assert_eq!(ack.ack_number, 0);
    assert_eq!(ack.largest_acknowledged, 9);
    assert_eq!(ack.ack_range, 1);
    assert!(ack.gap);
}

#[test]
fn test_rtt_first_sample_initializes_estimator() {
    let mut rtt = RttEstimator::new();
    rtt.on_sample(Duration::from_millis(80));

    assert_eq!(rtt.srtt(), Duration::from_millis(80));
    assert_eq!(rtt.rtt_var(), Duration::from_millis(40));
    assert_eq!(rtt.pto(), Duration::from_millis(240));
}

#[test]
fn test_rtt_threshold_holds_peak_sample() {
    let mut rtt = RttEstimator::new();
    rtt.on_sample(Duration::from_millis(10));
    rtt.on_sample(Duration::from_millis(500));
    for _ in 0..50 {
        rtt.on_sample(Duration::from_millis(10));
    }

    // Smoothing has long forgotten the spike; the threshold has not
    assert!(rtt.srtt() < Duration::from_millis(50));
    assert!(rtt.timeout_threshold() >= Duration::from_millis(500));
}

#[test]
fn test_loss_detection_parsing() {
    assert_eq!("timeout".parse(), Ok(LossDetection::Timeout));
    assert_eq!("out_of_order".parse(), Ok(LossDetection::OutOfOrder));
    assert_eq!("both".parse(), Ok(LossDetection::Both));
    assert!("fastest".parse::<LossDetection>().is_err());
}

#[test]
fn test_loss_detection_strategy_flags() {
    assert!(LossDetection::Timeout.uses_timeout());
    assert!(!LossDetection::Timeout.uses_out_of_order());
    assert!(LossDetection::OutOfOrder.uses_out_of_order());
    assert!(!LossDetection::OutOfOrder.uses_timeout());
    assert!(LossDetection::Both.uses_timeout());
    assert!(LossDetection::Both.uses_out_of_order());
}
