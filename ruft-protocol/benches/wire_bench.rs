use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ruft_protocol::wire::{Ack, Packet};
use ruft_protocol::ReceiverEngine;

fn bench_packet_serialize(c: &mut Criterion) {
    let packet = Packet::new(1000, Bytes::from(vec![0u8; 5120]));

    c.bench_function("packet_serialize", |b| {
        b.iter(|| {
            let bytes = black_box(&packet).to_bytes();
            black_box(bytes);
        });
    });
}

fn bench_packet_deserialize(c: &mut Criterion) {
    let bytes = Packet::new(1000, Bytes::from(vec![0u8; 5120])).to_bytes();

    c.bench_function("packet_deserialize", |b| {
        b.iter(|| {
            let packet = Packet::from_bytes(black_box(&bytes)).unwrap();
            black_box(packet);
        });
    });
}

fn bench_ack_roundtrip(c: &mut Criterion) {
    let ack = Ack {
        ack_number: 500,
        largest_acknowledged: 1000,
        ack_range: 400,
        gap: true,
    };

    c.bench_function("ack_serialize", |b| {
        b.iter(|| {
            let bytes = black_box(&ack).to_bytes();
            black_box(bytes);
        });
    });

    let bytes = ack.to_bytes();
    c.bench_function("ack_deserialize", |b| {
        b.iter(|| {
            let decoded = Ack::from_bytes(black_box(&bytes)).unwrap();
            black_box(decoded);
        });
    });
}

fn bench_ack_range_scan(c: &mut Criterion) {
    // Worst case for the downward scan: a long contiguous run
    let mut engine = ReceiverEngine::new();
    for seq in 0..4095u32 {
        let datagram = Packet::new(seq, Bytes::from_static(b"x")).to_bytes();
        engine.on_datagram(&datagram).unwrap();
    }
    let last = Packet::new(4095, Bytes::from_static(b"x")).to_bytes();

    c.bench_function("ack_range_scan_4096", |b| {
        b.iter(|| {
            let event = engine.on_datagram(black_box(&last)).unwrap();
            black_box(event);
        });
    });
}

criterion_group!(
    benches,
    bench_packet_serialize,
    bench_packet_deserialize,
    bench_ack_roundtrip,
    bench_ack_range_scan
);
criterion_main!(benches);
