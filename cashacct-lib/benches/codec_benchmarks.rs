//! Codec benchmarks
//!
//! These benchmarks measure the performance of the hot codec paths:
//! address decoding and encoding, marker payload round trips, and the
//! account fingerprint derivations.
//!
//! Run with: `cargo bench --bench codec_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cashacct_lib::{
    address, identity, AddressNamespace, PaymentEntry, PaymentType, RegistrationPayload,
};

const CASHADDR: &str = "bitcoincash:qr6m7j9njldwwzlg9v7v53unlr4jkmx6eylep8ekg2";
const LEGACY: &str = "1PQPheJQSauxRPTxzNMUco1XmoCyPoEJCp";

fn key_hash() -> Vec<u8> {
    hex::decode("f5bf48b397dae70be82b3cca4793f8eb2b6cdac9").unwrap()
}

/// Benchmark CashAddr decoding
fn bench_cashaddr_decode(c: &mut Criterion) {
    c.bench_function("cashaddr_decode", |b| {
        b.iter(|| {
            let decoded = address::decode_address(black_box(CASHADDR)).unwrap();
            black_box(decoded)
        })
    });
}

/// Benchmark legacy Base58Check decoding
fn bench_legacy_decode(c: &mut Criterion) {
    c.bench_function("legacy_decode", |b| {
        b.iter(|| {
            let decoded = address::decode_address(black_box(LEGACY)).unwrap();
            black_box(decoded)
        })
    });
}

/// Benchmark CashAddr encoding
fn bench_cashaddr_encode(c: &mut Criterion) {
    let hash = key_hash();

    c.bench_function("cashaddr_encode", |b| {
        b.iter(|| {
            let encoded = address::encode_address(
                PaymentType::KeyHash,
                AddressNamespace::Primary,
                black_box(&hash),
            )
            .unwrap();
            black_box(encoded)
        })
    });
}

/// Benchmark marker payload encoding to script form
fn bench_payload_encode(c: &mut Criterion) {
    let entry =
        PaymentEntry::new(PaymentType::KeyHash, AddressNamespace::Primary, key_hash()).unwrap();
    let payload = RegistrationPayload::new("jonathan", vec![entry]).unwrap();

    c.bench_function("payload_to_script", |b| {
        b.iter(|| {
            let script = black_box(&payload).to_script().unwrap();
            black_box(script)
        })
    });
}

/// Benchmark marker payload decoding from script form
fn bench_payload_decode(c: &mut Criterion) {
    let entry =
        PaymentEntry::new(PaymentType::KeyHash, AddressNamespace::Primary, key_hash()).unwrap();
    let payload = RegistrationPayload::new("jonathan", vec![entry]).unwrap();
    let script = payload.to_script().unwrap();

    c.bench_function("payload_decode_script", |b| {
        b.iter(|| {
            let decoded = RegistrationPayload::decode(black_box(&script)).unwrap();
            black_box(decoded)
        })
    });
}

/// Benchmark emoji and collision hash derivation
fn bench_account_fingerprint(c: &mut Criterion) {
    let block_hash = [0x11u8; 32];
    let txid = [0x22u8; 32];

    c.bench_function("account_fingerprint", |b| {
        b.iter(|| {
            let emoji = identity::emoji(black_box(&block_hash), black_box(&txid));
            let collision = identity::collision_hash(black_box(&block_hash), black_box(&txid));
            black_box((emoji, collision))
        })
    });
}

criterion_group!(
    codec_benches,
    bench_cashaddr_decode,
    bench_legacy_decode,
    bench_cashaddr_encode,
    bench_payload_encode,
    bench_payload_decode,
    bench_account_fingerprint,
);

criterion_main!(codec_benches);
