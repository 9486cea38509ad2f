//! Benchmarks for encoding and evaluation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;

use sensenet::nnue::{encode_into, hidden_layer};
use sensenet::{encode, evaluate, Board, FeatureVector, Section, WeightStore};

const POSITIONS: [(&str, &str); 3] = [
    ("startpos", sensenet::START_FEN),
    (
        "middlegame",
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    ),
    (
        "kiwipete",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    ),
];

fn random_store(seed: u64) -> WeightStore {
    let mut rng = StdRng::seed_from_u64(seed);
    WeightStore::from_fn(|section, _| match section {
        Section::HiddenWeights | Section::OutputWeights => rng.gen_range(-255..=255),
        Section::HiddenBias | Section::OutputBias => rng.gen_range(-64..=64),
    })
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for (name, fen) in POSITIONS {
        let board: Board = fen.parse().expect("valid fen");
        let mut buf = FeatureVector::new();
        group.bench_function(name, |b| {
            b.iter(|| encode_into(black_box(&board), &mut buf));
        });
    }
    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let store = random_store(0x5e45e);
    let mut group = c.benchmark_group("evaluate");
    for (name, fen) in POSITIONS {
        let board: Board = fen.parse().expect("valid fen");
        let features = encode(&board);
        group.bench_function(name, |b| {
            b.iter(|| evaluate(black_box(&features), &store));
        });
    }
    let features = encode(&Board::new());
    group.bench_function("hidden_layer", |b| {
        b.iter(|| hidden_layer(black_box(&features), &store));
    });
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let text = random_store(7).to_string();
    c.bench_function("parse_weights", |b| {
        b.iter(|| WeightStore::parse_str(black_box(&text)));
    });
}

criterion_group!(benches, bench_encode, bench_evaluate, bench_load);
criterion_main!(benches);
