//! Benchmarks for move list rendering and captured piece recomputation
//! over a long game.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sparring_core::{CapturedPieceTracker, MoveLedger, Rules, StandardRules};

/// Knights shuffle back and forth, then a few captures, then more shuffling.
fn long_game() -> MoveLedger {
    let mut rules = StandardRules::new();
    let mut ledger = MoveLedger::new();

    let opening = ["e2e4", "d7d5", "e4d5", "d8d5", "b1c3", "d5a5"];
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];

    let moves = opening
        .iter()
        .chain(shuffle.iter().cycle().take(4 * 20));
    for move_str in moves {
        let played = rules
            .apply_move(move_str.parse().unwrap())
            .expect("legal move");
        ledger.append(played);
    }
    ledger
}

pub fn ledger_rows_and_captures(c: &mut Criterion) {
    // Setup
    let ledger = long_game();
    let rows = ledger.rows();
    let captured = CapturedPieceTracker::from_moves(ledger.entries());

    // Benchmarks

    c.bench_function("ledger rows long game", |b| {
        b.iter(|| {
            let computed = black_box(&ledger).rows();
            assert_eq!(computed.len(), rows.len());
        });
    });

    c.bench_function("captured recompute long game", |b| {
        let mut tracker = CapturedPieceTracker::new();
        b.iter(|| {
            tracker.recompute_from(black_box(ledger.entries()));
            assert_eq!(tracker, captured);
        });
    });
}

criterion_group! {
    name = ledger_rendering;
    config = Criterion::default().without_plots().sample_size(100);
    targets = ledger_rows_and_captures
}

criterion_main!(ledger_rendering);
