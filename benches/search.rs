use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use blockbot::ai::{
    simulate, ComboSearch, RankTable, RankedSearch, RanksConfig, RanksThinker, TransitionTable,
};
use blockbot::core::{GameState, RuleConfig, Srs};
use blockbot::types::PieceKind;

fn bench_transition_table(c: &mut Criterion) {
    c.bench_function("transition_table_build", |b| {
        b.iter(|| TransitionTable::build(black_box(&Srs)))
    });
}

fn bench_combo_search(c: &mut Criterion) {
    let table = TransitionTable::build(&Srs);
    let search = ComboSearch::new(&table);
    let queue = [
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::I,
    ];

    c.bench_function("combo_search_depth_5", |b| {
        b.iter(|| search.search(black_box(0), PieceKind::I, None, true, &queue, 5))
    });
}

fn bench_ranked_search(c: &mut Criterion) {
    let table = RankTable::from_fn(9, 2, |s| {
        1.0 / (1.0 + s.iter().map(|d| d.unsigned_abs() as f32).sum::<f32>())
    })
    .unwrap_or_else(|_| RankTable::empty(9, 2));
    let search = RankedSearch::new(&Srs, &table);
    let heights = [3, 4, 4, 5, 3, 3, 2, 4, 4];
    let pieces = [PieceKind::T, PieceKind::S, PieceKind::L];

    c.bench_function("ranked_search_preview_2", |b| {
        b.iter(|| search.search(black_box(&heights), black_box(&pieces)))
    });
}

fn bench_ranks_simulation(c: &mut Criterion) {
    let table = Arc::new(RankTable::empty(9, 2));

    c.bench_function("ranks_simulate_50_pieces", |b| {
        b.iter(|| {
            let mut thinker =
                RanksThinker::new(Arc::new(Srs), Arc::clone(&table), RanksConfig::default());
            let mut game = GameState::with_seed(RuleConfig::instant(), 12345);
            simulate(&mut thinker, &mut game, 50)
        })
    });
}

criterion_group!(
    benches,
    bench_transition_table,
    bench_combo_search,
    bench_ranked_search,
    bench_ranks_simulation
);
criterion_main!(benches);
