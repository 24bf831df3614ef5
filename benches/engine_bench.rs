use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use chainclash::board::{Board, Placement, PlayerId};
use chainclash::movegen::{legal_moves, random_move};
use chainclash::protocol::notation::encode_board;
use chainclash::resolve::{play_unchecked, Resolver};
use chainclash::search::{choose_move_with_stop, minimax, Mover, SearchParams};

/// Plays `turns` random moves on an empty board to reach a busy midgame.
fn midgame(size: usize, players: usize, turns: usize, seed: u64) -> (Board, Placement) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::new(size);
    let mut placement = Placement::new(players);
    let mut resolver = Resolver::new(size);
    for t in 0..turns {
        let player = PlayerId((t % players) as u8);
        match random_move(&board, &placement, player, &mut rng) {
            Some(mv) => {
                play_unchecked(&mut board, &mut placement, &mut resolver, mv);
            }
            None => placement.mark_placed(player),
        }
    }
    (board, placement)
}

fn bench_legal_moves(c: &mut Criterion) {
    let (board, placement) = midgame(8, 4, 40, 1);
    c.bench_function("legal_moves_8x8", |b| {
        b.iter(|| legal_moves(black_box(&board), black_box(&placement), PlayerId(0)))
    });
}

fn bench_resolve_chain(c: &mut Criterion) {
    let (board, placement) = midgame(8, 4, 40, 2);
    let moves = legal_moves(&board, &placement, PlayerId(0));
    c.bench_function("apply_and_resolve_all_moves_8x8", |b| {
        let mut resolver = Resolver::new(64);
        b.iter(|| {
            for &mv in &moves {
                let mut next = board.clone();
                let mut flags = placement.clone();
                black_box(play_unchecked(&mut next, &mut flags, &mut resolver, mv));
            }
        })
    });
}

fn bench_encode(c: &mut Criterion) {
    let (board, placement) = midgame(16, 8, 120, 3);
    c.bench_function("encode_board_16x16", |b| {
        b.iter(|| encode_board(black_box(&board), black_box(&placement)))
    });
}

fn bench_minimax(c: &mut Criterion) {
    let (board, placement) = midgame(6, 3, 18, 4);
    let mut group = c.benchmark_group("minimax");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));
    for depth in [2u32, 3] {
        group.bench_function(format!("depth_{}_k8", depth), |b| {
            b.iter(|| {
                minimax(
                    black_box(&board),
                    black_box(&placement),
                    Mover::Focus,
                    depth,
                    PlayerId(0),
                    8,
                )
            })
        });
    }
    group.finish();
}

fn bench_choose_move(c: &mut Criterion) {
    let (board, placement) = midgame(7, 4, 24, 5);
    let params = SearchParams::new(3, 10).unwrap();
    let stop = AtomicBool::new(false);
    let mut group = c.benchmark_group("choose_move");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("depth_3_k10_7x7", |b| {
        let mut rng = SmallRng::seed_from_u64(6);
        b.iter(|| {
            choose_move_with_stop(
                black_box(&board),
                black_box(&placement),
                PlayerId(0),
                &params,
                &mut rng,
                &stop,
            )
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_legal_moves,
    bench_resolve_chain,
    bench_encode,
    bench_minimax,
    bench_choose_move
);
criterion_main!(benches);
