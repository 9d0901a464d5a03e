use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nemein::core::pieces::Piece;
use nemein::core::{
    ClassicSession, ClearStrategy, DamageComposition, DamageResolver, DefenseCell,
    ExtendedSession, Grid, LineClearEngine, SessionConfig,
};
use nemein::types::{Command, PieceKind, Rotation};

fn bench_tick(c: &mut Criterion) {
    let mut session = ClassicSession::new(SessionConfig::default().with_seed(12345));
    session.apply_command(Command::TickDown).unwrap();

    c.bench_function("classic_tick", |b| {
        b.iter(|| {
            let snapshot = session.apply_command(black_box(Command::TickDown)).unwrap();
            if snapshot.game_over() {
                session = ClassicSession::new(SessionConfig::default().with_seed(12345));
            }
        })
    });
}

fn bench_hard_drop(c: &mut Criterion) {
    let mut session = ExtendedSession::new(SessionConfig::default().with_seed(12345));
    session.apply_command(Command::TickDown).unwrap();

    c.bench_function("extended_hard_drop", |b| {
        b.iter(|| {
            let snapshot = session.apply_command(black_box(Command::HardDrop)).unwrap();
            if snapshot.game_over() {
                session = ExtendedSession::new(SessionConfig::default().with_seed(12345));
            }
        })
    });
}

fn bench_ghost(c: &mut Criterion) {
    let mut grid: Grid<PieceKind> = Grid::new(10, 20);
    for y in 12..20 {
        for x in 0..10 {
            if (x + y) % 4 != 0 {
                if let Some(cell) = grid.cell_mut(x, y) {
                    *cell = PieceKind::J;
                }
            }
        }
    }
    grid.refresh_lowest_rows();
    let piece = Piece::new(PieceKind::I, Rotation::R);

    c.bench_function("compute_ghost_y", |b| {
        b.iter(|| grid.compute_ghost_y(black_box(4), black_box(0), piece))
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut grid: Grid<PieceKind> = Grid::new(10, 20);
            for y in 16..20 {
                grid.fill_row(y, PieceKind::I);
            }
            LineClearEngine.resolve_clears(&mut grid)
        })
    });
}

fn bench_damage_clear(c: &mut Criterion) {
    c.bench_function("damage_4_lines_over_challenge_line", |b| {
        b.iter(|| {
            let mut grid: Grid<DefenseCell> = Grid::new(10, 20);
            let mut resolver = DamageResolver::new(10, 20, DamageComposition::PHYSICAL, 7);
            resolver.spawn_challenge_line(&mut grid);
            for y in 15..19 {
                grid.fill_row(y, PieceKind::L);
            }
            resolver.resolve_clears(&mut grid)
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_hard_drop,
    bench_ghost,
    bench_line_clear,
    bench_damage_clear
);
criterion_main!(benches);
