//! Damage resolver tests - pools, perk tiers, ailments and the challenge line

use nemein::core::damage::{AilmentKind, SHOCK_TICKS, TETRIS_PERK_CHANCE, TRIPLE_PERK_CHANCE};
use nemein::core::{CellKind, ClearStrategy, DamageComposition, DamageResolver, DefenseCell, Grid};
use nemein::types::{CellStatus, DamageType, PieceKind};

const W: usize = 10;
const H: usize = 20;

fn filled(rows: std::ops::Range<usize>) -> Grid<DefenseCell> {
    let mut grid = Grid::new(W, H);
    for y in rows {
        grid.fill_row(y, PieceKind::L);
    }
    grid
}

#[test]
fn test_tetris_over_challenge_line_breaks_it() {
    let mut resolver = DamageResolver::new(W, H, DamageComposition::PHYSICAL, 11);
    let mut grid: Grid<DefenseCell> = Grid::new(W, H);
    resolver.spawn_challenge_line(&mut grid);
    for y in 15..19 {
        grid.fill_row(y, PieceKind::L);
    }

    let outcome = resolver.resolve_clears(&mut grid);
    assert_eq!(outcome.lines, 4);
    assert_eq!(outcome.challenge_lines, 1);
    assert!(outcome.critical);
    assert_eq!(resolver.last_perk_chance(), Some(TETRIS_PERK_CHANCE));
    assert!(!resolver.has_challenge_line());
    assert!(grid.to_bitmap().iter().all(|&c| c == 0));

    let records = resolver.drain_records();
    assert_eq!(records.len(), 5);
    let broken: Vec<_> = records
        .iter()
        .filter(|r| r.shapes.iter().all(|&s| s == PieceKind::Grey))
        .collect();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].row, H - 1);
    assert!(records[0].critical);
    assert_eq!(records[0].row, H - 2);
}

#[test]
fn test_perk_tiers_follow_row_count() {
    let mut resolver = DamageResolver::new(W, H, DamageComposition::PHYSICAL, 4);

    let mut grid = filled(17..20);
    resolver.resolve_clears(&mut grid);
    assert_eq!(resolver.last_perk_chance(), Some(TRIPLE_PERK_CHANCE));

    let mut grid = filled(18..20);
    resolver.resolve_clears(&mut grid);
    assert_eq!(resolver.last_perk_chance(), None);

    let mut grid = filled(16..20);
    resolver.resolve_clears(&mut grid);
    assert_eq!(resolver.last_perk_chance(), Some(TETRIS_PERK_CHANCE));
}

#[test]
fn test_pure_physical_never_creates_elemental_ailments() {
    for seed in 1..64 {
        let mut resolver = DamageResolver::new(W, H, DamageComposition::PHYSICAL, seed);
        let mut grid: Grid<DefenseCell> = Grid::new(W, H);
        resolver.spawn_challenge_line(&mut grid);
        for y in 15..19 {
            grid.fill_row(y, PieceKind::T);
        }
        resolver.resolve_clears(&mut grid);
        for kind in AilmentKind::ALL {
            assert!(resolver.ailments().instances(kind).is_empty(), "seed {seed} {kind:?}");
        }
    }
}

#[test]
fn test_lightning_tetris_can_shock() {
    let split = DamageComposition::single(DamageType::Lightning, 1.0);
    let mut shocked = 0;
    for seed in 1..64 {
        let mut resolver = DamageResolver::new(W, H, split, seed);
        let mut grid = filled(16..20);
        resolver.resolve_clears(&mut grid);

        let records = resolver.drain_records();
        assert!(records.iter().all(|r| r.dominant == DamageType::Lightning));

        if resolver.perks().shock {
            shocked += 1;
            let shock = resolver.ailments().instances(AilmentKind::Shock);
            assert_eq!(shock.len(), 1);
            assert_eq!(shock[0].remaining_ticks, SHOCK_TICKS);
            // lightning / total hp = 1.0, scaled by 0.3
            assert!((resolver.perks().shock_multiplier - 1.3).abs() < 1e-9);
        } else {
            assert_eq!(resolver.perks().shock_multiplier, 1.0);
        }
    }
    assert!(shocked > 0);
}

#[test]
fn test_blanked_challenge_cells_stay_blank() {
    let mut resolver = DamageResolver::new(W, H, DamageComposition::PHYSICAL, 1);
    let mut grid: Grid<DefenseCell> = Grid::new(W, H);
    resolver.spawn_challenge_line(&mut grid);
    let pool = DamageComposition::single(DamageType::Physical, 100.0);

    let (cleared, _) = resolver.deal_damage_to_row(&mut grid, H - 1, pool, CellStatus::Shocked);
    assert!(!cleared);
    assert!(grid
        .row(H - 1)
        .all(|c| c.hit_points == 10 && c.status == CellStatus::Shocked));

    for _ in 0..3 {
        let (cleared, _) = resolver.deal_damage_to_row(&mut grid, H - 1, pool, CellStatus::None);
        assert!(cleared);
        assert!(grid.row(H - 1).all(|c| c.is_blank() && c.hit_points == 0));
    }
    assert_eq!(grid.lowest_y(0), Some((H - 1) as i32));
}
