//! Line clearing
//!
//! [`ClearStrategy`] is the seam between the session and the rule set: the
//! classic engine removes full rows outright, while the extended variant turns
//! them into damage (see [`crate::damage`]).

use crate::board::Grid;
use crate::cell::CellKind;
use crate::types::PieceKind;

/// What happened to the board after a lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearOutcome {
    /// Rows formed by settled pieces that were removed
    pub lines: u32,
    /// Challenge rows destroyed as a side effect
    pub challenge_lines: u32,
    /// Any removed row was critical
    pub critical: bool,
}

/// Resolves completed rows after a piece locks
pub trait ClearStrategy {
    type Cell: CellKind;

    fn resolve_clears(&mut self, grid: &mut Grid<Self::Cell>) -> ClearOutcome;
}

/// Classic removal: every full row goes, rows above fall
#[derive(Debug, Clone, Copy, Default)]
pub struct LineClearEngine;

impl ClearStrategy for LineClearEngine {
    type Cell = PieceKind;

    fn resolve_clears(&mut self, grid: &mut Grid<PieceKind>) -> ClearOutcome {
        let lines = grid.clear_full_rows() as u32;
        ClearOutcome {
            lines,
            ..ClearOutcome::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_clear_counts_rows() {
        let bitmap = [
            0, 0, 0, 0, //
            1, 1, 1, 1, //
            2, 0, 2, 2, //
            3, 3, 3, 3, //
        ];
        let mut grid = Grid::<PieceKind>::from_bitmap(4, 4, &bitmap).unwrap();
        let outcome = LineClearEngine.resolve_clears(&mut grid);
        assert_eq!(outcome.lines, 2);
        assert_eq!(outcome.challenge_lines, 0);
        assert!(!grid.is_row_full(3));
        assert_eq!(grid.occupant(1, 3), Some(PieceKind::Blank));
        assert_eq!(grid.occupant(0, 3), Some(PieceKind::I));
    }

    #[test]
    fn classic_clear_without_full_rows_is_noop() {
        let mut grid = Grid::<PieceKind>::new(4, 4);
        let before = grid.clone();
        assert_eq!(LineClearEngine.resolve_clears(&mut grid), ClearOutcome::default());
        assert_eq!(grid, before);
    }
}
