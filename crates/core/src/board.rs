//! Board module - the playfield grid
//!
//! Column-major storage: each [`Column`] keeps its cells top to bottom plus a
//! cached `lowest_y`, the smallest row holding a solid cell (or `height - 1`
//! when the column is empty). The cache lets the ghost search start next to
//! the stack instead of scanning the whole board.
//!
//! Coordinates: `(x, y)` where x grows to the right and y grows downward.
//! Cells with a negative y are above the visible board; pieces may poke out
//! there while spawning.

use crate::cell::CellKind;
use crate::pieces::Piece;
use crate::types::PieceKind;

/// One board column plus its cached top-of-stack row
#[derive(Debug, Clone, PartialEq)]
pub struct Column<C> {
    cells: Vec<C>,
    lowest_y: i32,
}

impl<C: CellKind> Column<C> {
    fn new(height: usize) -> Self {
        Self {
            cells: vec![C::blank(); height],
            lowest_y: height as i32 - 1,
        }
    }

    fn refresh_lowest_y(&mut self) {
        let height = self.cells.len();
        self.lowest_y = self
            .cells
            .iter()
            .position(|c| c.is_solid())
            .unwrap_or(height.saturating_sub(1)) as i32;
    }

    pub fn cells(&self) -> &[C] {
        &self.cells
    }

    pub fn lowest_y(&self) -> i32 {
        self.lowest_y
    }
}

/// Fixed-size playfield generic over its cell kind
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<C> {
    columns: Vec<Column<C>>,
    width: usize,
    height: usize,
}

impl<C: CellKind> Grid<C> {
    /// Create a new empty grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            columns: (0..width).map(|_| Column::new(height)).collect(),
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn cell(&self, x: i32, y: i32) -> Option<&C> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(&self.columns[x as usize].cells[y as usize])
    }

    pub fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut C> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(&mut self.columns[x as usize].cells[y as usize])
    }

    pub fn occupant(&self, x: i32, y: i32) -> Option<PieceKind> {
        self.cell(x, y).map(|c| c.occupant())
    }

    pub fn column(&self, x: usize) -> Option<&Column<C>> {
        self.columns.get(x)
    }

    /// Cached top-of-stack row of column `x`
    pub fn lowest_y(&self, x: i32) -> Option<i32> {
        if x < 0 {
            return None;
        }
        self.columns.get(x as usize).map(|c| c.lowest_y)
    }

    /// Cells of row `y`, left to right
    pub fn row(&self, y: usize) -> impl Iterator<Item = &C> + '_ {
        self.columns.iter().filter_map(move |col| col.cells.get(y))
    }

    /// Test whether the piece fits with its pivot at `(x, y)`
    ///
    /// Cells above the board are ignored. Any cell outside the columns fails.
    /// A cell below the floor fails, except during a spawn check where only
    /// overlap with occupied on-board cells counts.
    pub fn is_placeable(&self, spawn_check: bool, x: i32, y: i32, piece: Piece) -> bool {
        piece.shape().iter().all(|&(dx, dy)| {
            let cx = x + dx;
            let cy = y + dy;
            if cx < 0 || cx as usize >= self.width {
                return false;
            }
            if cy < 0 {
                return true;
            }
            if cy as usize >= self.height {
                return spawn_check;
            }
            self.columns[cx as usize].cells[cy as usize].is_blank()
        })
    }

    /// Write `value` into the four cells of the piece; off-board cells are skipped
    pub fn paint(&mut self, x: i32, y: i32, piece: Piece, value: PieceKind) {
        for (dx, dy) in piece.shape() {
            if let Some(cell) = self.cell_mut(x + dx, y + dy) {
                cell.paint(value);
            }
        }
    }

    /// Lower each spanned column's cached top after the piece settled
    pub fn commit_lowest_row(&mut self, x: i32, y: i32, piece: Piece) {
        for (dx, dy) in piece.shape() {
            let (cx, cy) = (x + dx, y + dy);
            if !self.in_bounds(cx, cy) {
                continue;
            }
            let column = &mut self.columns[cx as usize];
            column.lowest_y = column.lowest_y.min(cy);
        }
    }

    /// Lowest row the piece reaches by falling straight down from `(x, y)`
    ///
    /// The piece itself must not be painted on the grid.
    pub fn compute_ghost_y(&self, x: i32, y: i32, piece: Piece) -> i32 {
        let shape = piece.shape();

        // Under an overhang the cache says nothing about this piece. A single
        // cell below its column's top already puts the seed above the piece.
        let below_cache = shape.iter().any(|&(dx, dy)| {
            self.lowest_y(x + dx)
                .map(|lowest| y + dy > lowest)
                .unwrap_or(false)
        });
        let seed_top = shape
            .iter()
            .filter_map(|&(dx, _)| self.lowest_y(x + dx))
            .min();

        let Some(top) = seed_top.filter(|_| !below_cache) else {
            return self.scan_down(x, y, piece);
        };

        let mut ghost_y = top - 1 - piece.upper_pivot_dy();
        let mut moved = false;
        while self.is_placeable(false, x, ghost_y + 1, piece) {
            ghost_y += 1;
            moved = true;
        }
        if !moved {
            while ghost_y > y && !self.is_placeable(false, x, ghost_y, piece) {
                ghost_y -= 1;
            }
        }
        ghost_y
    }

    fn scan_down(&self, x: i32, y: i32, piece: Piece) -> i32 {
        let mut ghost_y = y;
        while self.is_placeable(false, x, ghost_y + 1, piece) {
            ghost_y += 1;
        }
        ghost_y
    }

    /// Closed-form resting row on an empty board
    pub fn spawn_pivot_y(&self, piece: Piece) -> i32 {
        self.height as i32 - 1 - piece.upper_pivot_dy()
    }

    /// Every column holds a solid cell
    pub fn is_row_full(&self, y: usize) -> bool {
        y < self.height && self.row(y).all(|c| c.is_solid())
    }

    /// Remove row `y`; rows above move down one and the top row is blanked
    pub fn collapse_row(&mut self, y: usize) {
        if y >= self.height {
            return;
        }
        for column in &mut self.columns {
            column.cells[..=y].rotate_right(1);
            column.cells[0] = C::blank();
            column.refresh_lowest_y();
        }
    }

    /// Move rows `1..=up_to` toward the top by one; row 0 is dropped
    ///
    /// Row `up_to` keeps its old content until the caller overwrites it.
    pub fn raise_rows(&mut self, up_to: usize) {
        if up_to >= self.height {
            return;
        }
        for column in &mut self.columns {
            column.cells[..=up_to].rotate_left(1);
            column.cells[up_to] = column.cells[up_to.saturating_sub(1)].clone();
            column.refresh_lowest_y();
        }
    }

    /// Paint every cell of row `y` with `kind`
    pub fn fill_row(&mut self, y: usize, kind: PieceKind) {
        if y >= self.height {
            return;
        }
        for column in &mut self.columns {
            column.cells[y].paint(kind);
            column.refresh_lowest_y();
        }
    }

    /// Remove every full row, bottom to top; returns how many were removed
    pub fn clear_full_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.height;
        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                self.collapse_row(row);
                cleared += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }

    /// Recompute every column's cached top from the cells
    pub fn refresh_lowest_rows(&mut self) {
        for column in &mut self.columns {
            column.refresh_lowest_y();
        }
    }

    /// Row-major occupant codes
    pub fn to_bitmap(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            out.extend(self.row(y).map(|c| c.occupant().code()));
        }
        out
    }

    /// Occupant codes grouped per row
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.height)
            .map(|y| self.row(y).map(|c| c.occupant().code()).collect())
            .collect()
    }

    /// Build a grid from row-major occupant codes
    ///
    /// Returns `None` when the length does not match or a code is unknown.
    pub fn from_bitmap(width: usize, height: usize, bitmap: &[u8]) -> Option<Self> {
        if bitmap.len() != width * height {
            return None;
        }
        let mut grid = Self::new(width, height);
        for (idx, &code) in bitmap.iter().enumerate() {
            let kind = PieceKind::from_code(code)?;
            let (x, y) = (idx % width, idx / width);
            grid.columns[x].cells[y].paint(kind);
        }
        grid.refresh_lowest_rows();
        Some(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::DefenseCell;
    use crate::types::Rotation;

    fn t_piece() -> Piece {
        Piece::spawn(PieceKind::T)
    }

    #[test]
    fn test_empty_grid_cache() {
        let grid: Grid<PieceKind> = Grid::new(6, 10);
        for x in 0..6 {
            assert_eq!(grid.lowest_y(x), Some(9));
        }
        assert_eq!(grid.lowest_y(6), None);
        assert_eq!(grid.lowest_y(-1), None);
    }

    #[test]
    fn test_placeable_bounds() {
        let grid: Grid<PieceKind> = Grid::new(6, 10);
        // T spawn: cells at (x, y-1), (x, y), (x-1, y), (x+1, y)
        assert!(grid.is_placeable(false, 2, 0, t_piece()));
        assert!(!grid.is_placeable(false, 0, 5, t_piece()));
        assert!(!grid.is_placeable(false, 5, 5, t_piece()));
        assert!(grid.is_placeable(false, 2, 9, t_piece()));
        assert!(!grid.is_placeable(false, 2, 10, t_piece()));
    }

    #[test]
    fn test_spawn_check_skips_floor_range() {
        let grid: Grid<PieceKind> = Grid::new(6, 10);
        assert!(grid.is_placeable(true, 2, 10, t_piece()));
        assert!(!grid.is_placeable(true, -1, 0, t_piece()));
    }

    #[test]
    fn test_paint_and_collision() {
        let mut grid: Grid<PieceKind> = Grid::new(6, 10);
        grid.paint(2, 9, t_piece(), PieceKind::T);
        assert_eq!(grid.occupant(2, 8), Some(PieceKind::T));
        assert_eq!(grid.occupant(1, 9), Some(PieceKind::T));
        assert!(!grid.is_placeable(false, 2, 9, t_piece()));
        assert!(grid.is_placeable(false, 2, 7, t_piece()));
    }

    #[test]
    fn test_paint_skips_cells_above_board() {
        let mut grid: Grid<PieceKind> = Grid::new(6, 10);
        grid.paint(2, 0, t_piece(), PieceKind::T);
        assert_eq!(grid.to_bitmap().iter().filter(|&&c| c != 0).count(), 3);
    }

    #[test]
    fn test_commit_lowest_row_only_decreases() {
        let mut grid: Grid<PieceKind> = Grid::new(6, 10);
        grid.paint(2, 9, t_piece(), PieceKind::T);
        grid.commit_lowest_row(2, 9, t_piece());
        assert_eq!(grid.lowest_y(1), Some(9));
        assert_eq!(grid.lowest_y(2), Some(8));
        assert_eq!(grid.lowest_y(3), Some(9));

        grid.commit_lowest_row(2, 9, t_piece());
        assert_eq!(grid.lowest_y(2), Some(8));
    }

    #[test]
    fn test_ghost_on_empty_board_matches_closed_form() {
        let grid: Grid<PieceKind> = Grid::new(10, 20);
        for kind in PieceKind::PLAYABLE {
            for rotation in [Rotation::O, Rotation::R, Rotation::Z, Rotation::L] {
                let piece = Piece::new(kind, rotation);
                assert_eq!(
                    grid.compute_ghost_y(4, 1, piece),
                    grid.spawn_pivot_y(piece),
                    "{kind:?} {rotation:?}"
                );
            }
        }
    }

    #[test]
    fn test_ghost_rests_on_stack() {
        let mut grid: Grid<PieceKind> = Grid::new(6, 10);
        grid.paint(2, 9, t_piece(), PieceKind::T);
        grid.commit_lowest_row(2, 9, t_piece());
        assert_eq!(grid.compute_ghost_y(2, 0, t_piece()), 7);
        assert_eq!(grid.compute_ghost_y(4, 0, t_piece()), 8);
    }

    #[test]
    fn test_ghost_under_overhang_scans_linearly() {
        // Column 2 has a single cell at row 3; the piece is already below it.
        let mut grid: Grid<PieceKind> = Grid::new(6, 10);
        if let Some(cell) = grid.cell_mut(2, 3) {
            cell.paint(PieceKind::I);
        }
        grid.refresh_lowest_rows();
        let vertical_i = Piece::new(PieceKind::I, Rotation::R);
        // I at R spans rows y-1..=y+2 in the pivot column.
        assert!(grid.is_placeable(false, 2, 5, vertical_i));
        assert_eq!(grid.compute_ghost_y(2, 5, vertical_i), 7);
    }

    #[test]
    fn test_ghost_with_one_cell_under_overhang() {
        // Only column 1 has a top above the piece; columns 2 and 3 are open.
        let mut grid: Grid<PieceKind> = Grid::new(6, 10);
        if let Some(cell) = grid.cell_mut(1, 3) {
            cell.paint(PieceKind::I);
        }
        grid.refresh_lowest_rows();
        assert!(grid.is_placeable(false, 2, 5, t_piece()));
        assert_eq!(grid.compute_ghost_y(2, 5, t_piece()), 9);
    }

    #[test]
    fn test_paint_erase_round_trip() {
        let mut grid: Grid<DefenseCell> = Grid::new(6, 10);
        grid.fill_row(9, PieceKind::Grey);
        grid.paint(2, 7, t_piece(), PieceKind::T);
        let before = grid.clone();

        grid.paint(2, 7, t_piece(), PieceKind::Blank);
        assert_ne!(grid, before);
        grid.paint(2, 7, t_piece(), PieceKind::T);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_collapse_row_shifts_down() {
        let mut grid: Grid<PieceKind> = Grid::new(3, 4);
        let bitmap = [
            0, 0, 0, //
            2, 0, 0, //
            3, 3, 3, //
            0, 4, 0, //
        ];
        let mut grid_from = Grid::<PieceKind>::from_bitmap(3, 4, &bitmap).unwrap();
        grid_from.collapse_row(2);
        assert_eq!(
            grid_from.to_bitmap(),
            vec![0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 4, 0]
        );
        assert_eq!(grid_from.lowest_y(0), Some(2));
        assert_eq!(grid_from.lowest_y(1), Some(3));
        assert_eq!(grid_from.lowest_y(2), Some(3));

        // Out of range is a no-op.
        grid.collapse_row(10);
        assert_eq!(grid, Grid::new(3, 4));
    }

    #[test]
    fn test_raise_rows_drops_top() {
        let bitmap = [
            1, 0, 0, //
            0, 2, 0, //
            0, 0, 3, //
        ];
        let mut grid = Grid::<PieceKind>::from_bitmap(3, 3, &bitmap).unwrap();
        grid.raise_rows(2);
        grid.fill_row(2, PieceKind::Grey);
        assert_eq!(grid.to_bitmap(), vec![0, 2, 0, 0, 0, 3, 8, 8, 8]);
        assert_eq!(grid.lowest_y(0), Some(2));
        assert_eq!(grid.lowest_y(1), Some(0));
    }

    #[test]
    fn test_clear_full_rows() {
        let bitmap = [
            0, 5, 0, //
            1, 1, 1, //
            2, 0, 2, //
            3, 3, 3, //
        ];
        let mut grid = Grid::<PieceKind>::from_bitmap(3, 4, &bitmap).unwrap();
        assert_eq!(grid.clear_full_rows(), 2);
        assert_eq!(grid.to_bitmap(), vec![0, 0, 0, 0, 0, 0, 0, 5, 0, 2, 0, 2]);
    }

    #[test]
    fn test_ghost_cells_do_not_complete_rows() {
        let bitmap = [9, 9, 9, 3, 3, 3];
        let grid = Grid::<PieceKind>::from_bitmap(3, 2, &bitmap).unwrap();
        assert!(!grid.is_row_full(0));
        assert!(grid.is_row_full(1));
        assert_eq!(grid.lowest_y(0), Some(1));
    }

    #[test]
    fn test_from_bitmap_rejects_bad_input() {
        assert!(Grid::<PieceKind>::from_bitmap(3, 3, &[0; 8]).is_none());
        assert!(Grid::<PieceKind>::from_bitmap(1, 1, &[42]).is_none());
    }
}
