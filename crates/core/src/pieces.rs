//! Pieces module - shape offsets and wall kick tables
//!
//! Every piece is a pivot `(x, y)` plus four offsets. Offset index 1 is the
//! upper pivot: the lowest cell of the shape, used to seat a piece that enters
//! empty space. Rows grow downward, so kick offsets with a positive `dy` push
//! the piece toward the floor.

use arrayvec::ArrayVec;

use crate::types::{PieceKind, RotateDirection, Rotation};

/// Offset of a single cell relative to the pivot
pub type MinoOffset = (i32, i32);

/// The four cell offsets of a piece
pub type PieceShape = [MinoOffset; 4];

/// Ordered kick candidates for one rotation attempt
pub type KickList = ArrayVec<MinoOffset, 5>;

/// Kick table indexed by `from_rotation * 2 + direction`
pub type KickTable = [[MinoOffset; 5]; 8];

/// Index of the upper pivot inside a [`PieceShape`]
pub const UPPER_PIVOT_INDEX: usize = 1;

/// A shape in a given rotation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Piece {
    pub kind: PieceKind,
    pub rotation: Rotation,
}

impl Piece {
    pub fn new(kind: PieceKind, rotation: Rotation) -> Self {
        Self { kind, rotation }
    }

    /// Piece in its spawn rotation
    pub fn spawn(kind: PieceKind) -> Self {
        Self::new(kind, Rotation::O)
    }

    pub fn rotated(self, direction: RotateDirection) -> Self {
        Self::new(self.kind, self.rotation.rotate(direction))
    }

    pub fn shape(&self) -> PieceShape {
        coordinates_of(self.kind, self.rotation)
    }

    /// Vertical offset of the upper pivot
    pub fn upper_pivot_dy(&self) -> i32 {
        self.shape()[UPPER_PIVOT_INDEX].1
    }
}

const PLACEHOLDER: PieceShape = [(0, 0); 4];

const SQUARE: PieceShape = [(0, -1), (1, 0), (0, 0), (1, -1)];

const I_SHAPES: [PieceShape; 4] = [
    [(1, 0), (0, 0), (-1, 0), (2, 0)],
    [(0, -1), (0, 2), (0, 0), (0, 1)],
    [(-1, 0), (0, 0), (-2, 0), (1, 0)],
    [(0, -2), (0, 1), (0, 0), (0, -1)],
];

const T_SHAPES: [PieceShape; 4] = [
    [(0, -1), (0, 0), (-1, 0), (1, 0)],
    [(0, -1), (0, 1), (0, 0), (1, 0)],
    [(0, 0), (0, 1), (-1, 0), (1, 0)],
    [(0, -1), (0, 1), (-1, 0), (0, 0)],
];

const J_SHAPES: [PieceShape; 4] = [
    [(-1, -1), (0, 0), (-1, 0), (1, 0)],
    [(0, -1), (0, 1), (0, 0), (1, -1)],
    [(0, 0), (1, 1), (-1, 0), (1, 0)],
    [(0, -1), (0, 1), (-1, 1), (0, 0)],
];

const L_SHAPES: [PieceShape; 4] = [
    [(1, -1), (0, 0), (-1, 0), (1, 0)],
    [(0, -1), (0, 1), (0, 0), (1, 1)],
    [(0, 0), (-1, 1), (-1, 0), (1, 0)],
    [(0, -1), (0, 1), (-1, -1), (0, 0)],
];

const Z_SHAPES: [PieceShape; 4] = [
    [(0, -1), (0, 0), (-1, -1), (1, 0)],
    [(1, -1), (0, 1), (0, 0), (1, 0)],
    [(0, 0), (0, 1), (-1, 0), (1, 1)],
    [(0, -1), (-1, 1), (-1, 0), (0, 0)],
];

const S_SHAPES: [PieceShape; 4] = [
    [(0, -1), (0, 0), (-1, 0), (1, -1)],
    [(0, -1), (1, 1), (0, 0), (1, 0)],
    [(0, 0), (0, 1), (-1, 1), (1, 0)],
    [(-1, -1), (0, 1), (-1, 0), (0, 0)],
];

/// Get the cell offsets for a shape and rotation
///
/// Placeholder shapes (blank, grey, ghost) collapse onto the pivot.
pub fn coordinates_of(kind: PieceKind, rotation: Rotation) -> PieceShape {
    let r = rotation.index();
    match kind {
        PieceKind::O => SQUARE,
        PieceKind::I => I_SHAPES[r],
        PieceKind::T => T_SHAPES[r],
        PieceKind::J => J_SHAPES[r],
        PieceKind::L => L_SHAPES[r],
        PieceKind::Z => Z_SHAPES[r],
        PieceKind::S => S_SHAPES[r],
        PieceKind::Blank | PieceKind::Grey | PieceKind::Ghost => PLACEHOLDER,
    }
}

/// JLSTZ kick table (shared by J, L, S, T, Z)
const JLSTZ_KICKS: KickTable = [
    // O->R
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // O->L
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // R->Z
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // R->O
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // Z->L
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // Z->R
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    // L->O
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // L->Z
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

/// I piece kick table (larger horizontal reach)
const I_KICKS: KickTable = [
    // O->R
    [(1, 0), (-1, 0), (2, 0), (-1, -1), (2, -2)],
    // O->L
    [(0, 1), (-1, 1), (2, 1), (-1, -1), (2, 2)],
    // R->Z
    [(0, 1), (-1, 1), (2, 1), (-2, -1), (2, 2)],
    // R->O
    [(-1, 0), (1, 0), (-2, 0), (1, 1), (-2, 2)],
    // Z->L
    [(-1, 0), (1, 0), (-2, 0), (1, -1), (-2, 2)],
    // Z->R
    [(0, -1), (1, -1), (-2, -1), (2, 1), (-2, -2)],
    // L->O
    [(0, -1), (1, -1), (-2, -1), (1, 1), (-2, -2)],
    // L->Z
    [(1, 0), (-1, 0), (2, 0), (-1, 1), (2, -2)],
];

/// Candidates T can never resolve to: (from rotation, kick index)
const T_EXCLUDED_KICKS: [(Rotation, usize); 2] = [(Rotation::O, 3), (Rotation::Z, 2)];

/// Get the kick table for a shape, if it rotates through one
pub fn get_kick_table(kind: PieceKind) -> Option<&'static KickTable> {
    match kind {
        PieceKind::I => Some(&I_KICKS),
        PieceKind::T | PieceKind::J | PieceKind::L | PieceKind::Z | PieceKind::S => {
            Some(&JLSTZ_KICKS)
        }
        _ => None,
    }
}

/// Ordered kick candidates for rotating `kind` away from `from`
///
/// - square: a single `(0, 0)`
/// - I: five entries from its own table
/// - T: the shared table minus its unreachable candidate for `O` and `Z`
/// - J, L, S, Z: five entries from the shared table
/// - placeholders: empty
pub fn wall_kick_offsets(kind: PieceKind, from: Rotation, direction: RotateDirection) -> KickList {
    let mut out = KickList::new();
    if kind == PieceKind::O {
        out.push((0, 0));
        return out;
    }
    let Some(table) = get_kick_table(kind) else {
        return out;
    };

    let row = &table[from.index() * 2 + direction.index()];
    let skip = if kind == PieceKind::T {
        T_EXCLUDED_KICKS
            .iter()
            .find(|(rotation, _)| *rotation == from)
            .map(|&(_, idx)| idx)
    } else {
        None
    };

    for (idx, &offset) in row.iter().enumerate() {
        if Some(idx) != skip {
            out.push(offset);
        }
    }
    out
}

/// Try to rotate a piece, testing kicks in order
///
/// Returns the rotated piece and its new pivot for the first candidate that
/// `is_placeable` accepts, or `None` when every candidate is blocked.
pub fn try_rotate(
    piece: Piece,
    x: i32,
    y: i32,
    direction: RotateDirection,
    is_placeable: impl Fn(Piece, i32, i32) -> bool,
) -> Option<(Piece, i32, i32)> {
    let rotated = piece.rotated(direction);
    wall_kick_offsets(piece.kind, piece.rotation, direction)
        .into_iter()
        .map(|(dx, dy)| (x + dx, y + dy))
        .find(|&(nx, ny)| is_placeable(rotated, nx, ny))
        .map(|(nx, ny)| (rotated, nx, ny))
}
