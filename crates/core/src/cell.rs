//! Cell kinds stored in the playfield
//!
//! The classic variant only needs to know what occupies a cell, so a bare
//! [`PieceKind`] is its cell. The extended variant tracks hit points,
//! resistances and a status tag per cell.

use crate::types::{CellStatus, DamageType, PieceKind};

/// Hit points of a cell left by a settled piece
pub const CELL_HP: i32 = 10;

/// Hit points of a challenge-line cell
pub const CHALLENGE_CELL_HP: i32 = 20;

/// Storage requirements of a grid cell
pub trait CellKind: Clone + std::fmt::Debug + PartialEq {
    fn blank() -> Self;

    fn occupant(&self) -> PieceKind;

    /// Overwrite the cell with a shape (drawing, erasing, locking)
    fn paint(&mut self, kind: PieceKind);

    fn is_blank(&self) -> bool {
        self.occupant() == PieceKind::Blank
    }

    /// Part of the settled stack (not blank, not ghost)
    fn is_solid(&self) -> bool {
        self.occupant().is_solid()
    }
}

impl CellKind for PieceKind {
    fn blank() -> Self {
        PieceKind::Blank
    }

    fn occupant(&self) -> PieceKind {
        *self
    }

    fn paint(&mut self, kind: PieceKind) {
        *self = kind;
    }
}

/// Resistance percentages per damage channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resistances {
    pub physical: i32,
    pub fire: i32,
    pub cold: i32,
    pub lightning: i32,
}

impl Resistances {
    pub fn get(&self, damage_type: DamageType) -> i32 {
        match damage_type {
            DamageType::Physical => self.physical,
            DamageType::Fire => self.fire,
            DamageType::Cold => self.cold,
            DamageType::Lightning => self.lightning,
        }
    }
}

/// Extended-variant cell
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DefenseCell {
    pub occupant: PieceKind,
    pub hit_points: i32,
    pub defense: Resistances,
    pub status: CellStatus,
}

impl DefenseCell {
    /// Fresh challenge-line cell: full hit points, no resistances
    pub fn challenge() -> Self {
        Self {
            occupant: PieceKind::Grey,
            hit_points: CHALLENGE_CELL_HP,
            defense: Resistances::default(),
            status: CellStatus::None,
        }
    }
}

impl CellKind for DefenseCell {
    fn blank() -> Self {
        Self::default()
    }

    fn occupant(&self) -> PieceKind {
        self.occupant
    }

    fn paint(&mut self, kind: PieceKind) {
        *self = match kind {
            PieceKind::Grey => Self::challenge(),
            k if k.is_tetromino() => Self {
                occupant: k,
                hit_points: CELL_HP,
                ..Self::default()
            },
            k => Self {
                occupant: k,
                ..Self::default()
            },
        };
    }
}
