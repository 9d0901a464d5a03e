//! Snapshots - the read-only view produced after every external call

use crate::board::Grid;
use crate::cell::{CellKind, DefenseCell, Resistances};
use crate::damage::ClearRecord;
use crate::types::{CellStatus, PieceKind, Rotation, Variant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i32,
    pub y: i32,
}

/// Fields shared by both rule sets
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SessionSnapshot {
    pub active: ActiveSnapshot,
    pub ghost_y: i32,
    pub held: Option<PieceKind>,
    pub can_hold: bool,
    pub queue: Vec<PieceKind>,
    pub game_over: bool,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    /// Milliseconds to wait before the next automatic `TickDown`
    pub tick_interval_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClassicSnapshot {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub session: SessionSnapshot,
    /// Occupant codes, one row per entry, top row first
    pub board: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CellSnapshot {
    pub occupant: u8,
    pub hit_points: i32,
    pub defense: Resistances,
    pub status: CellStatus,
}

impl From<&DefenseCell> for CellSnapshot {
    fn from(cell: &DefenseCell) -> Self {
        Self {
            occupant: cell.occupant().code(),
            hit_points: cell.hit_points,
            defense: cell.defense,
            status: cell.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ExtendedSnapshot {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub session: SessionSnapshot,
    pub board: Vec<Vec<CellSnapshot>>,
    /// Row of the challenge line; equals the board height while none exists
    pub challenge_line: usize,
    /// Rows cleared since the previous snapshot
    pub clear_records: Vec<ClearRecord>,
}

/// Snapshot of either rule set
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "variant", rename_all = "lowercase"))]
pub enum Snapshot {
    Classic(ClassicSnapshot),
    Extended(ExtendedSnapshot),
}

impl Snapshot {
    pub fn variant(&self) -> Variant {
        match self {
            Snapshot::Classic(_) => Variant::Classic,
            Snapshot::Extended(_) => Variant::Extended,
        }
    }

    pub fn session(&self) -> &SessionSnapshot {
        match self {
            Snapshot::Classic(s) => &s.session,
            Snapshot::Extended(s) => &s.session,
        }
    }

    /// Occupant codes regardless of variant
    pub fn board_codes(&self) -> Vec<Vec<u8>> {
        match self {
            Snapshot::Classic(s) => s.board.clone(),
            Snapshot::Extended(s) => s
                .board
                .iter()
                .map(|row| row.iter().map(|c| c.occupant).collect())
                .collect(),
        }
    }

    pub fn tick_interval_ms(&self) -> u32 {
        self.session().tick_interval_ms
    }

    pub fn game_over(&self) -> bool {
        self.session().game_over
    }
}

pub(crate) fn extended_board(grid: &Grid<DefenseCell>) -> Vec<Vec<CellSnapshot>> {
    (0..grid.height())
        .map(|y| grid.row(y).map(CellSnapshot::from).collect())
        .collect()
}
