//! Core types module - shared data structures and constants
//!
//! Plain data used by the rules engine and the transport layer. Nothing in here
//! owns game state; enable the `serde` feature to get wire derives.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns by default (indexed left to right)
//! - **Height**: 20 rows by default (row 0 is the top)
//! - **Spawn column**: `(width - 1) / 2`, spawn row 0, rotation `O`
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_TICK_INTERVAL_MS` | 1000 | Interval at level 0 / without ailments |
//! | `LOCK_DELAY_MS` | 500 | Interval floor while a grounded piece waits to lock |
//! | `EARLY_LEVEL_DECREASE_MS` | 60 | Interval shaved off per level |
//! | `INTERVAL_CAP_MS` | 900 | Largest early-level decrease |
//! | `LATE_LEVEL_DIVISOR` | 2 | Past the cap, each level removes 1/2 ms |
//!
//! # Piece Codes
//!
//! Every shape has a stable numeric code used in bitmaps and snapshots:
//!
//! | Shape | Code |
//! |-------|------|
//! | Blank | 0 |
//! | O (square) | 1 |
//! | I | 2 |
//! | T | 3 |
//! | J | 4 |
//! | L | 5 |
//! | Z | 6 |
//! | S | 7 |
//! | Grey (challenge line) | 8 |
//! | Ghost | 9 |
//!
//! # Examples
//!
//! ```
//! use nemein_types::{Command, PieceKind, Rotation, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH};
//!
//! let piece = PieceKind::from_str("t").unwrap();
//! assert_eq!(piece, PieceKind::T);
//! assert_eq!(piece.code(), 3);
//!
//! assert_eq!(Rotation::O.rotate_cw(), Rotation::R);
//!
//! assert_eq!(Command::from_str("hardDrop"), Some(Command::HardDrop));
//!
//! assert_eq!(DEFAULT_BOARD_WIDTH, 10);
//! assert_eq!(DEFAULT_BOARD_HEIGHT, 20);
//! ```

/// Default board width in cells
pub const DEFAULT_BOARD_WIDTH: usize = 10;

/// Default board height in cells
pub const DEFAULT_BOARD_HEIGHT: usize = 20;

/// Number of upcoming pieces kept visible in the queue
pub const QUEUE_LOOKAHEAD: usize = 6;

/// Tick interval at the start of a game
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 1000;

/// Interval floor applied while lock delay is armed
pub const LOCK_DELAY_MS: u32 = 500;

/// Interval removed per level until `INTERVAL_CAP_MS` is reached
pub const EARLY_LEVEL_DECREASE_MS: u32 = 60;

/// Largest decrease reachable through the early-level slope
pub const INTERVAL_CAP_MS: u32 = 900;

/// Past the cap, each level removes `1 / LATE_LEVEL_DIVISOR` ms
pub const LATE_LEVEL_DIVISOR: u32 = 2;

/// Locked pieces per classic level
pub const LEVEL_UP_TETROMINO_COUNT: u32 = 10;

/// Ticks between challenge lines at level 1
pub const TICKS_PER_CHALLENGE_LINE: u32 = 10;

/// Scales the extended-variant level threshold (`1000 * L(L+1)/2` with the defaults)
pub const LEVEL_GOAL_MULTIPLIER: u32 = 10;

/// Extended line values for 0..=4 rows, multiplied by level
pub const LINE_VALUES: [u32; 5] = [0, 100, 300, 500, 800];

/// Extended T-spin values for 0..=3 rows, multiplied by level
pub const TSPIN_VALUES: [u32; 4] = [400, 800, 1200, 1600];

/// Consecutive tetris bonus numerator (3/2 = 1.5x)
pub const B2B_NUMERATOR: u32 = 3;

/// Consecutive tetris bonus denominator
pub const B2B_DENOMINATOR: u32 = 2;

/// Every shape a cell or piece can hold
///
/// - **O**: 2x2 square, never changes on rotation
/// - **I**: vertical/horizontal bar with its own kick table
/// - **T, J, L, Z, S**: share the standard kick table (T drops two candidates)
/// - **Blank**: empty cell
/// - **Grey**: challenge-line cell, never an active piece
/// - **Ghost**: drop preview, only ever painted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PieceKind {
    #[default]
    Blank,
    O,
    I,
    T,
    J,
    L,
    Z,
    S,
    Grey,
    Ghost,
}

impl PieceKind {
    /// Shapes the queue may hand out
    pub const PLAYABLE: [PieceKind; 7] = [
        PieceKind::O,
        PieceKind::I,
        PieceKind::T,
        PieceKind::J,
        PieceKind::L,
        PieceKind::Z,
        PieceKind::S,
    ];

    /// Stable numeric code
    ///
    /// ```
    /// use nemein_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::Blank.code(), 0);
    /// assert_eq!(PieceKind::Grey.code(), 8);
    /// assert_eq!(PieceKind::Ghost.code(), 9);
    /// ```
    pub fn code(&self) -> u8 {
        match self {
            PieceKind::Blank => 0,
            PieceKind::O => 1,
            PieceKind::I => 2,
            PieceKind::T => 3,
            PieceKind::J => 4,
            PieceKind::L => 5,
            PieceKind::Z => 6,
            PieceKind::S => 7,
            PieceKind::Grey => 8,
            PieceKind::Ghost => 9,
        }
    }

    /// Inverse of [`PieceKind::code`]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PieceKind::Blank),
            1 => Some(PieceKind::O),
            2 => Some(PieceKind::I),
            3 => Some(PieceKind::T),
            4 => Some(PieceKind::J),
            5 => Some(PieceKind::L),
            6 => Some(PieceKind::Z),
            7 => Some(PieceKind::S),
            8 => Some(PieceKind::Grey),
            9 => Some(PieceKind::Ghost),
            _ => None,
        }
    }

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use nemein_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("Grey"), Some(PieceKind::Grey));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blank" => Some(PieceKind::Blank),
            "o" => Some(PieceKind::O),
            "i" => Some(PieceKind::I),
            "t" => Some(PieceKind::T),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            "z" => Some(PieceKind::Z),
            "s" => Some(PieceKind::S),
            "grey" => Some(PieceKind::Grey),
            "ghost" => Some(PieceKind::Ghost),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::Blank => "blank",
            PieceKind::O => "o",
            PieceKind::I => "i",
            PieceKind::T => "t",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::Z => "z",
            PieceKind::S => "s",
            PieceKind::Grey => "grey",
            PieceKind::Ghost => "ghost",
        }
    }

    /// One of the seven playable shapes
    pub fn is_tetromino(&self) -> bool {
        !matches!(self, PieceKind::Blank | PieceKind::Grey | PieceKind::Ghost)
    }

    /// Cell left behind by a settled piece or a challenge line
    pub fn is_solid(&self) -> bool {
        !matches!(self, PieceKind::Blank | PieceKind::Ghost)
    }
}

/// Rotation states
///
/// - **O**: spawn orientation
/// - **R**: rotated 90° clockwise
/// - **Z**: rotated 180°
/// - **L**: rotated 90° counter-clockwise
///
/// The rotation cycle goes: O → R → Z → L → O
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    O,
    R,
    Z,
    L,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use nemein_types::Rotation;
    ///
    /// assert_eq!(Rotation::O.rotate_cw(), Rotation::R);
    /// assert_eq!(Rotation::R.rotate_cw(), Rotation::Z);
    /// assert_eq!(Rotation::Z.rotate_cw(), Rotation::L);
    /// assert_eq!(Rotation::L.rotate_cw(), Rotation::O);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::O => Rotation::R,
            Rotation::R => Rotation::Z,
            Rotation::Z => Rotation::L,
            Rotation::L => Rotation::O,
        }
    }

    /// Rotate counter-clockwise (-90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use nemein_types::Rotation;
    ///
    /// assert_eq!(Rotation::O.rotate_ccw(), Rotation::L);
    /// assert_eq!(Rotation::L.rotate_ccw(), Rotation::Z);
    /// ```
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::O => Rotation::L,
            Rotation::L => Rotation::Z,
            Rotation::Z => Rotation::R,
            Rotation::R => Rotation::O,
        }
    }

    /// Rotate in the given direction
    pub fn rotate(&self, direction: RotateDirection) -> Self {
        match direction {
            RotateDirection::Clockwise => self.rotate_cw(),
            RotateDirection::Counterclockwise => self.rotate_ccw(),
        }
    }

    /// Table index (O=0, R=1, Z=2, L=3)
    pub fn index(&self) -> usize {
        match self {
            Rotation::O => 0,
            Rotation::R => 1,
            Rotation::Z => 2,
            Rotation::L => 3,
        }
    }

    /// Parse rotation from its single-letter name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "o" => Some(Rotation::O),
            "r" => Some(Rotation::R),
            "z" => Some(Rotation::Z),
            "l" => Some(Rotation::L),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::O => "O",
            Rotation::R => "R",
            Rotation::Z => "Z",
            Rotation::L => "L",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotateDirection {
    Clockwise,
    Counterclockwise,
}

impl RotateDirection {
    /// Column index into the kick tables (CW=0, CCW=1)
    pub fn index(&self) -> usize {
        match self {
            RotateDirection::Clockwise => 0,
            RotateDirection::Counterclockwise => 1,
        }
    }
}

/// Symbolic commands understood by a game session
///
/// Translating physical keys to these symbols happens outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Command {
    /// Move piece one column left
    MoveLeft,
    /// Move piece one column right
    MoveRight,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Player-initiated one-row descent
    SoftDrop,
    /// Scheduler-initiated one-row descent; advances the tick counter
    TickDown,
    /// Snap to the ghost row and lock
    HardDrop,
    /// Swap with the held piece (once per piece)
    Hold,
}

impl Command {
    /// Parse command from string (for the transport layer)
    ///
    /// # Examples
    ///
    /// ```
    /// use nemein_types::Command;
    ///
    /// assert_eq!(Command::from_str("moveLeft"), Some(Command::MoveLeft));
    /// assert_eq!(Command::from_str("rotatecw"), Some(Command::RotateCw));
    /// assert_eq!(Command::from_str("tickDown"), Some(Command::TickDown));
    /// assert_eq!(Command::from_str("jump"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(Command::MoveLeft),
            "moveright" => Some(Command::MoveRight),
            "rotatecw" => Some(Command::RotateCw),
            "rotateccw" => Some(Command::RotateCcw),
            "softdrop" => Some(Command::SoftDrop),
            "tickdown" => Some(Command::TickDown),
            "harddrop" => Some(Command::HardDrop),
            "hold" => Some(Command::Hold),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::MoveLeft => "moveLeft",
            Command::MoveRight => "moveRight",
            Command::RotateCw => "rotateCw",
            Command::RotateCcw => "rotateCcw",
            Command::SoftDrop => "softDrop",
            Command::TickDown => "tickDown",
            Command::HardDrop => "hardDrop",
            Command::Hold => "hold",
        }
    }

    /// Commands that attempt a one-row descent
    pub fn is_descent(&self) -> bool {
        matches!(self, Command::SoftDrop | Command::TickDown)
    }
}

/// Damage channels of the extended variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DamageType {
    Physical,
    Fire,
    Cold,
    Lightning,
}

impl DamageType {
    /// Iteration order; also the tie-break order for "dominant" damage
    pub const ALL: [DamageType; 4] = [
        DamageType::Physical,
        DamageType::Fire,
        DamageType::Cold,
        DamageType::Lightning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DamageType::Physical => "physical",
            DamageType::Fire => "fire",
            DamageType::Cold => "cold",
            DamageType::Lightning => "lightning",
        }
    }
}

/// Last effect that touched a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CellStatus {
    #[default]
    None,
    Impaled,
    Ignited,
    Chilled,
    Frozen,
    Shocked,
}

/// Rule set selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Variant {
    Classic,
    Extended,
}

impl Variant {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Variant::Classic),
            "extended" => Some(Variant::Extended),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Extended => "extended",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_codes_round_trip() {
        for code in 0..=9u8 {
            let kind = PieceKind::from_code(code).unwrap();
            assert_eq!(kind.code(), code);
        }
        assert_eq!(PieceKind::from_code(10), None);
    }

    #[test]
    fn solid_and_tetromino_classification() {
        assert!(!PieceKind::Blank.is_solid());
        assert!(!PieceKind::Ghost.is_solid());
        assert!(PieceKind::Grey.is_solid());
        assert!(!PieceKind::Grey.is_tetromino());
        for kind in PieceKind::PLAYABLE {
            assert!(kind.is_tetromino());
            assert!(kind.is_solid());
        }
    }

    #[test]
    fn command_strings_round_trip() {
        let all = [
            Command::MoveLeft,
            Command::MoveRight,
            Command::RotateCw,
            Command::RotateCcw,
            Command::SoftDrop,
            Command::TickDown,
            Command::HardDrop,
            Command::Hold,
        ];
        for cmd in all {
            assert_eq!(Command::from_str(cmd.as_str()), Some(cmd));
        }
    }

    #[test]
    fn rotation_cw_then_ccw_is_identity() {
        for r in [Rotation::O, Rotation::R, Rotation::Z, Rotation::L] {
            assert_eq!(r.rotate_cw().rotate_ccw(), r);
            assert_eq!(r.rotate(RotateDirection::Clockwise), r.rotate_cw());
        }
    }
}
