//! Session construction parameters

use crate::damage::DamageComposition;
use crate::types::{PieceKind, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH};

/// Everything a session needs at construction
///
/// ```
/// use nemein_core::SessionConfig;
/// use nemein_types::PieceKind;
///
/// let config = SessionConfig::new(6, 10)
///     .with_piece_override(PieceKind::T)
///     .with_zero_tick_interval();
/// assert_eq!(config.width, 6);
/// assert!(config.zero_tick_interval);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub width: usize,
    pub height: usize,
    /// Every generated piece uses this shape (tests/debugging)
    pub piece_override: Option<PieceKind>,
    /// Report a zero tick interval outside lock delay (tests/debugging)
    pub zero_tick_interval: bool,
    pub seed: u32,
    /// Channel split of line damage in the extended variant
    pub damage_split: DamageComposition,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            piece_override: None,
            zero_tick_interval: false,
            seed: 1,
            damage_split: DamageComposition::PHYSICAL,
        }
    }
}

impl SessionConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_piece_override(mut self, kind: PieceKind) -> Self {
        self.piece_override = Some(kind);
        self
    }

    pub fn with_zero_tick_interval(mut self) -> Self {
        self.zero_tick_interval = true;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_damage_split(mut self, split: DamageComposition) -> Self {
        self.damage_split = split;
        self
    }

    /// Column where new pieces appear
    pub fn spawn_column(&self) -> i32 {
        (self.width.saturating_sub(1) / 2) as i32
    }
}
