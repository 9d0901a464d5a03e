//! Core rules engine - pure, deterministic, and testable
//!
//! This crate holds every game rule of both rule sets. It has no I/O and no
//! timers: the driver asks for [`GameSession::tick_interval_ms`] and issues
//! `TickDown` itself.
//!
//! # Module Structure
//!
//! - [`pieces`]: shape offsets and wall-kick candidates
//! - [`queue`]: upcoming pieces and the hold slot
//! - [`board`]: the grid, collision, ghost search and row shifts
//! - [`cell`]: classic and extended cell kinds
//! - [`clear`]: the clear strategy seam and classic line removal
//! - [`damage`]: challenge line, damage pools, perks and ailments
//! - [`scoring`]: points, levels and pacing
//! - [`rules`]: the two rule sets a session is generic over
//! - [`session`]: the command-driven state machine
//! - [`snapshot`]: the read-only view returned by every call
//!
//! # Example
//!
//! ```
//! use nemein_core::{ExtendedSession, SessionConfig, Snapshot};
//! use nemein_types::Command;
//!
//! let mut session = ExtendedSession::new(SessionConfig::default().with_seed(7));
//! let snapshot = session.apply_command(Command::TickDown).unwrap();
//! assert!(matches!(snapshot, Snapshot::Extended(_)));
//! assert!(!snapshot.game_over());
//! ```

pub mod board;
pub mod cell;
pub mod clear;
pub mod config;
pub mod damage;
pub mod error;
pub mod pieces;
pub mod queue;
pub mod rng;
pub mod rules;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use nemein_types as types;

pub use board::Grid;
pub use cell::{CellKind, DefenseCell, Resistances};
pub use clear::{ClearOutcome, ClearStrategy, LineClearEngine};
pub use config::SessionConfig;
pub use damage::{ClearRecord, DamageComposition, DamageResolver};
pub use error::EngineError;
pub use pieces::{coordinates_of, try_rotate, wall_kick_offsets, Piece};
pub use queue::PieceQueue;
pub use rng::SimpleRng;
pub use rules::{ClassicRules, ExtendedRules, Rules};
pub use scoring::Progress;
pub use session::{ClassicSession, ExtendedSession, GameSession, SessionPhase};
pub use snapshot::{
    ActiveSnapshot, CellSnapshot, ClassicSnapshot, ExtendedSnapshot, SessionSnapshot, Snapshot,
};
