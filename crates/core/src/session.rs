//! Game session - the command-driven state machine
//!
//! Every external call erases the active piece and its ghost, applies one
//! command, resolves a lock if the piece could not move, repaints and returns
//! a [`Snapshot`]. Between calls the grid always shows the active piece and
//! its ghost.
//!
//! ```
//! use nemein_core::{ClassicSession, SessionConfig};
//! use nemein_types::{Command, PieceKind};
//!
//! let config = SessionConfig::new(6, 10).with_piece_override(PieceKind::T);
//! let mut session = ClassicSession::new(config);
//! session.apply_command(Command::TickDown).unwrap();
//! let snapshot = session.apply_command(Command::HardDrop).unwrap();
//! assert_eq!(snapshot.board_codes()[9], vec![0, 3, 3, 3, 0, 0]);
//! ```

use log::{debug, info, warn};

use crate::board::Grid;
use crate::config::SessionConfig;
use crate::error::EngineError;
use crate::pieces::{try_rotate, Piece};
use crate::queue::PieceQueue;
use crate::rules::{ClassicRules, ExtendedRules, Rules};
use crate::scoring::Progress;
use crate::snapshot::{ActiveSnapshot, SessionSnapshot, Snapshot};
use crate::types::{Command, PieceKind, RotateDirection, Variant, LOCK_DELAY_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Falling,
    /// Resting on the stack; the next blocked descent locks
    LockDelayArmed,
    /// Transient while a lock is being resolved
    Locked,
    GameOver,
}

pub type ClassicSession = GameSession<ClassicRules>;
pub type ExtendedSession = GameSession<ExtendedRules>;

/// One game, owned by exactly one driver
#[derive(Debug, Clone)]
pub struct GameSession<R: Rules> {
    grid: Grid<R::Cell>,
    queue: PieceQueue,
    rules: R,
    progress: Progress,
    phase: SessionPhase,
    x: i32,
    y: i32,
    ghost_y: i32,
    spawn_x: i32,
    t_spin: bool,
    zero_tick_interval: bool,
    /// Nothing painted yet; the first call only draws the spawned piece
    awaiting_first_render: bool,
}

impl<R: Rules> GameSession<R> {
    pub fn new(config: SessionConfig) -> Self {
        let grid = Grid::new(config.width, config.height);
        let queue = PieceQueue::new(config.seed, config.piece_override);
        let ghost_y = grid.spawn_pivot_y(queue.peek_active());
        let spawn_x = config.spawn_column();
        Self {
            grid,
            queue,
            rules: R::from_config(&config),
            progress: Progress::default(),
            phase: SessionPhase::Falling,
            x: spawn_x,
            y: 0,
            ghost_y,
            spawn_x,
            t_spin: false,
            zero_tick_interval: config.zero_tick_interval,
            awaiting_first_render: true,
        }
    }

    pub fn variant(&self) -> Variant {
        R::VARIANT
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn grid(&self) -> &Grid<R::Cell> {
        &self.grid
    }

    /// Direct board access for setting up positions
    ///
    /// Call `Grid::refresh_lowest_rows` after editing cells.
    pub fn grid_mut(&mut self) -> &mut Grid<R::Cell> {
        &mut self.grid
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn active(&self) -> Piece {
        self.queue.peek_active()
    }

    /// Pivot of the active piece
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn ghost_y(&self) -> i32 {
        self.ghost_y
    }

    pub fn is_t_spin(&self) -> bool {
        self.t_spin
    }

    /// Delay before the caller should issue the next `TickDown`
    pub fn tick_interval_ms(&self) -> u32 {
        let base = if self.zero_tick_interval {
            0
        } else {
            self.rules.base_interval(&self.progress)
        };
        if self.phase == SessionPhase::LockDelayArmed {
            base.max(LOCK_DELAY_MS)
        } else {
            base
        }
    }

    /// Parse a command symbol and apply it
    ///
    /// Unknown symbols are logged and treated as a soft drop.
    pub fn apply_symbol(&mut self, symbol: &str) -> Result<Snapshot, EngineError> {
        let command = Command::from_str(symbol).unwrap_or_else(|| {
            warn!("unknown command symbol {symbol:?}, treating as soft drop");
            Command::SoftDrop
        });
        self.apply_command(command)
    }

    pub fn apply_command(&mut self, command: Command) -> Result<Snapshot, EngineError> {
        if self.is_game_over() {
            return Ok(self.finish_step());
        }
        if self.awaiting_first_render {
            self.awaiting_first_render = false;
            self.settle();
            return Ok(self.finish_step());
        }

        self.erase_active();
        let blocked = match command {
            Command::MoveLeft => {
                self.try_shift(-1);
                false
            }
            Command::MoveRight => {
                self.try_shift(1);
                false
            }
            Command::RotateCw => {
                self.rotate(RotateDirection::Clockwise);
                false
            }
            Command::RotateCcw => {
                self.rotate(RotateDirection::Counterclockwise);
                false
            }
            Command::SoftDrop => !self.descend(),
            Command::TickDown => {
                if self.rules.on_tick(&mut self.grid, &self.progress) {
                    self.y -= 1;
                }
                !self.descend()
            }
            Command::HardDrop => {
                self.y = self.ghost_y;
                true
            }
            Command::Hold => {
                self.hold()?;
                false
            }
        };

        if blocked {
            self.resolve_lock()?;
            if !self.is_game_over() {
                self.render_active();
            }
        } else if !self.is_game_over() {
            self.settle();
        }
        Ok(self.finish_step())
    }

    /// Current state without consuming pending clear records
    pub fn snapshot(&self) -> Snapshot {
        let active = self.queue.peek_active();
        let session = SessionSnapshot {
            active: ActiveSnapshot {
                kind: active.kind,
                rotation: active.rotation,
                x: self.x,
                y: self.y,
            },
            ghost_y: self.ghost_y,
            held: self.queue.held(),
            can_hold: self.queue.can_hold(),
            queue: self.queue.upcoming().collect(),
            game_over: self.is_game_over(),
            score: self.progress.score,
            level: self.progress.level,
            lines: self.progress.lines,
            tick_interval_ms: self.tick_interval_ms(),
        };
        self.rules.snapshot(session, &self.grid)
    }

    fn finish_step(&mut self) -> Snapshot {
        let snapshot = self.snapshot();
        self.rules.end_step();
        snapshot
    }

    fn placeable(&self, x: i32, y: i32, piece: Piece) -> bool {
        self.grid.is_placeable(false, x, y, piece)
    }

    fn erase_active(&mut self) {
        let piece = self.queue.peek_active();
        self.grid.paint(self.x, self.ghost_y, piece, PieceKind::Blank);
        self.grid.paint(self.x, self.y, piece, PieceKind::Blank);
    }

    fn try_shift(&mut self, dx: i32) -> bool {
        let piece = self.queue.peek_active();
        if !self.placeable(self.x + dx, self.y, piece) {
            return false;
        }
        self.x += dx;
        true
    }

    fn rotate(&mut self, direction: RotateDirection) {
        let piece = self.queue.peek_active();
        let Some((rotated, x, y)) = try_rotate(piece, self.x, self.y, direction, |p, px, py| {
            self.placeable(px, py, p)
        }) else {
            return;
        };
        self.queue.set_active(rotated);
        self.x = x;
        self.y = y;

        if rotated.kind == PieceKind::T && self.phase == SessionPhase::LockDelayArmed {
            self.t_spin =
                !self.placeable(x - 1, y, rotated) && !self.placeable(x + 1, y, rotated);
        }
    }

    /// One row down; leaving the resting row disarms lock delay
    /// One downward step followed by the rules' per-step work
    fn descend(&mut self) -> bool {
        let moved = self.try_descend();
        self.rules.on_descent(&mut self.grid);
        moved
    }

    fn try_descend(&mut self) -> bool {
        let piece = self.queue.peek_active();
        if !self.placeable(self.x, self.y + 1, piece) {
            return false;
        }
        self.y += 1;
        if self.phase == SessionPhase::LockDelayArmed {
            self.phase = SessionPhase::Falling;
            self.t_spin = false;
        }
        true
    }

    fn hold(&mut self) -> Result<(), EngineError> {
        if !self.queue.swap_held()? {
            return Ok(());
        }
        self.x = self.spawn_x;
        self.y = 0;
        self.t_spin = false;
        self.phase = SessionPhase::Falling;
        if !self
            .grid
            .is_placeable(true, self.x, self.y, self.queue.peek_active())
        {
            info!("held piece cannot enter the board, game over");
            self.phase = SessionPhase::GameOver;
        }
        Ok(())
    }

    /// Recompute the ghost, repaint, and arm or disarm lock delay
    fn settle(&mut self) {
        let piece = self.queue.peek_active();
        self.ghost_y = self.grid.compute_ghost_y(self.x, self.y, piece);
        self.grid.paint(self.x, self.ghost_y, piece, PieceKind::Ghost);
        self.grid.paint(self.x, self.y, piece, piece.kind);

        match self.phase {
            SessionPhase::Falling if self.y == self.ghost_y => {
                self.phase = SessionPhase::LockDelayArmed;
            }
            SessionPhase::LockDelayArmed if self.y != self.ghost_y => {
                self.phase = SessionPhase::Falling;
                self.t_spin = false;
            }
            _ => {}
        }
    }

    /// Commit the piece, clear rows, score, and bring in the next piece
    fn resolve_lock(&mut self) -> Result<(), EngineError> {
        self.phase = SessionPhase::Locked;
        let piece = self.queue.peek_active();
        self.grid.paint(self.x, self.y, piece, piece.kind);
        self.grid.commit_lowest_row(self.x, self.y, piece);

        let outcome = self.rules.resolve_clears(&mut self.grid);
        self.rules
            .score_lock(&mut self.progress, &outcome, self.t_spin);
        debug!(
            "locked {:?} at ({}, {}): {} lines, t-spin {}",
            piece.kind, self.x, self.y, outcome.lines, self.t_spin
        );

        let next = self.queue.pop_and_advance()?;
        self.queue.enable_hold();
        self.x = self.spawn_x;
        self.y = 0;
        self.t_spin = false;

        if self.grid.is_placeable(true, self.x, self.y, next) {
            self.phase = SessionPhase::Falling;
        } else {
            info!(
                "game over: score {}, level {}, lines {}",
                self.progress.score, self.progress.level, self.progress.lines
            );
            self.phase = SessionPhase::GameOver;
        }
        Ok(())
    }

    /// Draw the freshly spawned piece one row into the board
    fn render_active(&mut self) {
        self.try_descend();
        self.settle();
    }
}
