//! Rule sets
//!
//! A [`GameSession`](crate::session::GameSession) is generic over [`Rules`]:
//! the cell kind and clear strategy come from [`ClearStrategy`], everything
//! else that differs between the classic and extended games (tick work,
//! pacing, scoring, snapshot shape) lives here.

use log::debug;

use crate::board::Grid;
use crate::cell::DefenseCell;
use crate::clear::{ClearOutcome, ClearStrategy, LineClearEngine};
use crate::config::SessionConfig;
use crate::damage::DamageResolver;
use crate::scoring::{
    apply_classic_lock, apply_extended_lock, challenge_cadence, classic_interval, Progress,
};
use crate::snapshot::{extended_board, ClassicSnapshot, ExtendedSnapshot, SessionSnapshot, Snapshot};
use crate::types::{PieceKind, Variant, DEFAULT_TICK_INTERVAL_MS};

/// Mixed into the session seed so perk rolls do not mirror the piece sequence
const RESOLVER_SEED_SALT: u32 = 0x9E37_79B9;

pub trait Rules: ClearStrategy + Sized {
    const VARIANT: Variant;

    fn from_config(config: &SessionConfig) -> Self;

    /// Work done on every automatic tick before the piece descends
    ///
    /// Returns `true` when the board moved up one row under the active piece.
    fn on_tick(&mut self, grid: &mut Grid<Self::Cell>, progress: &Progress) -> bool;

    /// Runs after every downward step, automatic or soft
    fn on_descent(&mut self, _grid: &mut Grid<Self::Cell>) {}

    /// Tick interval outside lock delay
    fn base_interval(&self, progress: &Progress) -> u32;

    fn score_lock(&mut self, progress: &mut Progress, outcome: &ClearOutcome, t_spin: bool);

    fn snapshot(&self, session: SessionSnapshot, grid: &Grid<Self::Cell>) -> Snapshot;

    /// Called once the snapshot of an external call was produced
    fn end_step(&mut self) {}
}

/// Classic rules: full rows vanish, speed follows the piece count
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicRules {
    clear: LineClearEngine,
}

impl ClearStrategy for ClassicRules {
    type Cell = PieceKind;

    fn resolve_clears(&mut self, grid: &mut Grid<PieceKind>) -> ClearOutcome {
        self.clear.resolve_clears(grid)
    }
}

impl Rules for ClassicRules {
    const VARIANT: Variant = Variant::Classic;

    fn from_config(_config: &SessionConfig) -> Self {
        Self::default()
    }

    fn on_tick(&mut self, _grid: &mut Grid<PieceKind>, _progress: &Progress) -> bool {
        false
    }

    fn base_interval(&self, progress: &Progress) -> u32 {
        if progress.tetromino_count == 0 {
            DEFAULT_TICK_INTERVAL_MS
        } else {
            classic_interval(progress.level)
        }
    }

    fn score_lock(&mut self, progress: &mut Progress, outcome: &ClearOutcome, _t_spin: bool) {
        apply_classic_lock(progress, outcome.lines);
    }

    fn snapshot(&self, session: SessionSnapshot, grid: &Grid<PieceKind>) -> Snapshot {
        Snapshot::Classic(ClassicSnapshot {
            session,
            board: grid.to_rows(),
        })
    }
}

/// Extended rules: clears become damage against a rising challenge line
#[derive(Debug, Clone)]
pub struct ExtendedRules {
    resolver: DamageResolver,
    ticks_since_spawn: u32,
    interval: u32,
}

impl ExtendedRules {
    pub fn resolver(&self) -> &DamageResolver {
        &self.resolver
    }

    pub fn ticks_since_spawn(&self) -> u32 {
        self.ticks_since_spawn
    }

    #[cfg(test)]
    pub(crate) fn resolver_mut(&mut self) -> &mut DamageResolver {
        &mut self.resolver
    }
}

impl ClearStrategy for ExtendedRules {
    type Cell = DefenseCell;

    fn resolve_clears(&mut self, grid: &mut Grid<DefenseCell>) -> ClearOutcome {
        self.resolver.resolve_clears(grid)
    }
}

impl Rules for ExtendedRules {
    const VARIANT: Variant = Variant::Extended;

    fn from_config(config: &SessionConfig) -> Self {
        Self {
            resolver: DamageResolver::new(
                config.width,
                config.height,
                config.damage_split,
                config.seed ^ RESOLVER_SEED_SALT,
            ),
            ticks_since_spawn: 0,
            interval: DEFAULT_TICK_INTERVAL_MS,
        }
    }

    fn on_tick(&mut self, grid: &mut Grid<DefenseCell>, progress: &Progress) -> bool {
        self.ticks_since_spawn += 1;
        let spawned = self.ticks_since_spawn >= challenge_cadence(progress.level);
        if spawned {
            self.ticks_since_spawn = 0;
            self.resolver.spawn_challenge_line(grid);
        }
        spawned
    }

    fn on_descent(&mut self, grid: &mut Grid<DefenseCell>) {
        self.interval = self.resolver.proc_ailments(grid, DEFAULT_TICK_INTERVAL_MS);
        debug!(
            "descent: interval {}ms, challenge line at {}",
            self.interval,
            self.resolver.challenge_line()
        );
    }

    fn base_interval(&self, _progress: &Progress) -> u32 {
        self.interval
    }

    fn score_lock(&mut self, progress: &mut Progress, outcome: &ClearOutcome, t_spin: bool) {
        let points = apply_extended_lock(progress, outcome.lines, t_spin);
        if points > 0 {
            debug!("lock scored {points} (level {})", progress.level);
        }
    }

    fn snapshot(&self, session: SessionSnapshot, grid: &Grid<DefenseCell>) -> Snapshot {
        Snapshot::Extended(ExtendedSnapshot {
            session,
            board: extended_board(grid),
            challenge_line: self.resolver.challenge_line(),
            clear_records: self.resolver.records().to_vec(),
        })
    }

    fn end_step(&mut self) {
        self.resolver.drain_records();
    }
}
