//! Scoring module - points, levels and pacing for both rule sets
//!
//! # Classic
//!
//! - Level is `1 + locked_pieces / 10`
//! - Each lock adds `lines * level`
//! - The tick interval shrinks by 60ms per level until 900ms have been
//!   removed, then by half a millisecond per level, never reaching zero
//!
//! # Extended
//!
//! | Rows | Points | T-spin |
//! |------|--------|--------|
//! | 0 | 0 | 400 |
//! | 1 | 100 | 800 |
//! | 2 | 300 | 1200 |
//! | 3 | 500 | 1600 |
//! | 4 | 800 | - |
//!
//! Points are multiplied by level. Two tetrises in a row pay 3/2. Level `L`
//! is left once score reaches `100 * 10 * L(L+1)/2`, one level per lock at
//! most; every level removes one tick from the challenge-line cadence.

use crate::types::{
    B2B_DENOMINATOR, B2B_NUMERATOR, DEFAULT_TICK_INTERVAL_MS, EARLY_LEVEL_DECREASE_MS,
    INTERVAL_CAP_MS, LATE_LEVEL_DIVISOR, LEVEL_GOAL_MULTIPLIER, LEVEL_UP_TETROMINO_COUNT,
    LINE_VALUES, TICKS_PER_CHALLENGE_LINE, TSPIN_VALUES,
};

/// Score, level and counters of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub score: u32,
    pub level: u32,
    /// Rows formed by settled pieces that were cleared
    pub lines: u32,
    pub tetromino_count: u32,
    /// Previous scoring lock was a tetris
    pub back_to_back: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            lines: 0,
            tetromino_count: 0,
            back_to_back: false,
        }
    }
}

/// Classic level for a number of locked pieces
pub fn classic_level(tetromino_count: u32) -> u32 {
    1 + tetromino_count / LEVEL_UP_TETROMINO_COUNT
}

/// Classic tick interval for a level
pub fn classic_interval(level: u32) -> u32 {
    let mut decrease = level.saturating_mul(EARLY_LEVEL_DECREASE_MS);
    if decrease > INTERVAL_CAP_MS {
        decrease = INTERVAL_CAP_MS + level / LATE_LEVEL_DIVISOR;
    }
    // Keep at least 1ms so the scheduler never spins.
    DEFAULT_TICK_INTERVAL_MS - decrease.min(DEFAULT_TICK_INTERVAL_MS - 1)
}

/// Apply a classic lock: count the piece, then score `lines * level`
pub fn apply_classic_lock(progress: &mut Progress, lines: u32) {
    progress.tetromino_count += 1;
    progress.level = classic_level(progress.tetromino_count);
    progress.lines += lines;
    progress.score = progress.score.saturating_add(lines * progress.level);
}

/// Points for one extended lock, before level scaling
pub fn extended_base_points(lines: u32, t_spin: bool) -> u32 {
    if t_spin {
        let idx = (lines as usize).min(TSPIN_VALUES.len() - 1);
        TSPIN_VALUES[idx]
    } else {
        let idx = (lines as usize).min(LINE_VALUES.len() - 1);
        LINE_VALUES[idx]
    }
}

/// Score needed to leave `level`
pub fn level_threshold(level: u32) -> u32 {
    LINE_VALUES[1]
        .saturating_mul(LEVEL_GOAL_MULTIPLIER)
        .saturating_mul(level.saturating_mul(level + 1) / 2)
}

/// Apply an extended lock; returns the points awarded
pub fn apply_extended_lock(progress: &mut Progress, lines: u32, t_spin: bool) -> u32 {
    progress.tetromino_count += 1;
    progress.lines += lines;

    let mut points = extended_base_points(lines, t_spin) * progress.level;
    let tetris = lines >= 4;
    if tetris && progress.back_to_back {
        points = points * B2B_NUMERATOR / B2B_DENOMINATOR;
    }
    if lines > 0 {
        progress.back_to_back = tetris;
    }
    progress.score = progress.score.saturating_add(points);

    if progress.score >= level_threshold(progress.level) {
        progress.level += 1;
    }
    points
}

/// Ticks between challenge lines at `level`
pub fn challenge_cadence(level: u32) -> u32 {
    TICKS_PER_CHALLENGE_LINE
        .saturating_sub(level.saturating_sub(1))
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_level_steps_every_ten_pieces() {
        assert_eq!(classic_level(0), 1);
        assert_eq!(classic_level(9), 1);
        assert_eq!(classic_level(10), 2);
        assert_eq!(classic_level(25), 3);
    }

    #[test]
    fn test_classic_interval_curve() {
        assert_eq!(classic_interval(1), 940);
        assert_eq!(classic_interval(10), 400);
        assert_eq!(classic_interval(15), 100);
        // Past the cap the slope is half a millisecond per level.
        assert_eq!(classic_interval(16), 92);
        assert_eq!(classic_interval(20), 90);
        assert_eq!(classic_interval(150), 25);
        assert_eq!(classic_interval(10_000), 1);
    }

    #[test]
    fn test_classic_interval_is_monotonic() {
        let mut prev = classic_interval(1);
        for level in 2..500 {
            let next = classic_interval(level);
            assert!(next <= prev, "level {level}: {next} > {prev}");
            assert!(next >= 1);
            prev = next;
        }
    }

    #[test]
    fn test_classic_lock_scores_lines_times_level() {
        let mut p = Progress::default();
        for _ in 0..9 {
            apply_classic_lock(&mut p, 0);
        }
        apply_classic_lock(&mut p, 2);
        assert_eq!(p.level, 2);
        assert_eq!(p.score, 4);
        assert_eq!(p.lines, 2);
    }

    #[test]
    fn test_extended_points_table() {
        assert_eq!(extended_base_points(0, false), 0);
        assert_eq!(extended_base_points(1, false), 100);
        assert_eq!(extended_base_points(4, false), 800);
        assert_eq!(extended_base_points(0, true), 400);
        assert_eq!(extended_base_points(2, true), 1200);
    }

    #[test]
    fn test_back_to_back_tetris() {
        let mut p = Progress::default();
        assert_eq!(apply_extended_lock(&mut p, 4, false), 800);
        assert!(p.back_to_back);
        let level = p.level;
        assert_eq!(apply_extended_lock(&mut p, 4, false), 800 * level * 3 / 2);

        // A non-tetris clear breaks the chain; an empty lock does not.
        apply_extended_lock(&mut p, 0, false);
        assert!(p.back_to_back);
        apply_extended_lock(&mut p, 1, false);
        assert!(!p.back_to_back);
    }

    #[test]
    fn test_level_rises_at_most_once_per_lock() {
        assert_eq!(level_threshold(1), 1000);
        assert_eq!(level_threshold(2), 3000);

        let mut p = Progress::default();
        p.score = 50_000;
        apply_extended_lock(&mut p, 0, false);
        assert_eq!(p.level, 2);
        apply_extended_lock(&mut p, 0, false);
        assert_eq!(p.level, 3);
    }

    #[test]
    fn test_challenge_cadence_floor() {
        assert_eq!(challenge_cadence(1), 10);
        assert_eq!(challenge_cadence(4), 7);
        assert_eq!(challenge_cadence(10), 1);
        assert_eq!(challenge_cadence(50), 1);
    }
}
