//! Damage resolver - the extended variant's answer to line clears
//!
//! Completed rows are not simply removed. Each one produces a damage pool
//! that is mitigated per cell and thrown at the challenge line, the topmost of
//! the grey rows injected at the bottom of the board.
//!
//! # Flow per lock
//!
//! 1. [`DamageResolver::calculate_pools`] scans rows bottom-up. A row counts
//!    when every cell is solid and at least one came from a settled piece.
//!    Rows on or directly above the challenge line are critical.
//! 2. Three or four rows at once roll perks: impale (physical), ignite
//!    (fire), chill/freeze (cold) and shock (lightning).
//! 3. Every pool removes its own row, then hits the challenge line. A
//!    destroyed challenge row collapses and the index moves one row down.
//!
//! # Per tick
//!
//! [`DamageResolver::proc_ailments`] ages every ailment, lets the strongest
//! ignite burn the challenge line and turns chill/freeze into a longer tick
//! interval.
//!
//! # Tuning
//!
//! | Constant | Value |
//! |----------|-------|
//! | line pool | `CELL_HP * width` |
//! | `CRIT_MULTIPLIER` | 1.2 |
//! | `MAX_PHYSICAL_MITIGATION` | 90 |
//! | `MAX_ELEMENTAL_RESIST` | 75 |
//! | perk chance (3 / 4 rows) | 0.3 / 0.5 |
//! | `IMPALE_FRACTION` | 0.1 |
//! | ignite | 80% of fire over 4 ticks |
//! | chill | 0.2 x cold/hp, 0.05..=0.3, 2 ticks |
//! | freeze | 1 + 0.05 x cold/hp, 1 tick |
//! | shock | 0.3 x lightning/hp, 3 ticks |

use log::debug;

use crate::board::Grid;
use crate::cell::{CellKind, DefenseCell, CELL_HP};
use crate::clear::{ClearOutcome, ClearStrategy};
use crate::rng::SimpleRng;
use crate::types::{CellStatus, DamageType, PieceKind};

pub const CRIT_MULTIPLIER: f64 = 1.2;
pub const MAX_PHYSICAL_MITIGATION: f64 = 90.0;
pub const MAX_ELEMENTAL_RESIST: f64 = 75.0;

pub const TRIPLE_PERK_CHANCE: f64 = 0.3;
pub const TETRIS_PERK_CHANCE: f64 = 0.5;
/// Extra elemental chance after a critical row, relative to the base chance
pub const CRIT_CHANCE_BONUS: f64 = 1.0;

pub const IMPALE_FRACTION: f64 = 0.1;

pub const DAMAGING_AILMENT_TICKS: u32 = 4;
pub const IGNITE_FRACTION: f64 = 0.8;

pub const CHILL_TICKS: u32 = 2;
pub const CHILL_SCALE: f64 = 0.2;
pub const MIN_CHILL: f64 = 0.05;
pub const MAX_CHILL: f64 = 0.3;

pub const FREEZE_BASE: f64 = 1.0;
pub const FREEZE_TICKS: u32 = 1;
pub const FREEZE_SCALE: f64 = 0.05;

pub const SHOCK_TICKS: u32 = 3;
pub const SHOCK_SCALE: f64 = 0.3;

/// Damage amounts per channel
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageComposition {
    pub physical: f64,
    pub fire: f64,
    pub cold: f64,
    pub lightning: f64,
}

impl DamageComposition {
    /// Everything physical
    pub const PHYSICAL: Self = Self {
        physical: 1.0,
        fire: 0.0,
        cold: 0.0,
        lightning: 0.0,
    };

    pub fn single(damage_type: DamageType, amount: f64) -> Self {
        let mut out = Self::default();
        *out.get_mut(damage_type) = amount;
        out
    }

    pub fn get(&self, damage_type: DamageType) -> f64 {
        match damage_type {
            DamageType::Physical => self.physical,
            DamageType::Fire => self.fire,
            DamageType::Cold => self.cold,
            DamageType::Lightning => self.lightning,
        }
    }

    fn get_mut(&mut self, damage_type: DamageType) -> &mut f64 {
        match damage_type {
            DamageType::Physical => &mut self.physical,
            DamageType::Fire => &mut self.fire,
            DamageType::Cold => &mut self.cold,
            DamageType::Lightning => &mut self.lightning,
        }
    }

    pub fn total(&self) -> f64 {
        self.physical + self.fire + self.cold + self.lightning
    }

    pub fn scaled(&self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            physical: f(self.physical),
            fire: f(self.fire),
            cold: f(self.cold),
            lightning: f(self.lightning),
        }
    }

    /// Largest channel; ties go to the earlier channel in [`DamageType::ALL`]
    pub fn dominant(&self) -> (DamageType, f64) {
        let mut best = (DamageType::Physical, self.physical);
        for damage_type in DamageType::ALL {
            let value = self.get(damage_type);
            if value > best.1 {
                best = (damage_type, value);
            }
        }
        best
    }
}

impl std::ops::Add for DamageComposition {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            physical: self.physical + rhs.physical,
            fire: self.fire + rhs.fire,
            cold: self.cold + rhs.cold,
            lightning: self.lightning + rhs.lightning,
        }
    }
}

/// Damage produced by one completed row, before mitigation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamagePool {
    pub composition: DamageComposition,
    pub row: usize,
    pub critical: bool,
}

/// A row removed by damage
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ClearRecord {
    pub row: usize,
    pub shapes: Vec<PieceKind>,
    pub critical: bool,
    pub dominant: DamageType,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AilmentKind {
    Ignite,
    Chill,
    Freeze,
    Shock,
}

impl AilmentKind {
    pub const ALL: [AilmentKind; 4] = [
        AilmentKind::Ignite,
        AilmentKind::Chill,
        AilmentKind::Freeze,
        AilmentKind::Shock,
    ];

    pub fn element(&self) -> DamageType {
        match self {
            AilmentKind::Ignite => DamageType::Fire,
            AilmentKind::Chill | AilmentKind::Freeze => DamageType::Cold,
            AilmentKind::Shock => DamageType::Lightning,
        }
    }

    pub fn duration_ticks(&self) -> u32 {
        match self {
            AilmentKind::Ignite => DAMAGING_AILMENT_TICKS,
            AilmentKind::Chill => CHILL_TICKS,
            AilmentKind::Freeze => FREEZE_TICKS,
            AilmentKind::Shock => SHOCK_TICKS,
        }
    }
}

/// One running ailment
///
/// `magnitude` is damage per tick for ignite and effectiveness otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AilmentInstance {
    pub magnitude: f64,
    pub remaining_ticks: u32,
    pub element: DamageType,
}

impl AilmentInstance {
    fn new(kind: AilmentKind, magnitude: f64) -> Self {
        Self {
            magnitude,
            remaining_ticks: kind.duration_ticks(),
            element: kind.element(),
        }
    }
}

/// Ailment instances, one collection per kind
#[derive(Debug, Clone, Default)]
pub struct Ailments {
    ignite: Vec<AilmentInstance>,
    chill: Vec<AilmentInstance>,
    freeze: Vec<AilmentInstance>,
    shock: Vec<AilmentInstance>,
}

impl Ailments {
    pub fn instances(&self, kind: AilmentKind) -> &[AilmentInstance] {
        match kind {
            AilmentKind::Ignite => &self.ignite,
            AilmentKind::Chill => &self.chill,
            AilmentKind::Freeze => &self.freeze,
            AilmentKind::Shock => &self.shock,
        }
    }

    fn instances_mut(&mut self, kind: AilmentKind) -> &mut Vec<AilmentInstance> {
        match kind {
            AilmentKind::Ignite => &mut self.ignite,
            AilmentKind::Chill => &mut self.chill,
            AilmentKind::Freeze => &mut self.freeze,
            AilmentKind::Shock => &mut self.shock,
        }
    }

    fn push(&mut self, kind: AilmentKind, magnitude: f64) {
        self.instances_mut(kind)
            .push(AilmentInstance::new(kind, magnitude));
    }

    /// Largest magnitude among live instances of `kind`
    pub fn strongest(&self, kind: AilmentKind) -> Option<f64> {
        self.instances(kind)
            .iter()
            .map(|a| a.magnitude)
            .fold(None, |best, m| Some(best.map_or(m, |b: f64| b.max(m))))
    }

    pub fn is_empty(&self) -> bool {
        AilmentKind::ALL
            .iter()
            .all(|&kind| self.instances(kind).is_empty())
    }
}

/// Active perk flags and magnitudes
#[derive(Debug, Clone, PartialEq)]
pub struct Perks {
    pub impale: bool,
    /// Flat physical bonus added to every hit cell
    pub impale_bonus: f64,
    pub ignite: bool,
    pub chill: bool,
    pub freeze: bool,
    pub shock: bool,
    pub shock_multiplier: f64,
}

impl Default for Perks {
    fn default() -> Self {
        Self {
            impale: false,
            impale_bonus: 0.0,
            ignite: false,
            chill: false,
            freeze: false,
            shock: false,
            shock_multiplier: 1.0,
        }
    }
}

/// Base perk chance for a simultaneous clear of `rows` rows
pub fn perk_chance(rows: usize) -> Option<f64> {
    match rows {
        0..=2 => None,
        3 => Some(TRIPLE_PERK_CHANCE),
        _ => Some(TETRIS_PERK_CHANCE),
    }
}

/// A row qualifies when all cells are solid and one was left by a piece
pub fn is_row_complete(grid: &Grid<DefenseCell>, y: usize) -> bool {
    let mut user_formed = false;
    for cell in grid.row(y) {
        let kind = cell.occupant();
        if !kind.is_solid() {
            return false;
        }
        user_formed |= kind.is_tetromino();
    }
    user_formed
}

/// Damage, perk and ailment state of one extended session
#[derive(Debug, Clone)]
pub struct DamageResolver {
    width: usize,
    height: usize,
    /// Row index of the challenge line; `height` while none exists
    challenge_line: usize,
    split: DamageComposition,
    perks: Perks,
    ailments: Ailments,
    records: Vec<ClearRecord>,
    rng: SimpleRng,
    last_perk_chance: Option<f64>,
}

impl DamageResolver {
    /// `split` gives the share of each channel in a line's damage
    pub fn new(width: usize, height: usize, split: DamageComposition, seed: u32) -> Self {
        Self {
            width,
            height,
            challenge_line: height,
            split,
            perks: Perks::default(),
            ailments: Ailments::default(),
            records: Vec::new(),
            rng: SimpleRng::new(seed),
            last_perk_chance: None,
        }
    }

    pub fn challenge_line(&self) -> usize {
        self.challenge_line
    }

    pub fn has_challenge_line(&self) -> bool {
        self.challenge_line < self.height
    }

    pub fn perks(&self) -> &Perks {
        &self.perks
    }

    pub fn ailments(&self) -> &Ailments {
        &self.ailments
    }

    /// Base chance used by the most recent perk roll, if one happened
    pub fn last_perk_chance(&self) -> Option<f64> {
        self.last_perk_chance
    }

    pub fn records(&self) -> &[ClearRecord] {
        &self.records
    }

    /// Hand over the clear records gathered since the last drain
    pub fn drain_records(&mut self) -> Vec<ClearRecord> {
        std::mem::take(&mut self.records)
    }

    fn line_pool(&self) -> f64 {
        f64::from(CELL_HP) * self.width as f64
    }

    fn is_critical(&self, row: usize) -> bool {
        self.has_challenge_line()
            && (row == self.challenge_line || row + 1 == self.challenge_line)
    }

    /// One pool per qualifying row, bottom row first
    pub fn calculate_pools(&self, grid: &Grid<DefenseCell>) -> Vec<DamagePool> {
        let base = self.line_pool() * self.perks.shock_multiplier;
        (0..self.height)
            .rev()
            .filter(|&row| is_row_complete(grid, row))
            .map(|row| {
                let critical = self.is_critical(row);
                let amount = if critical { base * CRIT_MULTIPLIER } else { base };
                DamagePool {
                    composition: self.split.scaled(amount),
                    row,
                    critical,
                }
            })
            .collect()
    }

    fn roll_perks(&mut self, pools: &[DamagePool]) {
        self.last_perk_chance = None;
        let Some(base) = perk_chance(pools.len()) else {
            return;
        };
        self.last_perk_chance = Some(base);

        let critical = pools.iter().any(|p| p.critical);
        let elemental = if critical {
            base + base * CRIT_CHANCE_BONUS
        } else {
            base
        };
        let total = pools
            .iter()
            .fold(DamageComposition::default(), |acc, p| acc + p.composition);
        let rows = pools.len() as f64;
        let width = self.width as f64;
        let total_hp = rows * f64::from(CELL_HP) * width;

        if total.physical > 0.0 {
            if self.rng.roll(base) {
                let dealt = total.physical + self.perks.impale_bonus * width * rows;
                self.perks.impale_bonus += dealt * IMPALE_FRACTION / rows / width;
                self.perks.impale = true;
            } else {
                self.perks.impale = false;
                self.perks.impale_bonus = 0.0;
            }
        }

        if total.fire > 0.0 && self.rng.roll(elemental) {
            let per_tick = total.fire * IGNITE_FRACTION / f64::from(DAMAGING_AILMENT_TICKS);
            self.ailments.push(AilmentKind::Ignite, per_tick);
            self.perks.ignite = true;
        }

        if total.cold > 0.0 {
            let chill = (total.cold / total_hp * CHILL_SCALE).min(MAX_CHILL);
            if chill >= MIN_CHILL {
                self.ailments.push(AilmentKind::Chill, chill);
                self.perks.chill = true;
            }
            if self.rng.roll(elemental) {
                let freeze = FREEZE_BASE + total.cold / total_hp * FREEZE_SCALE;
                self.ailments.push(AilmentKind::Freeze, freeze);
                self.perks.freeze = true;
            }
        }

        if total.lightning > 0.0 && self.rng.roll(elemental) {
            let shock = total.lightning / total_hp * SHOCK_SCALE;
            self.ailments.push(AilmentKind::Shock, shock);
            self.perks.shock = true;
            self.refresh_shock_multiplier();
        }

        debug!(
            "perk roll rows={} chance={} impale={} bonus={:.2}",
            pools.len(),
            base,
            self.perks.impale,
            self.perks.impale_bonus
        );
    }

    fn refresh_shock_multiplier(&mut self) {
        self.perks.shock_multiplier = 1.0 + self.ailments.strongest(AilmentKind::Shock).unwrap_or(0.0);
    }

    fn hit_status(&self) -> CellStatus {
        if self.perks.impale {
            CellStatus::Impaled
        } else if self.perks.shock {
            CellStatus::Shocked
        } else {
            CellStatus::None
        }
    }

    /// Apply a pool to row `y`; returns whether the row is now empty and the
    /// damage that landed after mitigation
    pub fn deal_damage_to_row(
        &mut self,
        grid: &mut Grid<DefenseCell>,
        y: usize,
        composition: DamageComposition,
        status: CellStatus,
    ) -> (bool, DamageComposition) {
        let width = self.width as f64;
        let per_cell = composition.map(|v| (v / width).floor());
        let impale = if self.perks.impale {
            self.perks.impale_bonus
        } else {
            0.0
        };

        let mut dealt = DamageComposition::default();
        let mut blanked = false;
        for x in 0..self.width {
            let Some(cell) = grid.cell_mut(x as i32, y as i32) else {
                continue;
            };
            if !cell.is_solid() {
                continue;
            }
            let defense = cell.defense;
            let elemental = |amount: f64, resist: i32| {
                (amount * (MAX_ELEMENTAL_RESIST - f64::from(resist)) / MAX_ELEMENTAL_RESIST).max(0.0)
            };
            let hit = DamageComposition {
                physical: (per_cell.physical
                    * (MAX_PHYSICAL_MITIGATION - f64::from(defense.physical))
                    / MAX_PHYSICAL_MITIGATION)
                    .max(0.0)
                    + impale,
                fire: elemental(per_cell.fire, defense.fire),
                cold: elemental(per_cell.cold, defense.cold),
                lightning: elemental(per_cell.lightning, defense.lightning),
            };
            dealt = dealt + hit;

            cell.hit_points -= hit.total().round() as i32;
            if cell.hit_points <= 0 {
                cell.paint(PieceKind::Blank);
                blanked = true;
            } else if status != CellStatus::None {
                cell.status = status;
            }
        }
        if blanked {
            grid.refresh_lowest_rows();
        }

        let cleared = grid.row(y).all(|c| !c.is_solid());
        (cleared, dealt)
    }

    /// Hit the challenge line; collapses it and advances the index when it breaks
    fn hit_challenge_line(
        &mut self,
        grid: &mut Grid<DefenseCell>,
        composition: DamageComposition,
        critical: bool,
        status: CellStatus,
    ) -> bool {
        if !self.has_challenge_line() {
            return false;
        }
        let row = self.challenge_line;
        let (cleared, dealt) = self.deal_damage_to_row(grid, row, composition, status);
        if !cleared {
            return false;
        }

        let (dominant, amount) = dealt.dominant();
        self.records.push(ClearRecord {
            row,
            shapes: vec![PieceKind::Grey; self.width],
            critical,
            dominant,
            amount,
        });
        grid.collapse_row(row);
        self.challenge_line += 1;
        debug!("challenge line broken at row {row}, next at {}", self.challenge_line);
        true
    }

    #[cfg(test)]
    pub(crate) fn push_ailment(&mut self, kind: AilmentKind, magnitude: f64) {
        self.ailments.push(kind, magnitude);
        match kind {
            AilmentKind::Ignite => self.perks.ignite = true,
            AilmentKind::Chill => self.perks.chill = true,
            AilmentKind::Freeze => self.perks.freeze = true,
            AilmentKind::Shock => self.perks.shock = true,
        }
    }

    /// Age ailments, burn the challenge line and return the next tick interval
    pub fn proc_ailments(&mut self, grid: &mut Grid<DefenseCell>, default_interval_ms: u32) -> u32 {
        for kind in AilmentKind::ALL {
            self.ailments.instances_mut(kind).retain_mut(|a| {
                if a.remaining_ticks == 0 {
                    return false;
                }
                a.remaining_ticks -= 1;
                true
            });
        }
        self.perks.ignite &= !self.ailments.instances(AilmentKind::Ignite).is_empty();
        self.perks.chill &= !self.ailments.instances(AilmentKind::Chill).is_empty();
        self.perks.freeze &= !self.ailments.instances(AilmentKind::Freeze).is_empty();
        self.perks.shock &= !self.ailments.instances(AilmentKind::Shock).is_empty();
        self.refresh_shock_multiplier();

        if let Some(burn) = self.ailments.strongest(AilmentKind::Ignite) {
            let fire = DamageComposition::single(DamageType::Fire, burn);
            self.hit_challenge_line(grid, fire, false, CellStatus::Ignited);
        }

        let timing_status = if self.perks.freeze {
            CellStatus::Frozen
        } else if self.perks.chill {
            CellStatus::Chilled
        } else {
            CellStatus::None
        };
        if timing_status != CellStatus::None && self.has_challenge_line() {
            for x in 0..self.width {
                if let Some(cell) = grid.cell_mut(x as i32, self.challenge_line as i32) {
                    if cell.is_solid() {
                        cell.status = timing_status;
                    }
                }
            }
        }

        let slowdown = [AilmentKind::Chill, AilmentKind::Freeze]
            .iter()
            .filter_map(|&kind| self.ailments.strongest(kind))
            .fold(0.0_f64, f64::max);
        let interval = (f64::from(default_interval_ms) * (1.0 + slowdown)).round() as u32;
        interval.max(default_interval_ms)
    }

    /// Push the board up one row and add a fresh grey row at the bottom
    pub fn spawn_challenge_line(&mut self, grid: &mut Grid<DefenseCell>) {
        if self.height == 0 {
            return;
        }
        self.challenge_line = self.challenge_line.saturating_sub(1);
        let bottom = self.height - 1;
        grid.raise_rows(bottom);
        grid.fill_row(bottom, PieceKind::Grey);
        debug!("challenge line spawned, frontier at row {}", self.challenge_line);
    }
}

impl ClearStrategy for DamageResolver {
    type Cell = DefenseCell;

    fn resolve_clears(&mut self, grid: &mut Grid<DefenseCell>) -> ClearOutcome {
        let pools = self.calculate_pools(grid);
        self.roll_perks(&pools);
        let status = self.hit_status();

        let mut outcome = ClearOutcome::default();
        let mut shifted = 0;
        for pool in &pools {
            outcome.critical |= pool.critical;
            let row = pool.row + shifted;

            if row != self.challenge_line {
                let shapes = grid.row(row).map(|c| c.occupant()).collect();
                let (dominant, amount) = pool.composition.dominant();
                self.records.push(ClearRecord {
                    row,
                    shapes,
                    critical: pool.critical,
                    dominant,
                    amount,
                });
                grid.collapse_row(row);
                shifted += 1;
                outcome.lines += 1;
            }

            if self.hit_challenge_line(grid, pool.composition, pool.critical, status) {
                shifted += 1;
                outcome.challenge_lines += 1;
            }
        }
        outcome
    }
}
