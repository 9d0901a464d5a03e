//! Piece queue - upcoming pieces, the active piece and the hold slot

use std::collections::VecDeque;

use crate::error::EngineError;
use crate::pieces::Piece;
use crate::rng::SimpleRng;
use crate::types::{PieceKind, QUEUE_LOOKAHEAD};

/// FIFO of upcoming shapes with a fixed lookahead, plus one held shape
#[derive(Debug, Clone)]
pub struct PieceQueue {
    upcoming: VecDeque<PieceKind>,
    active: Piece,
    held: Option<PieceKind>,
    can_hold: bool,
    rng: SimpleRng,
    /// Forces every generated shape (tests/debugging)
    override_kind: Option<PieceKind>,
}

impl PieceQueue {
    /// Prime the queue with `QUEUE_LOOKAHEAD + 1` shapes and pop the first
    pub fn new(seed: u32, override_kind: Option<PieceKind>) -> Self {
        let mut queue = Self {
            upcoming: VecDeque::with_capacity(QUEUE_LOOKAHEAD + 1),
            active: Piece::default(),
            held: None,
            can_hold: true,
            rng: SimpleRng::new(seed),
            override_kind,
        };
        let first = queue.generate();
        queue.active = Piece::spawn(first);
        while queue.upcoming.len() < QUEUE_LOOKAHEAD {
            let kind = queue.generate();
            queue.upcoming.push_back(kind);
        }
        queue
    }

    fn generate(&mut self) -> PieceKind {
        if let Some(kind) = self.override_kind {
            return kind;
        }
        self.rng
            .choose(&PieceKind::PLAYABLE)
            .unwrap_or(PieceKind::T)
    }

    pub fn peek_active(&self) -> Piece {
        self.active
    }

    /// Promote the front of the queue to active and replenish the tail
    pub fn pop_and_advance(&mut self) -> Result<Piece, EngineError> {
        let front = self
            .upcoming
            .pop_front()
            .ok_or(EngineError::QueueUnderflow)?;
        let kind = self.generate();
        self.upcoming.push_back(kind);
        self.active = Piece::spawn(front);
        Ok(self.active)
    }

    /// Commit a new rotation state of the active piece
    pub fn set_active(&mut self, piece: Piece) {
        self.active = piece;
    }

    /// Swap active and held
    ///
    /// Returns `Ok(false)` without touching anything when hold was already
    /// used for the current piece. Held shapes always come back in spawn
    /// rotation.
    pub fn swap_held(&mut self) -> Result<bool, EngineError> {
        if !self.can_hold {
            return Ok(false);
        }
        let outgoing = self.active.kind;
        match self.held.replace(outgoing) {
            Some(previous) => self.active = Piece::spawn(previous),
            None => {
                self.pop_and_advance()?;
            }
        }
        self.can_hold = false;
        Ok(true)
    }

    /// Re-enable hold; called when a piece locks
    pub fn enable_hold(&mut self) {
        self.can_hold = true;
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn held(&self) -> Option<PieceKind> {
        self.held
    }

    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.upcoming.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn clear_upcoming(&mut self) {
        self.upcoming.clear();
    }
}
