//! RNG module - deterministic randomness for shapes and perk rolls
//!
//! A small LCG keeps every session reproducible from its seed.

/// 32-bit LCG with the Numerical Recipes constants
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // Zero is remapped so every seed yields a usable stream.
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32() % max
    }

    /// Uniform float in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        // High bits of an LCG are the well-mixed ones.
        f64::from(self.next_u32() >> 8) / f64::from(1u32 << 24)
    }

    /// Roll against a probability; `chance >= 1.0` always succeeds
    pub fn roll(&mut self, chance: f64) -> bool {
        self.next_f64() < chance
    }

    /// Pick one element uniformly
    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_range(items.len() as u32) as usize;
        items.get(idx).copied()
    }

    /// Current internal state (reseeding with it replays the sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}
