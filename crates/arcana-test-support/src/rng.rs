//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use arcana_core::rng::DeterministicRng;

/// A no-op RNG that always returns `min` for `next_u32_range` and `0.0`
/// for `next_f64`. Suitable for tests that do not depend on specific
/// random values; deck shuffles become the identity permutation.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// An RNG that returns values from predetermined sequences. Panics when a
/// sequence is exhausted. Used in tests that need specific, repeatable
/// outcomes: shuffle swaps from the `u32` script, reversal rolls from the
/// `f64` script.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    floats: Vec<f64>,
    index: usize,
    float_index: usize,
}

impl SequenceRng {
    /// Creates a `SequenceRng` with a `u32` script only; `next_f64`
    /// always yields `0.0`.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values,
            floats: Vec::new(),
            index: 0,
            float_index: 0,
        }
    }

    /// Creates a `SequenceRng` with both scripts.
    #[must_use]
    pub fn with_floats(values: Vec<u32>, floats: Vec<f64>) -> Self {
        Self {
            values,
            floats,
            index: 0,
            float_index: 0,
        }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }

    fn next_f64(&mut self) -> f64 {
        if self.floats.is_empty() {
            return 0.0;
        }
        let val = self.floats[self.float_index];
        self.float_index += 1;
        val
    }
}
