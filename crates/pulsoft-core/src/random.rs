//! Reference `RandomSource` implementations.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use crate::traits::RandomSource;

/// Draws from the thread-local RNG. Unseeded; every process sees a
/// different stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
///
/// Values are clamped into `[0, 1)` on construction. An empty list behaves
/// like `[0.5]`, i.e. no perturbation at all.
#[derive(Debug)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl SequenceRandom {
    /// Largest value strictly below 1.0.
    const MAX_UNIT: f64 = 1.0 - f64::EPSILON;

    pub fn new(values: Vec<f64>) -> Self {
        let values = if values.is_empty() {
            vec![0.5]
        } else {
            values.into_iter().map(|v| v.clamp(0.0, Self::MAX_UNIT)).collect()
        };
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }

    /// A source that always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&self) -> f64 {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.values[i % self.values.len()]
    }
}
