//! Injected randomness for combat and strategist decisions.
//!
//! Everything that rolls dice takes a `UniformSource` instead of reaching for
//! a global generator. Any `rand::Rng` qualifies; `ScriptedSource` replays a
//! fixed sequence so outcomes can be reproduced exactly.

use rand::Rng;

/// A source of uniform floats in `[0, 1)`.
pub trait UniformSource {
    fn next_unit(&mut self) -> f64;

    /// Uniform float in `[lo, hi)`.
    fn between(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_unit()
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        ((self.next_unit() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

impl<R: Rng + ?Sized> UniformSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed list of values, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// Creates a source from `values`. Each value is clamped into `[0, 1)`;
    /// an empty list behaves like a constant 0.
    pub fn new(values: Vec<f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        ScriptedSource { values, cursor: 0 }
    }

    /// A source that always yields `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of values drawn so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl UniformSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            self.cursor += 1;
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn scripted_source_cycles() {
        let mut src = ScriptedSource::new(vec![0.1, 0.9]);
        assert_eq!(src.next_unit(), 0.1);
        assert_eq!(src.next_unit(), 0.9);
        assert_eq!(src.next_unit(), 0.1);
        assert_eq!(src.drawn(), 3);
    }

    #[test]
    fn values_are_clamped() {
        let mut src = ScriptedSource::new(vec![1.5, -2.0]);
        assert!(src.next_unit() < 1.0);
        assert_eq!(src.next_unit(), 0.0);
    }

    #[test]
    fn between_and_index_stay_in_range() {
        let mut src = ScriptedSource::constant(0.999);
        assert!(src.between(0.85, 1.15) < 1.15);
        assert_eq!(src.index(4), 3);
        let mut low = ScriptedSource::constant(0.0);
        assert_eq!(low.between(0.3, 0.4), 0.3);
        assert_eq!(low.index(4), 0);
    }

    #[test]
    fn chance_compares_strictly() {
        let mut src = ScriptedSource::constant(0.5);
        assert!(!src.chance(0.5));
        assert!(src.chance(0.51));
    }

    #[test]
    fn any_rng_is_a_source() {
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..100 {
            let v = rng.next_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
