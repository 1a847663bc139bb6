use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Injectable uniform random source consumed by the compositor.
///
/// Per drawn cell the compositor draws, in order: the skip check, the color (custom preset
/// only), the shape (`any` mode only), then the orientation.
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Restart the sequence from `seed`.
    fn reseed(&mut self, seed: u64);
}

/// Uniform pick from a non-empty slice (`floor(u * len)`, clamped).
pub fn pick<T: Copy>(rng: &mut dyn RandomSource, items: &[T]) -> T {
    debug_assert!(!items.is_empty());
    let u = rng.next_unit();
    let i = ((u * items.len() as f64).floor() as usize).min(items.len() - 1);
    items[i]
}

/// `StdRng`-backed source; the default for every render target.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The seed the current sequence started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
///
/// Lets tests script the exact cell-by-cell outcome. `reseed` rewinds to the start.
#[derive(Clone, Debug)]
pub struct SequenceRandom {
    values: Vec<f64>,
    pos: usize,
}

impl SequenceRandom {
    /// Samples are clamped into `[0, 1)`; an empty list behaves like `[0.0]`.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let mut values: Vec<f64> = values.into();
        if values.is_empty() {
            values.push(0.0);
        }
        for v in &mut values {
            *v = v.clamp(0.0, 1.0 - f64::EPSILON);
        }
        Self { values, pos: 0 }
    }

    /// Number of samples handed out so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f64 {
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v
    }

    fn reseed(&mut self, _seed: u64) {
        self.pos = 0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/random.rs"]
mod tests;
