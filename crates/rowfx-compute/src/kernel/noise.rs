//! Seeded uniform noise generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rowfx_core::{Component, RowSpan};

use super::{Inputs, Kernel};

/// Fills every component with `level * max * u`, `u` uniform in `[0, 1)`.
///
/// Reads no sources. Each scanline draws from its own generator seeded with
/// `seed + y`, so the output depends only on the seed and the row, never on
/// how rows were split between workers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseKernel {
    /// Amplitude as a fraction of the depth's max value.
    pub level: f32,
    /// Job seed.
    pub seed: u64,
}

impl NoiseKernel {
    /// Creates a generator.
    pub fn new(level: f32, seed: u64) -> Self {
        Self { level, seed }
    }

    /// Generator for scanline `y`.
    pub fn row_rng(&self, y: i32) -> StdRng {
        StdRng::seed_from_u64(self.seed.wrapping_add(y as u64))
    }
}

impl Kernel for NoiseKernel {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn process_row<T: Component>(&self, row: &mut RowSpan<'_, T>, _inputs: &Inputs<'_>) {
        let mut rng = self.row_rng(row.y());
        let amplitude = self.level * T::MAX;
        for v in row.samples_mut() {
            *v = T::from_f32(amplitude * rng.gen_range(0.0f32..1.0));
        }
    }
}
