//! Per-channel gamma.

use rowfx_core::{Component, RowSpan};

use super::{Inputs, Kernel, lane};

/// Applies `out = max * (src / max)^(1 / gamma)` per channel.
///
/// Values at or below zero pass through unchanged, as does any channel whose
/// gamma is not positive. Reads source slot [`GammaKernel::SOURCE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaKernel {
    /// Gamma per channel: R, G, B, A.
    pub gamma: [f32; 4],
}

impl GammaKernel {
    /// Source slot read by this kernel.
    pub const SOURCE: usize = 0;

    /// Creates a kernel with per-channel gamma.
    pub fn new(gamma: [f32; 4]) -> Self {
        Self { gamma }
    }

    /// Same gamma on the color channels, alpha left alone.
    pub fn rgb(gamma: f32) -> Self {
        Self::new([gamma, gamma, gamma, 1.0])
    }

    /// Whether every gamma is exactly 1.
    pub fn is_identity(&self) -> bool {
        self.gamma.iter().all(|&g| g == 1.0)
    }

    fn exponents(&self) -> [Option<f32>; 4] {
        self.gamma.map(|g| (g > 0.0 && g != 1.0).then(|| g.recip()))
    }
}

impl Kernel for GammaKernel {
    fn name(&self) -> &'static str {
        "gamma"
    }

    fn process_row<T: Component>(&self, row: &mut RowSpan<'_, T>, inputs: &Inputs<'_>) {
        let n = row.components();
        let fallback = inputs.fallback::<T>(n);
        let src = inputs.row::<T>(Self::SOURCE, row.y());
        let exponents = self.exponents();

        for (x, dst) in row.pixels_mut() {
            let Some(px) = src.and_then(|r| r.pixel(x)) else {
                dst.copy_from_slice(&fallback[..n]);
                continue;
            };
            for c in 0..n {
                let v = px[c].to_f32();
                dst[c] = match exponents[lane(n, c)] {
                    Some(e) if v > 0.0 => T::from_f32(T::MAX * (v / T::MAX).powf(e)),
                    _ => px[c],
                };
            }
        }
    }
}
