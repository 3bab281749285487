//! Linear cross-fade between two sources.

use rowfx_core::{Component, RowSpan};

use super::{Inputs, Kernel};

/// Cross-fades source slot [`FROM`](BlendKernel::FROM) into slot
/// [`TO`](BlendKernel::TO): `out = from * (1 - t) + to * t`.
///
/// `t = 0` reproduces `from` exactly and `t = 1` reproduces `to` exactly.
///
/// Where only one source has data, that source is copied if `t` places it
/// closer (`t <= 0.5` favours `from`, otherwise `to`); the fallback pixel is
/// written otherwise, and where both are missing.
///
/// ```rust
/// use rowfx_compute::BlendKernel;
///
/// assert_eq!(BlendKernel::new(1.5).t(), 1.0);
/// assert_eq!(BlendKernel::new(f32::NAN).t(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendKernel {
    t: f32,
}

impl BlendKernel {
    /// Slot of the image faded out.
    pub const FROM: usize = 0;
    /// Slot of the image faded in.
    pub const TO: usize = 1;

    /// Creates a blend at factor `t`, clamped into `[0, 1]`.
    pub fn new(t: f32) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        Self { t }
    }

    /// Blend factor.
    pub fn t(&self) -> f32 {
        self.t
    }

    fn prefers_from(&self) -> bool {
        self.t <= 0.5
    }
}

impl Kernel for BlendKernel {
    fn name(&self) -> &'static str {
        "blend"
    }

    fn process_row<T: Component>(&self, row: &mut RowSpan<'_, T>, inputs: &Inputs<'_>) {
        let n = row.components();
        let fallback = inputs.fallback::<T>(n);
        let from_row = inputs.row::<T>(Self::FROM, row.y());
        let to_row = inputs.row::<T>(Self::TO, row.y());
        let (wa, wb) = (1.0 - self.t, self.t);

        for (x, dst) in row.pixels_mut() {
            let from = from_row.and_then(|r| r.pixel(x));
            let to = to_row.and_then(|r| r.pixel(x));
            match (from, to) {
                // Endpoints copy, so a non-finite sample in the other source cannot leak in
                (Some(a), Some(_)) if self.t == 0.0 => dst.copy_from_slice(a),
                (Some(_), Some(b)) if self.t == 1.0 => dst.copy_from_slice(b),
                (Some(a), Some(b)) => {
                    for c in 0..n {
                        dst[c] = T::from_f32(a[c].to_f32() * wa + b[c].to_f32() * wb);
                    }
                }
                (Some(a), None) if self.prefers_from() => dst.copy_from_slice(a),
                (None, Some(b)) if !self.prefers_from() => dst.copy_from_slice(b),
                _ => dst.copy_from_slice(&fallback[..n]),
            }
        }
    }
}
