//! Negative image.

use rowfx_core::{Component, RowSpan};

use super::{Inputs, Kernel};

/// Writes `max - v` for every component of source slot
/// [`InvertKernel::SOURCE`].
///
/// On float depths `max` is 1, so values above 1 invert to negatives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvertKernel;

impl InvertKernel {
    /// Source slot read by this kernel.
    pub const SOURCE: usize = 0;
}

impl Kernel for InvertKernel {
    fn name(&self) -> &'static str {
        "invert"
    }

    fn process_row<T: Component>(&self, row: &mut RowSpan<'_, T>, inputs: &Inputs<'_>) {
        let n = row.components();
        let fallback = inputs.fallback::<T>(n);
        let src = inputs.row::<T>(Self::SOURCE, row.y());

        for (x, dst) in row.pixels_mut() {
            match src.and_then(|r| r.pixel(x)) {
                Some(px) => {
                    for (d, s) in dst.iter_mut().zip(px) {
                        *d = T::from_f32(T::MAX - s.to_f32());
                    }
                }
                None => dst.copy_from_slice(&fallback[..n]),
            }
        }
    }
}
