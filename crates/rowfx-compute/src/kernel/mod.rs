//! Per-pixel kernels.
//!
//! A [`Kernel`] turns source pixels into destination pixels one scanline at a
//! time. The engine owns the row loop ([`Kernel::process_band`]) so that the
//! abort query is polled exactly once per row for every kernel; kernels only
//! describe what happens inside a row.
//!
//! # Reference Kernels
//!
//! | kernel | sources | operation |
//! |---|---|---|
//! | [`ScaleKernel`] | 1 | per-channel gain |
//! | [`GammaKernel`] | 1 | per-channel power curve |
//! | [`BlendKernel`] | 2 | linear cross-fade |
//! | [`NoiseKernel`] | 0 | seeded uniform noise |
//! | [`InvertKernel`] | 1 | `max - v` |
//!
//! # Missing Data
//!
//! A disconnected source or an address outside the source bounds is "no
//! data", never an error. Kernels write [`Inputs::fallback`] in that case,
//! which is transparent black unless the job overrides it.
//!
//! # Writing a Kernel
//!
//! ```rust
//! use rowfx_compute::{Inputs, Kernel};
//! use rowfx_core::{Component, RowSpan};
//!
//! /// Copies source slot 0.
//! struct Passthrough;
//!
//! impl Kernel for Passthrough {
//!     fn name(&self) -> &'static str {
//!         "copy"
//!     }
//!
//!     fn process_row<T: Component>(&self, row: &mut RowSpan<'_, T>, inputs: &Inputs<'_>) {
//!         let n = row.components();
//!         let fallback = inputs.fallback::<T>(n);
//!         let src = inputs.row::<T>(0, row.y());
//!         for (x, dst) in row.pixels_mut() {
//!             match src.and_then(|r| r.pixel(x)) {
//!                 Some(px) => dst.copy_from_slice(px),
//!                 None => dst.copy_from_slice(&fallback[..n]),
//!             }
//!         }
//!     }
//! }
//! ```

mod blend;
mod gamma;
mod invert;
mod noise;
mod scale;

pub use blend::BlendKernel;
pub use gamma::GammaKernel;
pub use invert::InvertKernel;
pub use noise::NoiseKernel;
pub use scale::ScaleKernel;

use rowfx_core::{Component, ImageRef, RowSpan, SourceRow};

use crate::backend::{AcceleratorLaunch, Backend, CudaStream, MetalQueue, OpenClQueue};
use crate::cancel::AbortQuery;
use crate::{ComputeError, ComputeResult};

/// Per-pixel transformation run by a [`ProcessingJob`](crate::ProcessingJob).
///
/// Kernel parameters are plain fields set before the job runs; the same
/// kernel instance is shared read-only by all workers.
pub trait Kernel: Send + Sync {
    /// Short name, used in logs and errors.
    fn name(&self) -> &'static str;

    /// Fills one destination scanline.
    ///
    /// Every pixel of `row` must be written, with the fallback pixel where
    /// source data is missing.
    fn process_row<T: Component>(&self, row: &mut RowSpan<'_, T>, inputs: &Inputs<'_>);

    /// Fills a band of rows, polling `abort` before each one.
    ///
    /// Returns the number of rows written. Stops before the first row for
    /// which the query reports `true`.
    fn process_band<T: Component>(
        &self,
        band: &mut [RowSpan<'_, T>],
        inputs: &Inputs<'_>,
        abort: &dyn AbortQuery,
    ) -> usize {
        let mut written = 0;
        for row in band.iter_mut() {
            if abort.should_abort() {
                break;
            }
            self.process_row(row, inputs);
            written += 1;
        }
        written
    }

    /// Runs the whole window on an OpenCL queue.
    fn run_opencl(&self, _queue: OpenClQueue, _launch: &AcceleratorLaunch<'_>) -> ComputeResult<()> {
        Err(ComputeError::Unsupported { kernel: self.name(), backend: Backend::OpenCl })
    }

    /// Runs the whole window on a CUDA stream.
    fn run_cuda(&self, _stream: CudaStream, _launch: &AcceleratorLaunch<'_>) -> ComputeResult<()> {
        Err(ComputeError::Unsupported { kernel: self.name(), backend: Backend::Cuda })
    }

    /// Runs the whole window on a Metal queue.
    fn run_metal(&self, _queue: MetalQueue, _launch: &AcceleratorLaunch<'_>) -> ComputeResult<()> {
        Err(ComputeError::Unsupported { kernel: self.name(), backend: Backend::Metal })
    }
}

/// Lets a job borrow a kernel the caller still needs afterwards.
impl<K: Kernel> Kernel for &K {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn process_row<T: Component>(&self, row: &mut RowSpan<'_, T>, inputs: &Inputs<'_>) {
        (**self).process_row(row, inputs)
    }

    fn process_band<T: Component>(
        &self,
        band: &mut [RowSpan<'_, T>],
        inputs: &Inputs<'_>,
        abort: &dyn AbortQuery,
    ) -> usize {
        (**self).process_band(band, inputs, abort)
    }

    fn run_opencl(&self, queue: OpenClQueue, launch: &AcceleratorLaunch<'_>) -> ComputeResult<()> {
        (**self).run_opencl(queue, launch)
    }

    fn run_cuda(&self, stream: CudaStream, launch: &AcceleratorLaunch<'_>) -> ComputeResult<()> {
        (**self).run_cuda(stream, launch)
    }

    fn run_metal(&self, queue: MetalQueue, launch: &AcceleratorLaunch<'_>) -> ComputeResult<()> {
        (**self).run_metal(queue, launch)
    }
}

/// Replacement for missing source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MissingSource {
    /// All components zero.
    #[default]
    Transparent,
    /// Constant raw component values (clamped on integer depths).
    Fill([f32; 4]),
}

impl MissingSource {
    fn values(&self) -> [f32; 4] {
        match self {
            Self::Transparent => [0.0; 4],
            Self::Fill(v) => *v,
        }
    }
}

/// Read-only job inputs shared by every worker.
#[derive(Debug, Clone)]
pub struct Inputs<'a> {
    sources: Vec<Option<ImageRef<'a>>>,
    fallback: [f32; 4],
}

impl<'a> Inputs<'a> {
    /// Bundles source slots with the missing-data policy.
    pub fn new(sources: Vec<Option<ImageRef<'a>>>, missing: MissingSource) -> Self {
        Self { sources, fallback: missing.values() }
    }

    /// Number of source slots.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if there are no source slots.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Source image in `slot`, `None` if disconnected.
    #[inline]
    pub fn get(&self, slot: usize) -> Option<&ImageRef<'a>> {
        self.sources.get(slot)?.as_ref()
    }

    /// Scanline `y` of the source in `slot`.
    #[inline]
    pub fn row<T: Component>(&self, slot: usize, y: i32) -> Option<SourceRow<'a, T>> {
        self.get(slot)?.row(y)
    }

    /// Pixel `(x, y)` of the source in `slot`.
    #[inline]
    pub fn pixel<T: Component>(&self, slot: usize, x: i32, y: i32) -> Option<&'a [T]> {
        self.get(slot)?.pixel(x, y)
    }

    /// Pixel to write where source data is missing, laid out for
    /// `components`-wide pixels. Only the first `components` entries apply.
    #[inline]
    pub fn fallback<T: Component>(&self, components: usize) -> [T; 4] {
        std::array::from_fn(|c| T::from_f32(self.fallback[lane(components, c)]))
    }
}

/// Parameter lane for component `c` of a `components`-wide pixel.
///
/// Single-component images are alpha-only and use the fourth lane.
#[inline]
pub(crate) fn lane(components: usize, c: usize) -> usize {
    if components == 1 { 3 } else { c }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowfx_core::{ImageBuf, Window};

    #[test]
    fn test_inputs_slots() {
        let img = ImageBuf::<u8>::filled(Window::new(0, 0, 2, 2), 1, &[9]).unwrap();
        let inputs = Inputs::new(vec![None, Some(img.view())], MissingSource::Transparent);

        assert_eq!(inputs.len(), 2);
        assert!(inputs.get(0).is_none());
        assert!(inputs.get(5).is_none());
        assert_eq!(inputs.pixel::<u8>(1, 1, 1), Some(&[9u8][..]));
        assert_eq!(inputs.pixel::<u8>(1, 2, 1), None);
        assert!(inputs.row::<u8>(0, 0).is_none());
    }

    #[test]
    fn test_fallback_conversion() {
        let inputs = Inputs::new(Vec::new(), MissingSource::Fill([300.0, 0.5, -1.0, 1.0]));
        assert_eq!(inputs.fallback::<u8>(4), [255, 1, 0, 1]);
        assert_eq!(inputs.fallback::<f32>(3), [300.0, 0.5, -1.0, 1.0]);
        // Alpha-only pixels take the alpha lane
        assert_eq!(inputs.fallback::<f32>(1)[0], 1.0);

        let inputs = Inputs::new(Vec::new(), MissingSource::default());
        assert_eq!(inputs.fallback::<u16>(4), [0; 4]);
    }

    #[test]
    fn test_lane() {
        assert_eq!(lane(1, 0), 3);
        assert_eq!(lane(3, 2), 2);
        assert_eq!(lane(4, 3), 3);
    }
}
