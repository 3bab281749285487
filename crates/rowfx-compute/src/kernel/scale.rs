//! Per-channel gain.

use rowfx_core::{Component, RowSpan};

use super::{Inputs, Kernel, lane};

/// Multiplies every channel by a fixed gain: `out[c] = src[c] * gains[c]`.
///
/// Integer depths clamp into `[0, max]`; float depths are left unclamped.
/// Reads source slot [`ScaleKernel::SOURCE`].
///
/// An identity kernel changes nothing, and the engine cannot tell that
/// generically; callers check [`is_identity`](ScaleKernel::is_identity) and
/// skip the job.
///
/// ```rust
/// use rowfx_compute::ScaleKernel;
///
/// assert!(ScaleKernel::uniform(1.0).is_identity());
/// assert!(!ScaleKernel::new([1.0, 1.0, 1.0, 0.5]).is_identity());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleKernel {
    /// Gain per channel: R, G, B, A.
    pub gains: [f32; 4],
}

impl ScaleKernel {
    /// Source slot read by this kernel.
    pub const SOURCE: usize = 0;

    /// Creates a kernel with per-channel gains.
    pub fn new(gains: [f32; 4]) -> Self {
        Self { gains }
    }

    /// Same gain on every channel.
    pub fn uniform(gain: f32) -> Self {
        Self::new([gain; 4])
    }

    /// Whether every gain is exactly 1.
    pub fn is_identity(&self) -> bool {
        self.gains.iter().all(|&g| g == 1.0)
    }
}

impl Kernel for ScaleKernel {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn process_row<T: Component>(&self, row: &mut RowSpan<'_, T>, inputs: &Inputs<'_>) {
        let n = row.components();
        let fallback = inputs.fallback::<T>(n);
        let src = inputs.row::<T>(Self::SOURCE, row.y());

        for (x, dst) in row.pixels_mut() {
            let Some(px) = src.and_then(|r| r.pixel(x)) else {
                dst.copy_from_slice(&fallback[..n]);
                continue;
            };
            for c in 0..n {
                dst[c] = T::from_f32(px[c].to_f32() * self.gains[lane(n, c)]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MissingSource;
    use crate::cancel::NeverAbort;
    use rowfx_core::{ImageBuf, Window};

    fn run<T: Component>(kernel: &ScaleKernel, dst: &mut ImageBuf<T>, inputs: &Inputs<'_>) {
        let window = dst.bounds();
        let mut view = dst.view_mut();
        let mut rows = view.rows_mut::<T>(&window).unwrap();
        kernel.process_band(&mut rows, inputs, &NeverAbort);
    }

    #[test]
    fn test_scale_float_unclamped() {
        let bounds = Window::new(0, 0, 2, 1);
        let src = ImageBuf::<f32>::filled(bounds, 4, &[0.5, 1.0, 2.0, 1.0]).unwrap();
        let mut dst = ImageBuf::<f32>::new(bounds, 4).unwrap();
        let inputs = Inputs::new(vec![Some(src.view())], MissingSource::Transparent);

        run(&ScaleKernel::new([2.0, 2.0, 2.0, 0.5]), &mut dst, &inputs);
        assert_eq!(dst.pixel(1, 0), Some(&[1.0f32, 2.0, 4.0, 0.5][..]));
    }

    #[test]
    fn test_scale_integer_clamps() {
        let bounds = Window::new(0, 0, 1, 1);
        let src = ImageBuf::<u8>::filled(bounds, 3, &[100, 200, 50]).unwrap();
        let mut dst = ImageBuf::<u8>::new(bounds, 3).unwrap();
        let inputs = Inputs::new(vec![Some(src.view())], MissingSource::Transparent);

        run(&ScaleKernel::new([2.0, 2.0, -1.0, 1.0]), &mut dst, &inputs);
        assert_eq!(dst.pixel(0, 0), Some(&[200u8, 255, 0][..]));
    }

    #[test]
    fn test_alpha_only_uses_alpha_gain() {
        let bounds = Window::new(0, 0, 1, 1);
        let src = ImageBuf::<u16>::filled(bounds, 1, &[1000]).unwrap();
        let mut dst = ImageBuf::<u16>::new(bounds, 1).unwrap();
        let inputs = Inputs::new(vec![Some(src.view())], MissingSource::Transparent);

        run(&ScaleKernel::new([9.0, 9.0, 9.0, 0.5]), &mut dst, &inputs);
        assert_eq!(dst.pixel(0, 0), Some(&[500u16][..]));
    }

    #[test]
    fn test_missing_source_writes_zero() {
        let bounds = Window::new(0, 0, 3, 2);
        let mut dst = ImageBuf::<f32>::filled(bounds, 4, &[7.0; 4]).unwrap();
        let inputs = Inputs::new(vec![None], MissingSource::Transparent);

        run(&ScaleKernel::uniform(3.0), &mut dst, &inputs);
        assert!(dst.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_partial_source_coverage() {
        // Source covers only column 0
        let src = ImageBuf::<f32>::filled(Window::new(0, 0, 1, 1), 1, &[0.25]).unwrap();
        let mut dst = ImageBuf::<f32>::filled(Window::new(0, 0, 2, 1), 1, &[9.0]).unwrap();
        let inputs = Inputs::new(vec![Some(src.view())], MissingSource::Fill([0.0, 0.0, 0.0, 0.75]));

        run(&ScaleKernel::uniform(2.0), &mut dst, &inputs);
        assert_eq!(dst.data(), &[0.5, 0.75]);
    }
}
