//! End-to-end CPU path tests for rowfx-compute.

use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use rowfx_compute::{
    AbortFlag, BlendKernel, ComputeResult, EngineConfig, GammaKernel, Inputs, InvertKernel,
    Kernel, KernelMutex, MissingSource, NoiseKernel, ProcessingJob, RowPartition, ScaleKernel,
};
use rowfx_core::{BitDepth, Component, ImageBuf, ImageMut, ImageRef, RowSpan, Window, f16};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn ramp(bounds: Window, components: usize) -> ImageBuf<f32> {
    ImageBuf::from_fn(bounds, components, |x, y| {
        let v = (x * 7 + y * 13) as f32 / 1000.0;
        [v, v * 0.5, 1.0 - v, 0.75]
    })
    .unwrap()
}

#[test]
fn test_partition_covers_window() {
    for (w, h, max) in [(4096, 1, 8), (4096, 16, 8), (100, 997, 6), (1, 3, 64), (640, 480, 12)] {
        let window = Window::new(-10, 5, -10 + w, 5 + h);
        let part = RowPartition::new(&window, max);

        let expected = ((w * h) as usize / 4096).clamp(1, max);
        assert_eq!(part.worker_count(), expected, "{w}x{h} max {max}");

        let mut next = window.y1;
        for band in part.bands().filter(|b| !b.is_empty()) {
            assert_eq!(band.start, next);
            next = band.end;
        }
        assert_eq!(next, window.y2);
    }
}

#[test]
fn test_out_of_bounds_window_untouched() {
    init_tracing();
    let bounds = Window::new(0, 0, 32, 32);
    let src = ramp(bounds, 4);
    let mut dst = ImageBuf::<f32>::filled(bounds, 4, &[0.125; 4]).unwrap();

    for window in [
        Window::new(0, 0, 33, 32),
        Window::new(-1, 0, 32, 32),
        Window::new(10, 10, 10, 20),
        Window::new(10, 20, 20, 10),
        Window::new(40, 40, 50, 50),
    ] {
        ProcessingJob::new(ScaleKernel::uniform(2.0), window)
            .destination(dst.view_mut())
            .source(ScaleKernel::SOURCE, Some(src.view()))
            .process()
            .unwrap();
    }
    assert!(dst.data().iter().all(|&v| v == 0.125));
}

#[test]
fn test_scale_without_source_writes_zero() {
    init_tracing();
    let bounds = Window::new(0, 0, 200, 100);
    let mut dst = ImageBuf::<u16>::filled(bounds, 4, &[1234; 4]).unwrap();

    ProcessingJob::new(ScaleKernel::uniform(4.0), bounds)
        .destination(dst.view_mut())
        .source(ScaleKernel::SOURCE, None)
        .process()
        .unwrap();
    assert!(dst.data().iter().all(|&v| v == 0));
}

#[test]
fn test_missing_source_fill_policy() {
    let bounds = Window::new(0, 0, 16, 16);
    let mut dst = ImageBuf::<u8>::new(bounds, 4).unwrap();

    ProcessingJob::new(InvertKernel, bounds)
        .destination(dst.view_mut())
        .missing_source(MissingSource::Fill([255.0, 0.0, 0.0, 255.0]))
        .process()
        .unwrap();
    assert_eq!(dst.pixel(15, 15), Some(&[255u8, 0, 0, 255][..]));
}

#[test]
fn test_blend_endpoints_exact() {
    init_tracing();
    let bounds = Window::new(0, 0, 300, 90);
    let from = ramp(bounds, 4);
    let to = ImageBuf::from_fn(bounds, 4, |x, y| [0.3, x as f32 / 300.0, y as f32 / 90.0, 1.0]).unwrap();
    let config = EngineConfig::default().max_workers(4);

    for (t, expected) in [(0.0, &from), (1.0, &to)] {
        let mut dst = ImageBuf::<f32>::new(bounds, 4).unwrap();
        ProcessingJob::new(BlendKernel::new(t), bounds)
            .destination(dst.view_mut())
            .source(BlendKernel::FROM, Some(from.view()))
            .source(BlendKernel::TO, Some(to.view()))
            .config(config.clone())
            .process()
            .unwrap();
        assert_eq!(dst.data(), expected.data(), "t = {t}");
    }
}

#[test]
fn test_blend_half_float() {
    let bounds = Window::new(0, 0, 2, 2);
    let from = ImageBuf::filled(bounds, 3, &[f16::from_f32(0.0); 3]).unwrap();
    let to = ImageBuf::filled(bounds, 3, &[f16::from_f32(1.0); 3]).unwrap();
    let mut dst = ImageBuf::<f16>::new(bounds, 3).unwrap();

    ProcessingJob::new(BlendKernel::new(0.25), bounds)
        .destination(dst.view_mut())
        .source(BlendKernel::FROM, Some(from.view()))
        .source(BlendKernel::TO, Some(to.view()))
        .process()
        .unwrap();
    assert!(dst.data().iter().all(|v| v.to_f32() == 0.25));
}

#[test]
fn test_abort_before_start_writes_nothing() {
    init_tracing();
    let bounds = Window::new(0, 0, 512, 256);
    let src = ramp(bounds, 4);
    let mut dst = ImageBuf::<f32>::filled(bounds, 4, &[-1.0; 4]).unwrap();
    let flag = AbortFlag::new();
    flag.abort();

    ProcessingJob::new(ScaleKernel::uniform(3.0), bounds)
        .destination(dst.view_mut())
        .source(ScaleKernel::SOURCE, Some(src.view()))
        .abort(&flag)
        .process()
        .unwrap();
    assert!(dst.data().iter().all(|&v| v == -1.0));
}

#[test]
fn test_abort_mid_run_leaves_whole_rows() {
    let bounds = Window::new(0, 0, 64, 128);
    let src = ImageBuf::<u8>::filled(bounds, 1, &[0]).unwrap();
    let mut dst = ImageBuf::<u8>::filled(bounds, 1, &[7]).unwrap();
    let polls = AtomicUsize::new(0);
    let abort = || polls.fetch_add(1, Ordering::SeqCst) >= 40;

    ProcessingJob::new(InvertKernel, bounds)
        .destination(dst.view_mut())
        .source(InvertKernel::SOURCE, Some(src.view()))
        .config(EngineConfig::default().max_workers(4).min_pixels_per_worker(64))
        .abort(&abort)
        .process()
        .unwrap();

    // Each scanline is either fully written or untouched
    let mut written = 0;
    for row in dst.data().chunks(64) {
        match row[0] {
            255 => {
                assert!(row.iter().all(|&v| v == 255));
                written += 1;
            }
            7 => assert!(row.iter().all(|&v| v == 7)),
            other => panic!("unexpected sample {other}"),
        }
    }
    assert_eq!(written, 40);
}

#[test]
fn test_bottom_up_destination() {
    let bounds = Window::new(0, 10, 3, 14);
    let src = ImageBuf::<u8>::from_fn(bounds, 1, |_, y| [y as u8, 0, 0, 0]).unwrap();

    // Four rows of 3 pixels, padded to 4 bytes, stored last row first
    let mut storage = vec![0u8; 16];
    {
        let dst = ImageMut::new(&mut storage, bounds, 1, BitDepth::U8, -4).unwrap();
        ProcessingJob::new(ScaleKernel::uniform(2.0), bounds)
            .destination(dst)
            .source(ScaleKernel::SOURCE, Some(src.view()))
            .process()
            .unwrap();
    }
    assert_eq!(
        storage,
        [26, 26, 26, 0, 24, 24, 24, 0, 22, 22, 22, 0, 20, 20, 20, 0]
    );
}

#[test]
fn test_bottom_up_source() {
    let bounds = Window::new(0, 0, 2, 2);
    // Bottom-up: memory row 0 holds y = 1
    let storage = [10u8, 11, 20, 21];
    let src = ImageRef::new(&storage, bounds, 1, BitDepth::U8, -2).unwrap();
    let mut dst = ImageBuf::<u8>::new(bounds, 1).unwrap();

    ProcessingJob::new(InvertKernel, bounds)
        .destination(dst.view_mut())
        .source(InvertKernel::SOURCE, Some(src))
        .process()
        .unwrap();
    assert_eq!(dst.data(), &[235, 234, 245, 244]);
}

#[test]
fn test_gamma_job() {
    let bounds = Window::new(0, 0, 8, 8);
    let src = ImageBuf::<f32>::filled(bounds, 4, &[0.25, 0.25, 0.25, 0.25]).unwrap();
    let mut dst = ImageBuf::<f32>::new(bounds, 4).unwrap();

    ProcessingJob::new(GammaKernel::rgb(2.0), bounds)
        .destination(dst.view_mut())
        .source(GammaKernel::SOURCE, Some(src.view()))
        .process()
        .unwrap();
    let px = dst.pixel(4, 4).unwrap();
    assert_relative_eq!(px[0], 0.5, epsilon = 1e-6);
    assert_eq!(px[3], 0.25);
}

#[test]
fn test_noise_independent_of_worker_count() {
    init_tracing();
    let bounds = Window::new(0, 0, 256, 96);
    let kernel = NoiseKernel::new(1.0, 0xdead_beef);

    let render = |workers: usize| {
        let mut dst = ImageBuf::<u16>::new(bounds, 3).unwrap();
        ProcessingJob::new(kernel, bounds)
            .destination(dst.view_mut())
            .config(EngineConfig::default().max_workers(workers).min_pixels_per_worker(256))
            .process()
            .unwrap();
        dst
    };

    let single = render(1);
    assert_eq!(single, render(3));
    assert_eq!(single, render(16));
}

/// Sums every sample it writes across all workers.
struct SumKernel {
    total: KernelMutex<f64>,
    rows: AtomicUsize,
}

impl Kernel for SumKernel {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn process_row<T: Component>(&self, row: &mut RowSpan<'_, T>, inputs: &Inputs<'_>) {
        let src = inputs.row::<T>(0, row.y());
        let mut local = 0.0f64;
        for (x, dst) in row.pixels_mut() {
            if let Some(px) = src.and_then(|r| r.pixel(x)) {
                dst.copy_from_slice(px);
                local += px.iter().map(|v| v.to_f32() as f64).sum::<f64>();
            }
        }
        *self.total.lock() += local;
        self.rows.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn test_accumulator_kernel() -> ComputeResult<()> {
    let bounds = Window::new(0, 0, 128, 64);
    let src = ImageBuf::<u8>::filled(bounds, 2, &[1, 2])?;
    let mut dst = ImageBuf::<u8>::new(bounds, 2)?;
    let kernel = SumKernel { total: KernelMutex::new(0.0), rows: AtomicUsize::new(0) };

    ProcessingJob::new(&kernel, bounds)
        .destination(dst.view_mut())
        .source(0, Some(src.view()))
        .config(EngineConfig::default().max_workers(8).min_pixels_per_worker(512))
        .process()?;

    assert_eq!(kernel.rows.load(Ordering::Relaxed), 64);
    assert_eq!(*kernel.total.lock(), (128 * 64 * 3) as f64);
    assert_eq!(dst.data(), src.data());
    Ok(())
}
