//! Borrowed pixel buffer views.
//!
//! Hosts hand the engine raw scanline memory. This module wraps it in two
//! views that validate the layout once and then expose bounds-checked
//! addressing:
//!
//! - [`ImageRef`] - read-only source, freely shared across threads
//! - [`ImageMut`] - exclusive destination, split into per-row spans
//!
//! # Memory Layout
//!
//! Pixels are interleaved, `components` samples each. Rows are `row_stride`
//! bytes apart. A negative stride describes a bottom-up image: the first
//! row in memory holds `bounds.y2 - 1`.
//!
//! ```text
//! stride > 0                  stride < 0
//! mem row 0 -> y1             mem row 0 -> y2 - 1
//! mem row 1 -> y1 + 1         mem row 1 -> y2 - 2
//! ...                         ...
//! ```
//!
//! Every address query returns `None` outside `bounds`, which kernels treat
//! as "no data".

use crate::format::{BitDepth, Component};
use crate::rect::Window;
use crate::{Error, Result};

/// Geometry and sample format shared by both view types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Pixel bounds, half-open.
    pub bounds: Window,
    /// Samples per pixel, `1..=4`.
    pub components: usize,
    /// Sample type.
    pub depth: BitDepth,
    /// Bytes between consecutive rows; negative for bottom-up storage.
    pub row_stride: isize,
}

impl Layout {
    /// Creates a tightly packed top-down layout.
    pub fn packed(bounds: Window, components: usize, depth: BitDepth) -> Self {
        let row_stride = (bounds.width() * components * depth.bytes()) as isize;
        Self { bounds, components, depth, row_stride }
    }

    /// Bytes per pixel.
    #[inline]
    pub const fn pixel_bytes(&self) -> usize {
        self.components * self.depth.bytes()
    }

    /// Bytes of pixel data in one scanline.
    #[inline]
    pub const fn row_bytes(&self) -> usize {
        self.bounds.width() * self.pixel_bytes()
    }

    /// Minimum storage length for these bounds, `None` if it does not fit
    /// in `usize`.
    pub fn required_len(&self) -> Option<usize> {
        match self.bounds.height() {
            0 => Some(0),
            h => (h - 1)
                .checked_mul(self.row_stride.unsigned_abs())?
                .checked_add(self.row_bytes()),
        }
    }

    /// Clamp ceiling of the sample type (`1.0` for floats).
    #[inline]
    pub const fn max_value(&self) -> f32 {
        self.depth.max_value()
    }

    fn validate(&self, ptr: *const u8, len: usize) -> Result<()> {
        if !(1..=4).contains(&self.components) {
            return Err(Error::InvalidComponents(self.components));
        }
        let row_bytes = self.row_bytes();
        if self.bounds.height() > 0 && self.row_stride.unsigned_abs() < row_bytes {
            return Err(Error::StrideTooSmall { stride: self.row_stride, row_bytes });
        }
        if self.row_stride.unsigned_abs() % self.depth.bytes() != 0 {
            return Err(Error::UnalignedStride { stride: self.row_stride, depth: self.depth });
        }
        if (ptr as usize) % self.depth.bytes() != 0 {
            return Err(Error::Misaligned { depth: self.depth });
        }
        // No slice can be that long
        let required = self
            .required_len()
            .ok_or(Error::BufferTooSmall { required: usize::MAX, actual: len })?;
        if len < required {
            return Err(Error::BufferTooSmall { required, actual: len });
        }
        Ok(())
    }

    /// Index of the memory row that stores scanline `y`.
    #[inline]
    fn memory_row(&self, y: i32) -> usize {
        if self.row_stride >= 0 {
            (y as i64 - self.bounds.y1 as i64) as usize
        } else {
            (self.bounds.y2 as i64 - 1 - y as i64) as usize
        }
    }

    /// Byte offset of the first pixel of scanline `y`, `None` outside bounds.
    #[inline]
    pub fn row_offset(&self, y: i32) -> Option<usize> {
        if y < self.bounds.y1 || y >= self.bounds.y2 || self.bounds.is_empty() {
            return None;
        }
        Some(self.memory_row(y) * self.row_stride.unsigned_abs())
    }

    /// Byte offset of pixel `(x, y)`, `None` outside bounds.
    #[inline]
    pub fn pixel_offset(&self, x: i32, y: i32) -> Option<usize> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let column = (x as i64 - self.bounds.x1 as i64) as usize;
        Some(self.row_offset(y)? + column * self.pixel_bytes())
    }
}

/// Read-only view over caller-owned pixel storage.
///
/// Source images may be read by many jobs at once; the view only ever hands
/// out shared slices.
///
/// # Example
///
/// ```rust
/// use rowfx_core::{ImageRef, Window};
///
/// let samples = [1.0f32, 0.5, 0.25, 1.0];
/// let img = ImageRef::from_samples(&samples, Window::new(3, 7, 4, 8), 4).unwrap();
///
/// assert_eq!(img.pixel::<f32>(3, 7), Some(&samples[..]));
/// assert_eq!(img.pixel::<f32>(0, 0), None);
/// assert_eq!(img.pixel::<u8>(3, 7), None); // wrong sample type
/// ```
#[derive(Clone, Copy)]
pub struct ImageRef<'a> {
    data: &'a [u8],
    layout: Layout,
}

impl<'a> ImageRef<'a> {
    /// Wraps raw bytes after validating the layout against them.
    pub fn new(
        data: &'a [u8],
        bounds: Window,
        components: usize,
        depth: BitDepth,
        row_stride: isize,
    ) -> Result<Self> {
        let layout = Layout { bounds, components, depth, row_stride };
        layout.validate(data.as_ptr(), data.len())?;
        Ok(Self { data, layout })
    }

    /// Wraps tightly packed top-down samples.
    pub fn from_samples<T: Component>(
        samples: &'a [T],
        bounds: Window,
        components: usize,
    ) -> Result<Self> {
        let layout = Layout::packed(bounds, components, T::DEPTH);
        let data: &'a [u8] = bytemuck::cast_slice(samples);
        layout.validate(data.as_ptr(), data.len())?;
        Ok(Self { data, layout })
    }

    pub(crate) fn from_parts(data: &'a [u8], layout: Layout) -> Self {
        Self { data, layout }
    }

    /// Buffer geometry.
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Pixel bounds.
    #[inline]
    pub fn bounds(&self) -> Window {
        self.layout.bounds
    }

    /// Samples per pixel.
    #[inline]
    pub fn components(&self) -> usize {
        self.layout.components
    }

    /// Sample type.
    #[inline]
    pub fn depth(&self) -> BitDepth {
        self.layout.depth
    }

    /// Bytes between rows.
    #[inline]
    pub fn row_stride(&self) -> isize {
        self.layout.row_stride
    }

    /// Clamp ceiling of the sample type.
    #[inline]
    pub fn max_value(&self) -> f32 {
        self.layout.max_value()
    }

    /// Raw storage handle, for accelerator launches.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// Scanline `y` typed as `T`.
    ///
    /// `None` when `y` is outside bounds or `T` is not the buffer's sample type.
    pub fn row<T: Component>(&self, y: i32) -> Option<SourceRow<'a, T>> {
        if T::DEPTH != self.layout.depth {
            return None;
        }
        let start = self.layout.row_offset(y)?;
        let bytes = self.data.get(start..start + self.layout.row_bytes())?;
        Some(SourceRow {
            x1: self.layout.bounds.x1,
            components: self.layout.components,
            samples: bytemuck::try_cast_slice(bytes).ok()?,
        })
    }

    /// Samples of pixel `(x, y)`, `None` outside bounds or on type mismatch.
    pub fn pixel<T: Component>(&self, x: i32, y: i32) -> Option<&'a [T]> {
        if T::DEPTH != self.layout.depth {
            return None;
        }
        let start = self.layout.pixel_offset(x, y)?;
        let bytes = self.data.get(start..start + self.layout.pixel_bytes())?;
        bytemuck::try_cast_slice(bytes).ok()
    }
}

impl std::fmt::Debug for ImageRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageRef")
            .field("bounds", &self.layout.bounds)
            .field("components", &self.layout.components)
            .field("depth", &self.layout.depth)
            .field("row_stride", &self.layout.row_stride)
            .finish()
    }
}

/// One scanline of a source image.
#[derive(Debug, Clone, Copy)]
pub struct SourceRow<'a, T> {
    x1: i32,
    components: usize,
    samples: &'a [T],
}

impl<'a, T: Component> SourceRow<'a, T> {
    /// Samples of column `x`, `None` outside the row.
    #[inline]
    pub fn pixel(&self, x: i32) -> Option<&'a [T]> {
        if x < self.x1 {
            return None;
        }
        let start = (x as i64 - self.x1 as i64) as usize * self.components;
        self.samples.get(start..start + self.components)
    }

    /// All samples of the row.
    #[inline]
    pub fn samples(&self) -> &'a [T] {
        self.samples
    }
}

/// Exclusive view over a destination buffer.
pub struct ImageMut<'a> {
    data: &'a mut [u8],
    layout: Layout,
}

impl<'a> ImageMut<'a> {
    /// Wraps raw bytes after validating the layout against them.
    pub fn new(
        data: &'a mut [u8],
        bounds: Window,
        components: usize,
        depth: BitDepth,
        row_stride: isize,
    ) -> Result<Self> {
        let layout = Layout { bounds, components, depth, row_stride };
        layout.validate(data.as_ptr(), data.len())?;
        Ok(Self { data, layout })
    }

    /// Wraps tightly packed top-down samples.
    pub fn from_samples<T: Component>(
        samples: &'a mut [T],
        bounds: Window,
        components: usize,
    ) -> Result<Self> {
        let layout = Layout::packed(bounds, components, T::DEPTH);
        let data: &'a mut [u8] = bytemuck::cast_slice_mut(samples);
        layout.validate(data.as_ptr(), data.len())?;
        Ok(Self { data, layout })
    }

    pub(crate) fn from_parts(data: &'a mut [u8], layout: Layout) -> Self {
        Self { data, layout }
    }

    /// Buffer geometry.
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Pixel bounds.
    #[inline]
    pub fn bounds(&self) -> Window {
        self.layout.bounds
    }

    /// Samples per pixel.
    #[inline]
    pub fn components(&self) -> usize {
        self.layout.components
    }

    /// Sample type.
    #[inline]
    pub fn depth(&self) -> BitDepth {
        self.layout.depth
    }

    /// Bytes between rows.
    #[inline]
    pub fn row_stride(&self) -> isize {
        self.layout.row_stride
    }

    /// Raw storage handle, for accelerator launches.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }

    /// Mutable samples of pixel `(x, y)`.
    pub fn pixel_mut<T: Component>(&mut self, x: i32, y: i32) -> Option<&mut [T]> {
        if T::DEPTH != self.layout.depth {
            return None;
        }
        let start = self.layout.pixel_offset(x, y)?;
        let end = start + self.layout.pixel_bytes();
        bytemuck::try_cast_slice_mut(self.data.get_mut(start..end)?).ok()
    }

    /// Splits the rows covered by `window` into disjoint mutable spans.
    ///
    /// Spans are returned in ascending `y` and cover exactly the window's
    /// x-range. The window is clipped to bounds. Returns `None` when `T` is
    /// not the buffer's sample type.
    ///
    /// ```rust
    /// use rowfx_core::{ImageMut, Window};
    ///
    /// let mut samples = vec![0u8; 4 * 4];
    /// let mut img = ImageMut::from_samples(&mut samples, Window::new(0, 0, 4, 4), 1).unwrap();
    ///
    /// let rows = img.rows_mut::<u8>(&Window::new(1, 1, 3, 3)).unwrap();
    /// assert_eq!(rows.len(), 2);
    /// assert_eq!(rows[0].y(), 1);
    /// assert_eq!(rows[0].width(), 2);
    /// ```
    pub fn rows_mut<T: Component>(&mut self, window: &Window) -> Option<Vec<RowSpan<'_, T>>> {
        if T::DEPTH != self.layout.depth {
            return None;
        }
        let layout = self.layout;
        let Some(clip) = layout.bounds.intersect(window) else {
            return Some(Vec::new());
        };

        let stride = layout.row_stride.unsigned_abs();
        let first = layout.memory_row(clip.y1).min(layout.memory_row(clip.y2 - 1));
        let count = clip.height();
        let start = (clip.x1 as i64 - layout.bounds.x1 as i64) as usize * layout.pixel_bytes();
        let span_bytes = clip.width() * layout.pixel_bytes();

        let mut rows = Vec::with_capacity(count);
        for (i, chunk) in self.data.chunks_mut(stride).skip(first).take(count).enumerate() {
            let memory_row = first + i;
            let y = if layout.row_stride >= 0 {
                layout.bounds.y1 + memory_row as i32
            } else {
                layout.bounds.y2 - 1 - memory_row as i32
            };
            let bytes = chunk.get_mut(start..start + span_bytes)?;
            rows.push(RowSpan {
                y,
                x1: clip.x1,
                components: layout.components,
                samples: bytemuck::try_cast_slice_mut(bytes).ok()?,
            });
        }
        if layout.row_stride < 0 {
            rows.reverse();
        }
        Some(rows)
    }
}

impl std::fmt::Debug for ImageMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageMut")
            .field("bounds", &self.layout.bounds)
            .field("components", &self.layout.components)
            .field("depth", &self.layout.depth)
            .field("row_stride", &self.layout.row_stride)
            .finish()
    }
}

/// Destination pixels of one scanline, restricted to a window's x-range.
///
/// The write cursor advances by exactly `components` samples per pixel.
#[derive(Debug)]
pub struct RowSpan<'a, T> {
    y: i32,
    x1: i32,
    components: usize,
    samples: &'a mut [T],
}

impl<'a, T: Component> RowSpan<'a, T> {
    /// Scanline index.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// First column (inclusive).
    #[inline]
    pub fn x1(&self) -> i32 {
        self.x1
    }

    /// Samples per pixel.
    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    /// Pixels in the span.
    #[inline]
    pub fn width(&self) -> usize {
        self.samples.len() / self.components
    }

    /// Pixels paired with their column index.
    pub fn pixels_mut(&mut self) -> impl Iterator<Item = (i32, &mut [T])> + '_ {
        let x1 = self.x1;
        self.samples
            .chunks_exact_mut(self.components)
            .enumerate()
            .map(move |(i, px)| (x1 + i as i32, px))
    }

    /// Writes `pixel` to every position of the span.
    pub fn fill(&mut self, pixel: &[T]) {
        for px in self.samples.chunks_exact_mut(self.components) {
            px.copy_from_slice(&pixel[..self.components]);
        }
    }

    /// Raw samples.
    #[inline]
    pub fn samples(&self) -> &[T] {
        self.samples
    }

    /// Raw samples, mutable.
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [T] {
        self.samples
    }
}
