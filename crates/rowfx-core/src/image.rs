//! Owned pixel storage.
//!
//! [`ImageBuf`] owns tightly packed, top-down samples and hands out
//! [`ImageRef`]/[`ImageMut`] views. Hosts normally supply their own memory;
//! this type serves callers that render into engine-allocated frames, and
//! the test suites.

use crate::buffer::{ImageMut, ImageRef, Layout};
use crate::format::Component;
use crate::rect::Window;
use crate::{Error, Result};

/// Owned image with typed samples.
///
/// # Example
///
/// ```rust
/// use rowfx_core::{ImageBuf, Window};
///
/// let mut img = ImageBuf::<u8>::filled(Window::new(0, 0, 2, 2), 4, &[255, 0, 0, 255]).unwrap();
/// assert_eq!(img.pixel(1, 1), Some(&[255u8, 0, 0, 255][..]));
///
/// img.pixel_mut(0, 0).unwrap()[1] = 128;
/// assert_eq!(img.view().pixel::<u8>(0, 0), Some(&[255u8, 128, 0, 255][..]));
/// ```
#[derive(Clone, PartialEq)]
pub struct ImageBuf<T> {
    data: Vec<T>,
    bounds: Window,
    components: usize,
}

impl<T: Component> ImageBuf<T> {
    /// Allocates a zeroed image.
    pub fn new(bounds: Window, components: usize) -> Result<Self> {
        if !(1..=4).contains(&components) {
            return Err(Error::InvalidComponents(components));
        }
        Ok(Self {
            data: vec![T::zero(); bounds.pixel_count() as usize * components],
            bounds,
            components,
        })
    }

    /// Allocates an image with every pixel set to `pixel`.
    pub fn filled(bounds: Window, components: usize, pixel: &[T]) -> Result<Self> {
        if pixel.len() != components {
            return Err(Error::SampleCountMismatch { expected: components, actual: pixel.len() });
        }
        let mut img = Self::new(bounds, components)?;
        for px in img.data.chunks_exact_mut(components) {
            px.copy_from_slice(pixel);
        }
        Ok(img)
    }

    /// Takes ownership of packed top-down samples.
    pub fn from_vec(data: Vec<T>, bounds: Window, components: usize) -> Result<Self> {
        if !(1..=4).contains(&components) {
            return Err(Error::InvalidComponents(components));
        }
        let expected = bounds.pixel_count() as usize * components;
        if data.len() != expected {
            return Err(Error::SampleCountMismatch { expected, actual: data.len() });
        }
        Ok(Self { data, bounds, components })
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(bounds: Window, components: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(i32, i32) -> [T; 4],
    {
        let mut img = Self::new(bounds, components)?;
        let width = bounds.width().max(1);
        for (i, px) in img.data.chunks_exact_mut(components).enumerate() {
            let x = bounds.x1 + (i % width) as i32;
            let y = bounds.y1 + (i / width) as i32;
            px.copy_from_slice(&f(x, y)[..components]);
        }
        Ok(img)
    }

    /// Pixel bounds.
    #[inline]
    pub fn bounds(&self) -> Window {
        self.bounds
    }

    /// Samples per pixel.
    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    /// All samples, row-major.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the image, returning its samples.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    fn layout(&self) -> Layout {
        Layout::packed(self.bounds, self.components, T::DEPTH)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let col = (x as i64 - self.bounds.x1 as i64) as usize;
        let row = (y as i64 - self.bounds.y1 as i64) as usize;
        Some((row * self.bounds.width() + col) * self.components)
    }

    /// Samples of pixel `(x, y)`.
    pub fn pixel(&self, x: i32, y: i32) -> Option<&[T]> {
        let i = self.index(x, y)?;
        self.data.get(i..i + self.components)
    }

    /// Mutable samples of pixel `(x, y)`.
    pub fn pixel_mut(&mut self, x: i32, y: i32) -> Option<&mut [T]> {
        let i = self.index(x, y)?;
        self.data.get_mut(i..i + self.components)
    }

    /// Read-only view for use as a job source.
    pub fn view(&self) -> ImageRef<'_> {
        let layout = self.layout();
        ImageRef::from_parts(bytemuck::cast_slice(&self.data), layout)
    }

    /// Exclusive view for use as a job destination.
    pub fn view_mut(&mut self) -> ImageMut<'_> {
        let layout = self.layout();
        ImageMut::from_parts(bytemuck::cast_slice_mut(&mut self.data), layout)
    }
}

impl<T: Component> std::fmt::Debug for ImageBuf<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBuf")
            .field("bounds", &self.bounds)
            .field("components", &self.components)
            .field("depth", &T::DEPTH)
            .finish()
    }
}
