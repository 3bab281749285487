//! Integer pixel rectangles.
//!
//! [`Window`] describes both a buffer's bounds and the processing window of a
//! render call. Rectangles are half-open on both axes:
//!
//! ```text
//! [x1, x2) x [y1, y2)
//!
//! (x1,y1) ───────────► X
//!   │   ┌──────────┐
//!   │   │  window  │
//!   │   └──────────┘ (x2,y2) exclusive
//!   ▼
//!   Y
//! ```
//!
//! Coordinates are signed: hosts routinely place image bounds at negative
//! offsets (overscan, render scale).
//!
//! # Usage
//!
//! ```rust
//! use rowfx_core::Window;
//!
//! let bounds = Window::new(0, 0, 1920, 1080);
//! let window = Window::new(100, 100, 200, 150);
//!
//! assert!(bounds.contains_window(&window));
//! assert_eq!(window.pixel_count(), 5000);
//! ```

/// Half-open integer rectangle in pixel space.
///
/// A window with `x1 >= x2` or `y1 >= y2` is *degenerate*: it is a legal
/// value that covers no pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Window {
    /// Left edge (inclusive)
    pub x1: i32,
    /// Top edge (inclusive)
    pub y1: i32,
    /// Right edge (exclusive)
    pub x2: i32,
    /// Bottom edge (exclusive)
    pub y2: i32,
}

impl Window {
    /// Creates a window from its corners. Degenerate input is kept as is.
    #[inline]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Creates a window at the origin with the given size.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// Width in pixels, 0 when degenerate.
    #[inline]
    pub const fn width(&self) -> usize {
        if self.x2 > self.x1 {
            (self.x2 as i64 - self.x1 as i64) as usize
        } else {
            0
        }
    }

    /// Height in pixels, 0 when degenerate.
    #[inline]
    pub const fn height(&self) -> usize {
        if self.y2 > self.y1 {
            (self.y2 as i64 - self.y1 as i64) as usize
        } else {
            0
        }
    }

    /// Number of pixels covered.
    #[inline]
    pub const fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Returns `true` if the window covers no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    /// Returns `true` if `(x, y)` lies inside the window.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    /// Returns `true` if `other` is a non-degenerate subset of `self`.
    ///
    /// This is the bounds check applied to a processing window before any
    /// work is scheduled.
    ///
    /// ```rust
    /// use rowfx_core::Window;
    ///
    /// let bounds = Window::new(0, 0, 64, 64);
    /// assert!(bounds.contains_window(&Window::new(0, 0, 64, 64)));
    /// assert!(!bounds.contains_window(&Window::new(0, 0, 65, 64)));
    /// assert!(!bounds.contains_window(&Window::new(8, 8, 8, 16)));
    /// ```
    #[inline]
    pub const fn contains_window(&self, other: &Window) -> bool {
        !other.is_empty()
            && other.x1 >= self.x1
            && other.x2 <= self.x2
            && other.y1 >= self.y1
            && other.y2 <= self.y2
    }

    /// Intersection of two windows, `None` if they do not overlap.
    pub fn intersect(&self, other: &Window) -> Option<Window> {
        let w = Window::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        );
        if w.is_empty() { None } else { Some(w) }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}) x [{}, {})", self.x1, self.x2, self.y1, self.y2)
    }
}
