//! Earth <-> pixel coordinate mapping.
//!
//! ## Coordinate systems
//!
//! - **Earth coordinates**: a flat integer grid. Tile extents and resolutions are
//!   expressed in earth units; y increases upward (north).
//! - **Pixel coordinates**: (column, row) indices into a raster. Row 0 is the top
//!   edge of the raster, rows increase downward (south).
//!
//! Point conversions ([`earth_to_pixel`], [`pixel_to_earth`]) are plain integer
//! scalings and never flip. The flip is applied only when a rectangle is mapped
//! into a frame ([`earth_rect_to_pixel_rect`]), because only the frame knows where
//! its top edge is.
//!
//! ## Rectangle convention
//!
//! Extents are half-open `[min, max)` in earth units. A frame's lower-left corner
//! `(x.min, y.min)` is the local origin (offset) for all pixel maths inside it.

use std::fmt;
use std::ops::Range;

/// Convert an earth coordinate to a pixel coordinate.
///
/// Uses floor division, so negative coordinates map to the pixel that contains
/// them rather than rounding toward zero.
///
/// ```
/// use aigean_mosaic::coords::earth_to_pixel;
/// assert_eq!(earth_to_pixel(10, 20, 5), (2, 4));
/// assert_eq!(earth_to_pixel(750, 250, 15), (50, 16));
/// ```
#[inline]
pub fn earth_to_pixel(x: i64, y: i64, resolution: u32) -> (i64, i64) {
    let r = i64::from(resolution);
    (x.div_euclid(r), y.div_euclid(r))
}

/// Convert a pixel coordinate to an earth coordinate.
///
/// Exact inverse of [`earth_to_pixel`] on resolution-aligned points. Saturates at
/// the ends of the `i64` range.
///
/// ```
/// use aigean_mosaic::coords::pixel_to_earth;
/// assert_eq!(pixel_to_earth(75, 25, 15), (1125, 375));
/// ```
#[inline]
pub fn pixel_to_earth(px: i64, py: i64, resolution: u32) -> (i64, i64) {
    let r = i64::from(resolution);
    (px.saturating_mul(r), py.saturating_mul(r))
}

/// Point mapper for a resolution and a local origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMapper {
    /// Earth units per pixel
    pub resolution: u32,

    /// Earth coordinate of pixel (0, 0) before any flip
    pub offset: (i64, i64),
}

impl GridMapper {
    /// Mapper anchored at the earth origin.
    pub fn new(resolution: u32) -> Self {
        Self::with_offset(resolution, (0, 0))
    }

    pub fn with_offset(resolution: u32, offset: (i64, i64)) -> Self {
        Self { resolution, offset }
    }

    pub fn to_pixel(&self, x: i64, y: i64) -> (i64, i64) {
        earth_to_pixel(x - self.offset.0, y - self.offset.1, self.resolution)
    }

    pub fn to_earth(&self, px: i64, py: i64) -> (i64, i64) {
        let (x, y) = pixel_to_earth(px, py, self.resolution);
        (x + self.offset.0, y + self.offset.1)
    }
}

/// A half-open interval `[min, max)` on one earth axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
    pub min: i64,
    pub max: i64,
}

impl Extent {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Length in earth units (zero or negative when empty), saturating when the
    /// span does not fit in an `i64`.
    pub fn len(&self) -> i64 {
        self.max.saturating_sub(self.min)
    }

    /// Length in earth units, or `None` when the span overflows.
    pub fn checked_len(&self) -> Option<i64> {
        self.max.checked_sub(self.min)
    }

    pub fn is_empty(&self) -> bool {
        self.max <= self.min
    }

    pub fn union(&self, other: &Extent) -> Extent {
        Extent::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Overlap with `other`. May be empty; check with [`Extent::is_empty`].
    pub fn intersection(&self, other: &Extent) -> Extent {
        Extent::new(self.min.max(other.min), self.max.min(other.max))
    }

    pub fn contains(&self, other: &Extent) -> bool {
        self.min <= other.min && other.max <= self.max
    }

    /// Integer midpoint, floor division.
    pub fn midpoint(&self) -> i64 {
        // Halve before adding so extents near the i64 limits cannot overflow
        self.min.div_euclid(2)
            + self.max.div_euclid(2)
            + (self.min.rem_euclid(2) + self.max.rem_euclid(2)) / 2
    }

    pub fn as_tuple(&self) -> (i64, i64) {
        (self.min, self.max)
    }
}

impl From<(i64, i64)> for Extent {
    fn from((min, max): (i64, i64)) -> Self {
        Extent::new(min, max)
    }
}

/// An axis-aligned rectangle in earth coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EarthRect {
    pub x: Extent,
    pub y: Extent,
}

impl EarthRect {
    pub fn new(x: impl Into<Extent>, y: impl Into<Extent>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &EarthRect) -> EarthRect {
        EarthRect {
            x: self.x.union(&other.x),
            y: self.y.union(&other.y),
        }
    }

    /// Overlapping region, or `None` when the rectangles only touch or are apart.
    pub fn intersection(&self, other: &EarthRect) -> Option<EarthRect> {
        let rect = EarthRect {
            x: self.x.intersection(&other.x),
            y: self.y.intersection(&other.y),
        };
        (!rect.is_empty()).then_some(rect)
    }

    pub fn contains(&self, other: &EarthRect) -> bool {
        self.x.contains(&other.x) && self.y.contains(&other.y)
    }

    /// Lower-left corner; the local origin of pixel maths inside this rectangle.
    pub fn offset(&self) -> (i64, i64) {
        (self.x.min, self.y.min)
    }

    pub fn field_of_view(&self) -> (i64, i64) {
        (self.x.len(), self.y.len())
    }

    pub fn centre(&self) -> (i64, i64) {
        (self.x.midpoint(), self.y.midpoint())
    }
}

impl fmt::Display for EarthRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x=({}, {}), y=({}, {})",
            self.x.min, self.x.max, self.y.min, self.y.max
        )
    }
}

/// A pixel window within a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    /// X offset (column) from top-left
    pub x: usize,
    /// Y offset (row) from top-left
    pub y: usize,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl PixelWindow {
    /// Create a new pixel window with the given offset and dimensions.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    pub fn rows(&self) -> Range<usize> {
        self.y..self.y + self.height
    }

    pub fn cols(&self) -> Range<usize> {
        self.x..self.x + self.width
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Dimensions as an ndarray shape `(rows, cols)`.
    pub fn dim(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

impl fmt::Display for PixelWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rows {:?}, cols {:?}", self.rows(), self.cols())
    }
}

/// Number of whole pixel rows in a frame.
fn frame_rows(frame: &EarthRect, resolution: u32) -> i64 {
    earth_to_pixel(0, frame.y.len(), resolution).1
}

/// Map an earth rectangle to its pixel window inside `frame`.
///
/// Both corners are converted relative to the frame's lower-left corner, then the
/// y-range is flipped against the frame height: the rectangle's *top* edge
/// (`y.max`) becomes the window's first row. Re-sorting the two converted y values
/// instead would place the window at the mirrored position.
///
/// Returns `None` when `rect` is not inside `frame`.
pub fn earth_rect_to_pixel_rect(
    rect: &EarthRect,
    frame: &EarthRect,
    resolution: u32,
) -> Option<PixelWindow> {
    if !frame.contains(rect) {
        return None;
    }

    let mapper = GridMapper::with_offset(resolution, frame.offset());
    let (col_start, py_min) = mapper.to_pixel(rect.x.min, rect.y.min);
    let (col_end, py_max) = mapper.to_pixel(rect.x.max, rect.y.max);

    // Flip: pixel rows count down from the frame top
    let rows = frame_rows(frame, resolution);
    let row_start = rows - py_max;
    let row_end = rows - py_min;

    Some(PixelWindow::new(
        usize::try_from(col_start).ok()?,
        usize::try_from(row_start).ok()?,
        usize::try_from(col_end - col_start).ok()?,
        usize::try_from(row_end - row_start).ok()?,
    ))
}

/// Map a pixel window inside `frame` back to earth coordinates.
///
/// Inverse of [`earth_rect_to_pixel_rect`] for resolution-aligned rectangles.
pub fn pixel_rect_to_earth_rect(
    window: &PixelWindow,
    frame: &EarthRect,
    resolution: u32,
) -> EarthRect {
    let mapper = GridMapper::with_offset(resolution, frame.offset());
    let rows = frame_rows(frame, resolution);

    let top = rows - window.y as i64;
    let bottom = top - window.height as i64;
    let (x_min, y_min) = mapper.to_earth(window.x as i64, bottom);
    let (x_max, y_max) = mapper.to_earth((window.x + window.width) as i64, top);

    EarthRect::new((x_min, x_max), (y_min, y_max))
}
