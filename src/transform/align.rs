//! Alignment of two same-resolution tiles: union and intersection frames, operand
//! placement, and the addition/subtraction combinators built on them.

use crate::coords::{earth_rect_to_pixel_rect, EarthRect, PixelWindow};
use crate::error::{CompositeError, Result};
use crate::tile::Tile;
use ndarray::{s, Array2};

/// Placement of two operands inside a shared frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    /// Output rectangle in earth coordinates
    pub frame: EarthRect,

    /// Output raster size as a window anchored at (0, 0)
    pub output: PixelWindow,

    /// Where the left operand lands in the output
    pub left: PixelWindow,

    /// Where the right operand lands in the output
    pub right: PixelWindow,
}

impl Alignment {
    /// Align both operands inside their union rectangle.
    pub fn union(a: &Tile, b: &Tile) -> Result<Self> {
        let resolution = check_resolution(a, b)?;
        let frame = a.rect().union(&b.rect());
        Self::within(frame, a, b, resolution)
    }

    fn within(frame: EarthRect, a: &Tile, b: &Tile, resolution: u32) -> Result<Self> {
        for (name, extent) in [("xcoords", frame.x), ("ycoords", frame.y)] {
            if extent.checked_len().is_none() {
                return Err(CompositeError::invalid(
                    name,
                    format!("{:?}", extent.as_tuple()),
                    "combined extent is too large to measure",
                ));
            }
        }

        let alignment = Self {
            frame,
            output: place(&frame, &frame, resolution)?,
            left: place(&a.rect(), &frame, resolution)?,
            right: place(&b.rect(), &frame, resolution)?,
        };

        tracing::debug!(
            "Aligned in frame {} at resolution {}: output {}, left {}, right {}",
            frame,
            resolution,
            alignment.output,
            alignment.left,
            alignment.right
        );

        Ok(alignment)
    }
}

/// Per-axis union of two tile extents.
pub fn union_rect(a: &Tile, b: &Tile) -> EarthRect {
    a.rect().union(&b.rect())
}

/// Per-axis intersection of two tile extents.
///
/// Fails with [`CompositeError::Overlap`] when the intersection is empty on either
/// axis. Touching edges count as empty.
pub fn intersection_rect(a: &Tile, b: &Tile) -> Result<EarthRect> {
    a.rect()
        .intersection(&b.rect())
        .ok_or_else(|| CompositeError::Overlap {
            x: a.x_extent().as_tuple(),
            y: a.y_extent().as_tuple(),
            other_x: b.x_extent().as_tuple(),
            other_y: b.y_extent().as_tuple(),
        })
}

/// Pixel window of `rect` inside `frame`.
pub(crate) fn place(rect: &EarthRect, frame: &EarthRect, resolution: u32) -> Result<PixelWindow> {
    earth_rect_to_pixel_rect(rect, frame, resolution).ok_or_else(|| CompositeError::OutsideFrame {
        rect: rect.to_string(),
        frame: frame.to_string(),
    })
}

fn check_resolution(a: &Tile, b: &Tile) -> Result<u32> {
    if a.resolution() != b.resolution() {
        return Err(CompositeError::ResolutionMismatch {
            left: a.resolution(),
            right: b.resolution(),
        });
    }
    Ok(a.resolution())
}

/// Both origins must sit on the same pixel grid, otherwise the operands' pixels
/// straddle each other and slices of the overlap differ in size.
fn check_grid(a: &Tile, b: &Tile, resolution: u32) -> Result<()> {
    let r = i64::from(resolution);
    let (ax, ay) = a.rect().offset();
    let (bx, by) = b.rect().offset();
    if ax.rem_euclid(r) != bx.rem_euclid(r) || ay.rem_euclid(r) != by.rem_euclid(r) {
        return Err(CompositeError::GridMismatch {
            resolution,
            dx: ax.saturating_sub(bx),
            dy: ay.saturating_sub(by),
        });
    }
    Ok(())
}

fn check_window(window: &PixelWindow, raster: &Array2<f64>) -> Result<()> {
    if window.dim() != raster.dim() {
        return Err(CompositeError::ShapeMismatch {
            expected: window.dim(),
            actual: raster.dim(),
        });
    }
    Ok(())
}

/// Combine two same-day tiles over their union.
///
/// The output is zero where neither operand has data. `b` is written after `a`, so
/// it wins wherever the two overlap. Metadata comes from `a`.
pub fn add(a: &Tile, b: &Tile) -> Result<Tile> {
    let resolution = check_resolution(a, b)?;
    if a.meta().obs_day() != b.meta().obs_day() {
        return Err(CompositeError::DateMismatch(format!(
            "addition needs captures from the same day, got {} and {}",
            a.meta().obs_day(),
            b.meta().obs_day()
        )));
    }
    check_grid(a, b, resolution)?;

    let alignment = Alignment::union(a, b)?;
    check_window(&alignment.left, a.raster())?;
    check_window(&alignment.right, b.raster())?;

    let mut raster = Array2::<f64>::zeros(alignment.output.dim());
    raster
        .slice_mut(s![alignment.left.rows(), alignment.left.cols()])
        .assign(a.raster());
    raster
        .slice_mut(s![alignment.right.rows(), alignment.right.cols()])
        .assign(b.raster());

    Tile::derived(a.meta().reshaped(resolution, alignment.frame), raster)
}

/// Difference of two tiles from different days over their intersection.
///
/// The output raster is `a - b` on the overlapping pixels. Metadata comes from `a`.
pub fn sub(a: &Tile, b: &Tile) -> Result<Tile> {
    let resolution = check_resolution(a, b)?;
    if a.meta().obs_day() == b.meta().obs_day() {
        return Err(CompositeError::DateMismatch(format!(
            "subtraction needs captures from different days, both are {}",
            a.meta().obs_day()
        )));
    }
    let overlap = intersection_rect(a, b)?;
    check_grid(a, b, resolution)?;

    // Window of the overlap inside each operand's own frame
    let in_a = place(&overlap, &a.rect(), resolution)?;
    let in_b = place(&overlap, &b.rect(), resolution)?;
    if in_a.dim() != in_b.dim() {
        return Err(CompositeError::ShapeMismatch {
            expected: in_a.dim(),
            actual: in_b.dim(),
        });
    }

    tracing::debug!(
        "Subtracting over {}: left {}, right {}",
        overlap,
        in_a,
        in_b
    );

    let raster = &a.raster().slice(s![in_a.rows(), in_a.cols()])
        - &b.raster().slice(s![in_b.rows(), in_b.cols()]);

    Tile::derived(a.meta().reshaped(resolution, overlap), raster)
}
