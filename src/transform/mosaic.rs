//! Mosaicing two tiles of possibly different resolutions.
//!
//! Both operands are resampled to a common resolution and added over their union.
//! Without padding the padded mosaic is then cropped to one of four candidate
//! windows:
//!
//! 1. the overlap columns across every union row,
//! 2. the overlap rows across every union column,
//! 3. the left operand's own footprint,
//! 4. the right operand's own footprint.
//!
//! The largest candidate by pixel area wins, ties going to the earlier one. This is a
//! heuristic: the chosen window maximises coverage among those four shapes but may
//! still contain zero padding, and it is not the tightest fully covered rectangle in
//! general.

use crate::coords::{pixel_rect_to_earth_rect, EarthRect, PixelWindow};
use crate::error::{CompositeError, Result};
use crate::tile::Tile;
use crate::transform::align::{add, intersection_rect, place};
use crate::transform::resample::resample;
use ndarray::s;

/// Options for [`mosaic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicOptions {
    /// Output resolution; the finer of the two operands when unset
    pub resolution: Option<u32>,

    /// Keep the full union extent (zero where uncovered) instead of cropping
    pub padding: bool,
}

impl Default for MosaicOptions {
    fn default() -> Self {
        Self {
            resolution: None,
            padding: true,
        }
    }
}

impl MosaicOptions {
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn without_padding(mut self) -> Self {
        self.padding = false;
        self
    }
}

/// Candidate crop windows for a non-padded mosaic, in selection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropCandidate {
    OverlapColumns,
    OverlapRows,
    Left,
    Right,
}

/// Combine two overlapping tiles into one at a common resolution.
///
/// The extents must intersect in both modes. Addition rules apply after
/// resampling, so the operands must also share a capture day. The result carries the
/// left operand's metadata.
pub fn mosaic(a: &Tile, b: &Tile, options: &MosaicOptions) -> Result<Tile> {
    let overlap = intersection_rect(a, b)?;

    let resolution = match options.resolution {
        Some(0) => {
            return Err(CompositeError::invalid(
                "resolution",
                0,
                "must be a positive integer",
            ))
        }
        Some(resolution) => resolution,
        None => a.resolution().min(b.resolution()),
    };

    let left = resample(a, resolution)?;
    let right = resample(b, resolution)?;
    let padded = add(&left, &right)?;

    if options.padding {
        tracing::debug!(
            "Mosaic with padding: {} at resolution {}",
            padded.rect(),
            resolution
        );
        return Ok(padded);
    }

    let frame = padded.rect();
    let candidates = crop_candidates(&overlap, &left.rect(), &right.rect(), &frame, resolution)?;
    let (choice, window) = largest(&candidates);

    let extent = pixel_rect_to_earth_rect(&window, &frame, resolution);
    tracing::debug!(
        "Mosaic without padding: cropping {} to {:?} window {} ({})",
        frame,
        choice,
        window,
        extent
    );

    let raster = padded
        .raster()
        .slice(s![window.rows(), window.cols()])
        .to_owned();

    Tile::derived(left.meta().reshaped(resolution, extent), raster)
}

/// The four crop windows inside the padded mosaic's frame.
pub fn crop_candidates(
    overlap: &EarthRect,
    left: &EarthRect,
    right: &EarthRect,
    frame: &EarthRect,
    resolution: u32,
) -> Result<[(CropCandidate, PixelWindow); 4]> {
    let full = place(frame, frame, resolution)?;
    let shared = place(overlap, frame, resolution)?;

    Ok([
        (
            CropCandidate::OverlapColumns,
            PixelWindow::new(shared.x, full.y, shared.width, full.height),
        ),
        (
            CropCandidate::OverlapRows,
            PixelWindow::new(full.x, shared.y, full.width, shared.height),
        ),
        (CropCandidate::Left, place(left, frame, resolution)?),
        (CropCandidate::Right, place(right, frame, resolution)?),
    ])
}

/// Largest window by area; the first one wins ties.
fn largest(candidates: &[(CropCandidate, PixelWindow); 4]) -> (CropCandidate, PixelWindow) {
    let mut best = candidates[0];
    for &candidate in &candidates[1..] {
        if candidate.1.area() > best.1.area() {
            best = candidate;
        }
    }
    best
}
