//! Resolution harmonisation.
//!
//! The output grid is the tile's field of view divided by the target resolution, so
//! the resampled raster always covers exactly the same extent. The scale between
//! source and target may be fractional (15 to 10 is a 1.5x enlargement):
//!
//! - Upsampling (finer target) uses bilinear interpolation between source pixel
//!   centres, clamped at the edges.
//! - Downsampling (coarser target) averages the source pixels each output pixel
//!   covers, weighted by covered area. Whole factors reduce to the block mean. Both
//!   preserve the mean of physical quantities where nearest-neighbour or sums would
//!   not.

use crate::error::{CompositeError, Result};
use crate::tile::Tile;
use ndarray::{Array2, Zip};

/// Rescale `tile` to `target_resolution` earth units per pixel.
///
/// The field of view must be a whole number of target pixels on both axes. Equal
/// resolutions return a copy of the tile. The resampled tile keeps the extent,
/// labels and derived flag of its source.
pub fn resample(tile: &Tile, target_resolution: u32) -> Result<Tile> {
    if target_resolution == 0 {
        return Err(CompositeError::invalid(
            "resolution",
            target_resolution,
            "must be a positive integer",
        ));
    }

    let source_resolution = tile.resolution();
    if target_resolution == source_resolution {
        return Ok(tile.clone());
    }

    let (fov_x, fov_y) = tile.field_of_view();
    let r = i64::from(target_resolution);
    if fov_x % r != 0 || fov_y % r != 0 {
        return Err(CompositeError::invalid(
            "resolution",
            target_resolution,
            format!(
                "field of view ({}, {}) is not a whole number of pixels",
                fov_x, fov_y
            ),
        ));
    }
    let shape = ((fov_y / r) as usize, (fov_x / r) as usize);

    let raster = if target_resolution < source_resolution {
        tracing::debug!(
            "Upsampling {:?} tile to {:?} ({} -> {})",
            tile.shape(),
            shape,
            source_resolution,
            target_resolution
        );
        upsample_bilinear(tile.raster(), shape)
    } else if target_resolution % source_resolution == 0 {
        let factor = (target_resolution / source_resolution) as usize;
        tracing::debug!(
            "Downsampling {:?} tile by {}x ({} -> {})",
            tile.shape(),
            factor,
            source_resolution,
            target_resolution
        );
        block_mean(tile.raster(), factor)
    } else {
        tracing::debug!(
            "Downsampling {:?} tile to {:?} ({} -> {})",
            tile.shape(),
            shape,
            source_resolution,
            target_resolution
        );
        area_mean(tile.raster(), shape)
    };

    let meta = tile.meta().reshaped(target_resolution, tile.rect());
    Ok(Tile::new(meta, raster)?.mark_derived(tile.is_derived()))
}

/// Enlarge to `shape` with bilinear interpolation.
///
/// Each axis scales by `shape / src.dim()`, which need not be whole. Output pixel
/// centres are mapped back onto the source grid; samples beyond the outermost
/// source centres take the edge value.
pub fn upsample_bilinear(src: &Array2<f64>, shape: (usize, usize)) -> Array2<f64> {
    let (rows, cols) = src.dim();
    if shape == (rows, cols) || rows == 0 || cols == 0 {
        return src.clone();
    }

    let scale_y = shape.0 as f64 / rows as f64;
    let scale_x = shape.1 as f64 / cols as f64;
    let sample = |i: usize, len: usize, scale: f64| -> (usize, usize, f64) {
        let pos = ((i as f64 + 0.5) / scale - 0.5).clamp(0.0, (len - 1) as f64);
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(len - 1);
        (lo, hi, pos - lo as f64)
    };

    Array2::from_shape_fn(shape, |(r, c)| {
        let (y0, y1, dy) = sample(r, rows, scale_y);
        let (x0, x1, dx) = sample(c, cols, scale_x);

        let top = src[[y0, x0]] * (1.0 - dx) + src[[y0, x1]] * dx;
        let bottom = src[[y1, x0]] * (1.0 - dx) + src[[y1, x1]] * dx;
        top * (1.0 - dy) + bottom * dy
    })
}

/// Shrink by `factor` on both axes, each output pixel the mean of its block.
///
/// Trailing rows or columns that do not fill a whole block are dropped.
pub fn block_mean(src: &Array2<f64>, factor: usize) -> Array2<f64> {
    if factor <= 1 {
        return src.clone();
    }

    let (rows, cols) = src.dim();
    let mut out = Array2::<f64>::zeros((rows / factor, cols / factor));
    let n = (factor * factor) as f64;

    Zip::from(&mut out)
        .and(src.exact_chunks((factor, factor)))
        .for_each(|value, block| *value = block.sum() / n);

    out
}

/// Shrink to `shape`, each output pixel the area-weighted mean of the source
/// pixels it covers.
///
/// `shape` must not be larger than the source on either axis.
pub fn area_mean(src: &Array2<f64>, shape: (usize, usize)) -> Array2<f64> {
    let (rows, cols) = src.dim();
    if shape == (rows, cols) || shape.0 == 0 || shape.1 == 0 {
        return src.clone();
    }

    let row_weights = coverage(rows, shape.0);
    let col_weights = coverage(cols, shape.1);
    let area = (rows as f64 / shape.0 as f64) * (cols as f64 / shape.1 as f64);

    Array2::from_shape_fn(shape, |(r, c)| {
        let mut total = 0.0;
        for &(y, wy) in &row_weights[r] {
            for &(x, wx) in &col_weights[c] {
                total += src[[y, x]] * wy * wx;
            }
        }
        total / area
    })
}

/// For each of `out_len` output cells, the source cells it covers and by how much,
/// in source pixel units.
fn coverage(src_len: usize, out_len: usize) -> Vec<Vec<(usize, f64)>> {
    let step = src_len as f64 / out_len as f64;
    (0..out_len)
        .map(|i| {
            let start = i as f64 * step;
            let end = ((i + 1) as f64 * step).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);
            (first..last)
                .map(|j| {
                    let lo = start.max(j as f64);
                    let hi = end.min((j + 1) as f64);
                    (j, hi - lo)
                })
                .filter(|&(_, weight)| weight > 0.0)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{fand_a, lir, manannan, ramp};
    use ndarray::array;

    #[test]
    fn test_same_resolution_is_unchanged() {
        let tile = fand_a();
        let same = resample(&tile, 5).unwrap();
        assert_eq!(same.raster(), tile.raster());
        assert_eq!(same.rect(), tile.rect());
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let err = resample(&fand_a(), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_upsample_shape_and_extent() {
        let tile = lir();
        let fine = resample(&tile, 5).unwrap();

        assert_eq!(fine.shape(), (60, 120));
        assert_eq!(fine.rect(), tile.rect());
        assert_eq!(fine.resolution(), 5);
        assert!(!fine.is_derived());
    }

    #[test]
    fn test_upsample_constant_stays_constant() {
        let src = Array2::from_elem((3, 4), 7.5);
        let up = upsample_bilinear(&src, (9, 12));
        assert_eq!(up.dim(), (9, 12));
        assert!(up.iter().all(|&v| (v - 7.5).abs() < 1e-12));
    }

    #[test]
    fn test_upsample_interpolates_between_centres() {
        let src = array![[0.0, 4.0]];
        let up = upsample_bilinear(&src, (2, 4));

        // Outermost samples take the edge values, inner ones blend
        assert_eq!(up.dim(), (2, 4));
        assert_eq!(up[[0, 0]], 0.0);
        assert_eq!(up[[0, 1]], 1.0);
        assert_eq!(up[[0, 2]], 3.0);
        assert_eq!(up[[0, 3]], 4.0);
        assert_eq!(up.row(0), up.row(1));
    }

    #[test]
    fn test_block_mean() {
        let src = array![
            [1.0, 3.0, 10.0, 10.0],
            [5.0, 7.0, 20.0, 20.0],
        ];
        let down = block_mean(&src, 2);
        assert_eq!(down, array![[4.0, 15.0]]);
    }

    #[test]
    fn test_downsample_preserves_mean() {
        let tile = manannan();
        let coarse = resample(&tile, 75).unwrap();

        assert_eq!(coarse.shape(), (2, 6));
        let before = tile.raster().mean().unwrap();
        let after = coarse.raster().mean().unwrap();
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_downsample_requires_whole_pixels() {
        // 450 x 150 does not split into 60-unit pixels
        let err = resample(&manannan(), 60).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        // Nor into 20-unit pixels, although 20 is finer than 30 for Lir below
        let err = resample(&manannan(), 20).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        // Upsampling is held to the same rule: 600 x 300 is not a multiple of 7
        let err = resample(&lir(), 7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_fractional_upsample() {
        // 15 -> 10: the 450 x 150 field of view is 45 x 15 target pixels
        let tile = manannan();
        let fine = resample(&tile, 10).unwrap();

        assert_eq!(fine.shape(), (15, 45));
        assert_eq!(fine.rect(), tile.rect());
        assert_eq!(fine.resolution(), 10);
        assert_eq!(fine.raster()[[0, 0]], tile.raster()[[0, 0]]);
        assert_eq!(fine.raster()[[14, 44]], tile.raster()[[9, 29]]);

        // 30 -> 20 for Lir
        assert_eq!(resample(&lir(), 20).unwrap().shape(), (15, 30));
    }

    #[test]
    fn test_upsample_fractional_scale_interpolates() {
        let up = upsample_bilinear(&array![[0.0, 3.0]], (1, 3));
        assert_eq!(up, array![[0.0, 1.5, 3.0]]);
    }

    #[test]
    fn test_area_mean_weights_partial_pixels() {
        // Each output pixel covers one and a half source pixels
        let down = area_mean(&array![[0.0, 3.0, 6.0]], (1, 2));
        assert_eq!(down, array![[1.0, 5.0]]);
    }

    #[test]
    fn test_fractional_downsample_preserves_mean() {
        // 15 -> 25 is not a whole factor
        let tile = manannan();
        let coarse = resample(&tile, 25).unwrap();

        assert_eq!(coarse.shape(), (6, 18));
        assert_eq!(coarse.rect(), tile.rect());
        let before = tile.raster().mean().unwrap();
        let after = coarse.raster().mean().unwrap();
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_down_then_up_keeps_extent() {
        let tile = crate::testing::tile("Fand", 5, (0, 60), (0, 30), "2023-01-04 10:00:00", 0.0);
        let coarse = resample(&tile, 15).unwrap();
        let back = resample(&coarse, 5).unwrap();

        assert_eq!(back.shape(), tile.shape());
        assert_eq!(back.rect(), tile.rect());
        let first_block = ramp(6, 12, 0.0).slice(ndarray::s![0..3, 0..3]).mean().unwrap();
        assert_eq!(coarse.raster()[[0, 0]], first_block);
    }
}
