//! Folding an unordered collection of tiles into one mosaic.

use crate::error::{CompositeError, ErrorKind, Result};
use crate::tile::Tile;
use crate::transform::mosaic::{mosaic, MosaicOptions};
use std::collections::BTreeSet;

/// Failed pairings seen while reducing, deduplicated.
#[derive(Debug, Default)]
struct Failures {
    kinds: BTreeSet<ErrorKind>,
    causes: Vec<(ErrorKind, String)>,
}

impl Failures {
    fn record(&mut self, err: &CompositeError) {
        let kind = err.kind();
        let message = err.to_string();
        self.kinds.insert(kind);
        if !self.causes.iter().any(|(_, seen)| *seen == message) {
            self.causes.push((kind, message));
        }
    }

    /// Overlap failures are only reported when nothing else went wrong; otherwise the
    /// other causes are the actionable ones.
    fn into_error(self, merged: usize, total: usize) -> CompositeError {
        let only_overlap = self.kinds.iter().all(|&kind| kind == ErrorKind::Overlap);
        let causes = self
            .causes
            .into_iter()
            .filter(|(kind, _)| only_overlap || *kind != ErrorKind::Overlap)
            .map(|(_, message)| message)
            .collect();

        CompositeError::Composition {
            merged,
            total,
            kinds: self.kinds.into_iter().collect(),
            causes,
        }
    }
}

/// Mosaic every tile in `tiles` into one padded tile, whatever their order.
///
/// The resolution defaults to the finest among the tiles and is used for every fold,
/// so the result does not depend on which pair happens to be merged first. The first
/// ordered pair that mosaics seeds the result; each later pass folds in the first
/// remaining tile that mosaics with it. Fails with [`CompositeError::Composition`] if
/// any tile is left over; partial mosaics are never returned.
pub fn combine_unordered(tiles: &[Tile], resolution: Option<u32>) -> Result<Tile> {
    let total = tiles.len();
    if total < 2 {
        return Err(CompositeError::invalid(
            "tiles",
            total,
            "at least two tiles are needed to mosaic",
        ));
    }

    let resolution = match resolution {
        Some(0) => {
            return Err(CompositeError::invalid(
                "resolution",
                0,
                "must be a positive integer",
            ))
        }
        Some(resolution) => resolution,
        None => tiles.iter().map(Tile::resolution).min().unwrap_or(1),
    };
    let options = MosaicOptions::default().with_resolution(resolution);

    tracing::debug!("Combining {} tiles at resolution {}", total, resolution);

    let mut failures = Failures::default();
    let mut processed = vec![false; total];

    let Some(mut result) = seed_pair(tiles, &options, &mut processed, &mut failures) else {
        tracing::warn!("No pair among {} tiles could be mosaicked", total);
        return Err(failures.into_error(0, total));
    };

    for _ in 0..total - 2 {
        let mut folded = false;
        for (k, candidate) in tiles.iter().enumerate() {
            if processed[k] {
                continue;
            }
            match mosaic(&result, candidate, &options) {
                Ok(tile) => {
                    tracing::debug!("Folded tile {} into the mosaic", k);
                    result = tile;
                    processed[k] = true;
                    folded = true;
                    break;
                }
                Err(err) => {
                    tracing::debug!("Tile {} rejected: {}", k, err);
                    failures.record(&err);
                }
            }
        }
        if !folded {
            break;
        }
    }

    let merged = processed.iter().filter(|&&done| done).count();
    if merged < total {
        tracing::warn!("Mosaicked {} of {} tiles", merged, total);
        return Err(failures.into_error(merged, total));
    }

    tracing::info!(
        "Mosaicked {} tiles into {} at resolution {}",
        total,
        result.rect(),
        resolution
    );
    Ok(result)
}

/// First ordered pair `(i, j)`, `i != j`, that mosaics.
fn seed_pair(
    tiles: &[Tile],
    options: &MosaicOptions,
    processed: &mut [bool],
    failures: &mut Failures,
) -> Option<Tile> {
    for (i, a) in tiles.iter().enumerate() {
        for (j, b) in tiles.iter().enumerate() {
            if i == j {
                continue;
            }
            match mosaic(a, b, options) {
                Ok(tile) => {
                    tracing::debug!("Seeded mosaic with tiles {} and {}", i, j);
                    processed[i] = true;
                    processed[j] = true;
                    return Some(tile);
                }
                Err(err) => {
                    tracing::debug!("Pair ({}, {}) rejected: {}", i, j, err);
                    failures.record(&err);
                }
            }
        }
    }
    None
}
