//! Aigean Mosaic
//!
//! Compositing of geo-referenced satellite raster tiles on a shared integer earth
//! grid: same-day addition, cross-day subtraction, resolution harmonisation and
//! mosaicing of any number of overlapping tiles.
//!
//! # Architecture
//!
//! - **Coords**: earth/pixel conversion and the rectangle types placements use
//! - **Tile**: the immutable raster-plus-metadata value
//! - **Transform**: alignment, resampling, two-tile mosaic and the unordered reducer
//! - **I/O**: metadata sidecars, zip bundles and the directory loader
//!
//! # Usage
//!
//! ```no_run
//! use aigean_mosaic::{combine_unordered, TileLoader};
//!
//! fn main() -> anyhow::Result<()> {
//!     let loader = TileLoader::new("data");
//!     let tiles = loader.load_all(&[
//!         "aigean_fan_20230104_150010.zip",
//!         "aigean_lir_20230104_145310.zip",
//!     ])?;
//!     let mosaic = combine_unordered(&tiles, None)?;
//!     println!("{}", mosaic.output_filename());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod coords;
pub mod error;
pub mod io;
pub mod report;
pub mod tile;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, InputConfig, MosaicConfig};
pub use coords::{earth_to_pixel, pixel_to_earth, EarthRect, Extent, PixelWindow};
pub use error::{CompositeError, ErrorKind};
pub use io::{load_tile, TileLoader};
pub use report::MetadataReport;
pub use tile::{Tile, TileMeta};
pub use transform::{add, combine_unordered, mosaic, resample, sub, MosaicOptions};

use anyhow::{Context, Result};

/// Load the configured tiles and mosaic them into one.
///
/// With padding every tile goes through the unordered reducer. Cropping is only
/// defined for a pair, so `padding: false` requires exactly two files.
pub fn run_mosaic(config: &Config) -> Result<Tile> {
    config.validate()?;

    let files = &config.input.files;
    if files.len() < 2 {
        anyhow::bail!("At least two input files are needed, got {}", files.len());
    }
    if !config.mosaic.padding && files.len() != 2 {
        anyhow::bail!(
            "Mosaicing without padding takes exactly two files, got {}",
            files.len()
        );
    }

    tracing::info!(
        "Loading {} tiles from {}",
        files.len(),
        config.input.data_dir.display()
    );
    let loader = TileLoader::new(&config.input.data_dir);
    let tiles = loader
        .load_all(files)
        .with_context(|| format!("Loading tiles from {}", config.input.data_dir.display()))?;

    let result = if config.mosaic.padding {
        combine_unordered(&tiles, config.mosaic.resolution)?
    } else {
        mosaic(&tiles[0], &tiles[1], &config.mosaic.options())?
    };

    tracing::info!(
        "Mosaic complete: {} at resolution {}, {:?} pixels",
        result.rect(),
        result.resolution(),
        result.shape()
    );

    Ok(result)
}
