//! Tile decoding: metadata sidecars, zip bundles and the directory loader.

mod bundle;
mod loader;
pub mod metadata;

pub use bundle::{TileDecoder, ZipBundleDecoder};
pub use loader::{load_tile, TileFormat, TileLoader};
pub use metadata::{describe, parse_metadata, NO_INFORMATION};
