//! Locating tile files and dispatching them to a decoder.

use crate::error::{CompositeError, Result};
use crate::io::bundle::{TileDecoder, ZipBundleDecoder};
use crate::tile::Tile;
use std::path::{Path, PathBuf};

/// On-disk tile formats, recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileFormat {
    /// Zip archive with a JSON sidecar and an `.npy` raster
    ZipBundle,
    Asdf,
    Hdf5,
}

impl TileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "zip" => Ok(TileFormat::ZipBundle),
            "asdf" => Ok(TileFormat::Asdf),
            "hdf5" | "h5" => Ok(TileFormat::Hdf5),
            _ => Err(CompositeError::UnsupportedFormat(format!(
                "{}: unrecognised extension",
                path.display()
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TileFormat::ZipBundle => "zip bundle",
            TileFormat::Asdf => "ASDF",
            TileFormat::Hdf5 => "HDF5",
        }
    }

    /// Decoder for this format, if one is built in.
    pub fn decoder(self) -> Option<Box<dyn TileDecoder>> {
        match self {
            TileFormat::ZipBundle => Some(Box::new(ZipBundleDecoder)),
            TileFormat::Asdf | TileFormat::Hdf5 => None,
        }
    }
}

/// Loads tiles by name from one data directory.
#[derive(Debug, Clone)]
pub struct TileLoader {
    data_dir: PathBuf,
}

impl TileLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of `identifier` inside the data directory; fails if no such file exists.
    pub fn resolve(&self, identifier: &str) -> Result<PathBuf> {
        let path = self.data_dir.join(identifier);
        if !path.is_file() {
            return Err(CompositeError::NotFound(path.display().to_string()));
        }
        Ok(path)
    }

    pub fn load(&self, identifier: &str) -> Result<Tile> {
        let path = self.resolve(identifier)?;
        load_tile(&path)
    }

    /// Load every identifier, stopping at the first failure.
    pub fn load_all<S: AsRef<str>>(&self, identifiers: &[S]) -> Result<Vec<Tile>> {
        identifiers
            .iter()
            .map(|identifier| self.load(identifier.as_ref()))
            .collect()
    }
}

/// Decode the tile at `path`, picking the decoder from its extension.
pub fn load_tile(path: &Path) -> Result<Tile> {
    if !path.is_file() {
        return Err(CompositeError::NotFound(path.display().to_string()));
    }

    let format = TileFormat::from_path(path)?;
    let decoder = format.decoder().ok_or_else(|| {
        CompositeError::UnsupportedFormat(format!(
            "{}: no {} decoder",
            path.display(),
            format.name()
        ))
    })?;

    let tile = decoder.decode(path)?;
    tracing::info!(
        "Loaded {} {} tile from {} ({})",
        tile.meta().instrument,
        tile.meta().obs_date_string(),
        path.display(),
        tile.rect()
    );
    Ok(tile)
}
