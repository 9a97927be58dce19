//! Zip tile bundles: a JSON metadata sidecar next to an `.npy` raster.

use crate::error::{CompositeError, Result};
use crate::io::metadata::parse_metadata;
use crate::tile::Tile;
use ndarray::Array2;
use ndarray_npy::{ReadNpyError, ReadNpyExt, ReadableElement};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Decodes one on-disk tile format.
pub trait TileDecoder {
    fn decode(&self, path: &Path) -> Result<Tile>;
}

/// Reader for zip bundles.
///
/// The archive may hold other members; the `.json` and `.npy` entries that sort
/// first by name are used.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipBundleDecoder;

impl TileDecoder for ZipBundleDecoder {
    fn decode(&self, path: &Path) -> Result<Tile> {
        let file = File::open(path)?;
        self.decode_reader(file)
    }
}

impl ZipBundleDecoder {
    /// Decode a bundle from any seekable source.
    pub fn decode_reader<R: Read + Seek>(&self, reader: R) -> Result<Tile> {
        let mut archive = ZipArchive::new(reader)?;

        let json_name = find_member(&archive, "json")?;
        let npy_name = find_member(&archive, "npy")?;

        let sidecar: serde_json::Value = {
            let entry = archive.by_name(&json_name)?;
            serde_json::from_reader(entry)?
        };
        let meta = parse_metadata(&sidecar)?;

        let mut bytes = Vec::new();
        archive.by_name(&npy_name)?.read_to_end(&mut bytes)?;
        let raster = read_raster(&bytes)?;

        tracing::debug!(
            "Decoded bundle members {} and {}: {:?} raster",
            json_name,
            npy_name,
            raster.dim()
        );

        Tile::new(meta, raster)
    }
}

fn find_member<R: Read + Seek>(archive: &ZipArchive<R>, extension: &str) -> Result<String> {
    archive
        .file_names()
        .filter(|name| {
            Path::new(name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .min()
        .map(str::to_string)
        .ok_or_else(|| CompositeError::Bundle(format!("no .{} member", extension)))
}

/// Read a 2-D array of any common numeric element type as `f64`.
fn read_raster(bytes: &[u8]) -> Result<Array2<f64>> {
    match Array2::<f64>::read_npy(bytes) {
        Err(ReadNpyError::WrongDescriptor(_)) => {}
        other => return Ok(other?),
    }

    try_as::<f32>(bytes, f64::from)
        .or_else(|| try_as::<i64>(bytes, |v| v as f64))
        .or_else(|| try_as::<i32>(bytes, f64::from))
        .or_else(|| try_as::<u16>(bytes, f64::from))
        .or_else(|| try_as::<u8>(bytes, f64::from))
        .unwrap_or_else(|| Array2::<f64>::read_npy(bytes).map_err(CompositeError::from))
}

/// `None` when the element type does not match, so the next one can be tried.
fn try_as<A>(bytes: &[u8], convert: impl Fn(A) -> f64) -> Option<Result<Array2<f64>>>
where
    A: ReadableElement + Copy,
{
    match Array2::<A>::read_npy(bytes) {
        Ok(array) => Some(Ok(array.mapv(convert))),
        Err(ReadNpyError::WrongDescriptor(_)) => None,
        Err(e) => Some(Err(e.into())),
    }
}
