//! Tile fixtures shared by unit tests, plus helpers to write them to disk.
//!
//! Extents, resolutions and dates follow the archive's Fand, Lir and Manannan
//! sample observations.

use crate::coords::EarthRect;
use crate::tile::{Tile, TileMeta, OBS_DATE_FORMAT};
use chrono::NaiveDateTime;
use ndarray::Array2;
use ndarray_npy::{WritableElement, WriteNpyExt};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub(crate) fn obs(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, OBS_DATE_FORMAT).unwrap()
}

/// Raster whose values encode their position: `seed + row * cols + col`.
pub(crate) fn ramp(rows: usize, cols: usize, seed: f64) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |(r, c)| seed + (r * cols + c) as f64)
}

/// Build a tile with a ramp raster sized from its extent.
pub(crate) fn tile(
    instrument: &str,
    resolution: u32,
    x: (i64, i64),
    y: (i64, i64),
    date: &str,
    seed: f64,
) -> Tile {
    let meta = TileMeta::new(resolution, EarthRect::new(x, y), obs(date))
        .archive("ISA")
        .instrument(instrument)
        .observatory("Aigean");
    let (rows, cols) = meta.expected_shape();
    Tile::new(meta, ramp(rows, cols, seed)).unwrap()
}

/// Fand, 2023-01-04: x=(450, 675), y=(150, 200), resolution 5.
pub(crate) fn fand_a() -> Tile {
    tile("Fand", 5, (450, 675), (150, 200), "2023-01-04 15:00:10", 1.0)
}

/// Fand, 2023-01-12: x=(600, 825), y=(150, 200), resolution 5.
pub(crate) fn fand_b() -> Tile {
    tile("Fand", 5, (600, 825), (150, 200), "2023-01-12 07:47:02", 1000.0)
}

/// [`fand_b`] moved to the capture day of [`fand_a`].
pub(crate) fn fand_b_same_day() -> Tile {
    tile("Fand", 5, (600, 825), (150, 200), "2023-01-04 14:53:10", 1000.0)
}

/// Lir, 2023-01-04: x=(100, 700), y=(0, 300), resolution 30.
pub(crate) fn lir() -> Tile {
    tile("Lir", 30, (100, 700), (0, 300), "2023-01-04 14:53:10", 5000.0)
}

/// Manannan, 2022-12-05: x=(750, 1200), y=(250, 400), resolution 15.
pub(crate) fn manannan() -> Tile {
    tile("Manannan", 15, (750, 1200), (250, 400), "2022-12-05 19:45:10", 0.0)
}

/// Sidecar JSON describing `tile` the way archive bundles do.
pub(crate) fn sidecar(tile: &Tile) -> serde_json::Value {
    let meta = tile.meta();
    serde_json::json!({
        "archive": &*meta.archive,
        "instrument": &*meta.instrument,
        "observatory": &*meta.observatory,
        "resolution": meta.resolution,
        "xcoords": [meta.extent.x.min, meta.extent.x.max],
        "ycoords": [meta.extent.y.min, meta.extent.y.max],
        "date": meta.obs_date.format("%Y-%m-%d").to_string(),
        "time": meta.obs_date.format("%H:%M:%S").to_string(),
    })
}

/// Write `tile` as a zip bundle named `name` under `dir`.
pub(crate) fn write_bundle(dir: &Path, name: &str, tile: &Tile) -> PathBuf {
    write_bundle_with(dir, name, &sidecar(tile), tile.raster())
}

/// Write a zip bundle from raw parts, with an unrelated member ahead of them.
pub(crate) fn write_bundle_with<A: WritableElement>(
    dir: &Path,
    name: &str,
    sidecar: &serde_json::Value,
    raster: &Array2<A>,
) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    writer.start_file("manifest.txt", options).unwrap();
    writer.write_all(b"ISA tile bundle\n").unwrap();

    writer.start_file("meta.json", options).unwrap();
    serde_json::to_writer(&mut writer, sidecar).unwrap();

    writer.start_file("data.npy", options).unwrap();
    raster.write_npy(&mut writer).unwrap();

    writer.finish().unwrap();
    path
}
