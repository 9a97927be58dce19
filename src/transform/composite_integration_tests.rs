//! End-to-end compositing scenarios, from bundles on disk to mosaics.
//!
//! Tests cover:
//! 1. Loading archive bundles and mosaicing across instruments
//! 2. Subtraction of the same scene on two days
//! 3. Padding versus cropping on a real pair
//! 4. Order independence of the reducer on loaded tiles
//! 5. Resampling inside a mosaic

use crate::coords::earth_to_pixel;
use crate::error::ErrorKind;
use crate::io::TileLoader;
use crate::testing::{fand_a, fand_b, fand_b_same_day, lir, manannan, tile, write_bundle};
use crate::transform::{add, combine_unordered, mosaic, resample, sub, MosaicOptions};
use ndarray::s;
use tempfile::TempDir;

fn archive_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_bundle(dir.path(), "aigean_fan_20230104_150010.zip", &fand_a());
    write_bundle(dir.path(), "aigean_fan_20230112_074702.zip", &fand_b());
    write_bundle(dir.path(), "aigean_fan_20230104_145310.zip", &fand_b_same_day());
    write_bundle(dir.path(), "aigean_lir_20230104_145310.zip", &lir());
    write_bundle(dir.path(), "aigean_man_20221205_194510.zip", &manannan());
    dir
}

/// Test 1: Fand and Lir from disk mosaic to Lir's footprint at Fand's resolution
#[test]
fn test_loaded_cross_instrument_mosaic() {
    let dir = archive_dir();
    let loader = TileLoader::new(dir.path());
    let fand = loader.load("aigean_fan_20230104_150010.zip").unwrap();
    let lir = loader.load("aigean_lir_20230104_145310.zip").unwrap();

    for options in [MosaicOptions::default(), MosaicOptions::default().without_padding()] {
        let result = mosaic(&fand, &lir, &options).unwrap();
        assert_eq!(result.centre(), (400, 150));
        assert_eq!(result.resolution(), 5);
        assert_eq!(result.output_filename(), "Aigean_Fand_20230104_150010_extra.png");
    }

    // Fand's pixels survive untouched inside the upsampled Lir frame
    let result = mosaic(&lir, &fand, &MosaicOptions::default()).unwrap();
    let (col, _) = earth_to_pixel(450 - 100, 0, 5);
    let top_row = (300 - 200) / 5;
    let window = result
        .raster()
        .slice(s![top_row..top_row + 10, col as usize..col as usize + 45]);
    assert_eq!(window, fand.raster());
}

/// Test 2: Subtracting two days of the same Fand strip
#[test]
fn test_loaded_subtraction() {
    let dir = archive_dir();
    let loader = TileLoader::new(dir.path());
    let tiles = loader
        .load_all(&["aigean_fan_20230104_150010.zip", "aigean_fan_20230112_074702.zip"])
        .unwrap();

    let diff = sub(&tiles[0], &tiles[1]).unwrap();
    let expected = &tiles[0].raster().slice(s![.., 30..45]) - &tiles[1].raster().slice(s![.., 0..15]);
    assert_eq!(diff.raster(), &expected);
    assert_eq!(diff.field_of_view(), (75, 50));

    // The same pair cannot be added
    assert_eq!(add(&tiles[0], &tiles[1]).unwrap_err().kind(), ErrorKind::DateMismatch);
}

/// Test 3: Padding keeps zero gaps, cropping picks the covered strip
#[test]
fn test_padding_versus_cropping() {
    let a = fand_a();
    let b = tile("Fand", 5, (600, 825), (175, 250), "2023-01-04 14:53:10", 1000.0);

    let padded = mosaic(&a, &b, &MosaicOptions::default()).unwrap();
    assert_eq!(padded.x_extent().as_tuple(), (450, 825));
    assert_eq!(padded.y_extent().as_tuple(), (150, 250));
    // Bottom-right corner lies under neither tile
    assert_eq!(padded.raster()[[19, 74]], 0.0);
    // Top-left corner neither
    assert_eq!(padded.raster()[[0, 0]], 0.0);

    let cropped = mosaic(&a, &b, &MosaicOptions::default().without_padding()).unwrap();
    // Candidates: overlap columns 15x20, overlap rows 75x5, a 45x10, b 45x15
    assert_eq!(cropped.rect(), b.rect());
    assert_eq!(cropped.raster(), b.raster());
}

/// Test 4: The reducer yields the same mosaic whatever order files are listed in
#[test]
fn test_reducer_is_order_independent() {
    let dir = archive_dir();
    let loader = TileLoader::new(dir.path());
    let names = [
        "aigean_fan_20230104_150010.zip",
        "aigean_fan_20230104_145310.zip",
        "aigean_lir_20230104_145310.zip",
    ];

    let forward = combine_unordered(&loader.load_all(&names).unwrap(), None).unwrap();
    let mut reversed_names = names;
    reversed_names.reverse();
    let reversed = combine_unordered(&loader.load_all(&reversed_names).unwrap(), None).unwrap();

    assert_eq!(forward.rect(), reversed.rect());
    assert_eq!(forward.resolution(), reversed.resolution());
    assert_eq!(forward.shape(), (60, 145));
}

/// Test 5: Manannan shares neither ground nor a capture day with Lir
#[test]
fn test_reducer_rejects_disjoint_tile() {
    let dir = archive_dir();
    let loader = TileLoader::new(dir.path());
    let tiles = loader
        .load_all(&["aigean_lir_20230104_145310.zip", "aigean_man_20221205_194510.zip"])
        .unwrap();

    let err = combine_unordered(&tiles, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Composition);
}

/// Test 6: Mosaicing at a coarser resolution than either input needs
#[test]
fn test_coarse_mosaic_write_order() {
    let fine = tile("Fand", 5, (100, 220), (0, 60), "2023-01-04 15:00:10", 0.0);
    let lir = lir();

    let coarse = resample(&fine, 30).unwrap();
    let result = mosaic(&fine, &lir, &MosaicOptions::default().with_resolution(30)).unwrap();

    // Fand lands in the bottom-left corner of Lir's 10x20 frame; the right operand wins
    let placed = result.raster().slice(s![8..10, 0..4]).to_owned();
    let reference = mosaic(&lir, &fine, &MosaicOptions::default().with_resolution(30)).unwrap();
    assert_eq!(reference.raster().slice(s![8..10, 0..4]), coarse.raster());
    assert_eq!(placed, lir.raster().slice(s![8..10, 0..4]));
}
