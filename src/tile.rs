//! The tile value type: one raster observation with its geo-metadata.

use crate::coords::{EarthRect, Extent};
use crate::error::{CompositeError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use ndarray::Array2;
use std::sync::Arc;

/// Format of observation timestamps in tile metadata.
pub const OBS_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Immutable tile metadata.
///
/// Text labels are reference counted, so a derived tile shares them with its source
/// while still getting a record of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMeta {
    /// Archive the observation came from (may be empty)
    pub archive: Arc<str>,

    /// Instrument that captured the raster (may be empty)
    pub instrument: Arc<str>,

    /// Observatory operating the instrument (may be empty)
    pub observatory: Arc<str>,

    /// Earth units per pixel
    pub resolution: u32,

    /// Bounding box in earth coordinates
    pub extent: EarthRect,

    /// Capture time
    pub obs_date: NaiveDateTime,
}

impl TileMeta {
    /// Metadata with empty text labels.
    pub fn new(resolution: u32, extent: EarthRect, obs_date: NaiveDateTime) -> Self {
        Self {
            archive: Arc::from(""),
            instrument: Arc::from(""),
            observatory: Arc::from(""),
            resolution,
            extent,
            obs_date,
        }
    }

    pub fn archive(mut self, archive: &str) -> Self {
        self.archive = Arc::from(archive);
        self
    }

    pub fn instrument(mut self, instrument: &str) -> Self {
        self.instrument = Arc::from(instrument);
        self
    }

    pub fn observatory(mut self, observatory: &str) -> Self {
        self.observatory = Arc::from(observatory);
        self
    }

    /// Copy of this record with a new resolution and extent.
    pub fn reshaped(&self, resolution: u32, extent: EarthRect) -> Self {
        Self {
            resolution,
            extent,
            ..self.clone()
        }
    }

    pub fn obs_day(&self) -> NaiveDate {
        self.obs_date.date()
    }

    /// Observation time as `YYYY-MM-DD HH:MM:SS`.
    pub fn obs_date_string(&self) -> String {
        self.obs_date.format(OBS_DATE_FORMAT).to_string()
    }

    /// Expected raster shape `(rows, cols)` for this extent and resolution.
    pub fn expected_shape(&self) -> (usize, usize) {
        let r = i64::from(self.resolution.max(1));
        let rows = self.extent.y.len().div_euclid(r);
        let cols = self.extent.x.len().div_euclid(r);
        (rows.max(0) as usize, cols.max(0) as usize)
    }
}

/// A geo-referenced raster tile.
///
/// Tiles are values: every combinator returns a new tile and leaves its operands
/// untouched.
#[derive(Debug, Clone)]
pub struct Tile {
    meta: TileMeta,
    raster: Array2<f64>,
    is_derived: bool,
}

impl Tile {
    /// Build a tile from decoded metadata and raster.
    ///
    /// Fails when the resolution is zero, an extent is empty, too long for an `i64`
    /// or not a whole number of pixels, or the raster shape does not match
    /// `extent / resolution`.
    pub fn new(meta: TileMeta, raster: Array2<f64>) -> Result<Self> {
        if meta.resolution == 0 {
            return Err(CompositeError::invalid(
                "resolution",
                meta.resolution,
                "must be a positive integer",
            ));
        }
        if meta.extent.x.is_empty() {
            return Err(CompositeError::invalid(
                "xcoords",
                format!("{:?}", meta.extent.x.as_tuple()),
                "max must be greater than min",
            ));
        }
        if meta.extent.y.is_empty() {
            return Err(CompositeError::invalid(
                "ycoords",
                format!("{:?}", meta.extent.y.as_tuple()),
                "max must be greater than min",
            ));
        }

        let r = i64::from(meta.resolution);
        for (name, extent) in [("xcoords", meta.extent.x), ("ycoords", meta.extent.y)] {
            let Some(len) = extent.checked_len() else {
                return Err(CompositeError::invalid(
                    name,
                    format!("{:?}", extent.as_tuple()),
                    "extent is too large to measure",
                ));
            };
            if len % r != 0 {
                return Err(CompositeError::invalid(
                    name,
                    format!("{:?}", extent.as_tuple()),
                    format!("extent is not a whole number of {}-unit pixels", r),
                ));
            }
        }

        let expected = meta.expected_shape();
        let actual = raster.dim();
        if expected != actual {
            return Err(CompositeError::ShapeMismatch { expected, actual });
        }

        Ok(Self {
            meta,
            raster,
            is_derived: false,
        })
    }

    /// Build a tile produced by a combinator.
    pub(crate) fn derived(meta: TileMeta, raster: Array2<f64>) -> Result<Self> {
        Ok(Self::new(meta, raster)?.mark_derived(true))
    }

    pub(crate) fn mark_derived(mut self, is_derived: bool) -> Self {
        self.is_derived = is_derived;
        self
    }

    pub fn meta(&self) -> &TileMeta {
        &self.meta
    }

    pub fn raster(&self) -> &Array2<f64> {
        &self.raster
    }

    pub fn into_raster(self) -> Array2<f64> {
        self.raster
    }

    pub fn resolution(&self) -> u32 {
        self.meta.resolution
    }

    pub fn rect(&self) -> EarthRect {
        self.meta.extent
    }

    pub fn x_extent(&self) -> Extent {
        self.meta.extent.x
    }

    pub fn y_extent(&self) -> Extent {
        self.meta.extent.y
    }

    pub fn observation_date(&self) -> NaiveDateTime {
        self.meta.obs_date
    }

    /// `(x.max - x.min, y.max - y.min)` in earth units.
    pub fn field_of_view(&self) -> (i64, i64) {
        self.meta.extent.field_of_view()
    }

    /// Integer centre of the extent, floor division.
    pub fn centre(&self) -> (i64, i64) {
        self.meta.extent.centre()
    }

    /// Raster shape `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.raster.dim()
    }

    /// True for tiles produced by add, sub or mosaic.
    pub fn is_derived(&self) -> bool {
        self.is_derived
    }

    /// Conventional image filename for this tile:
    /// `{observatory}_{instrument}_{YYYYMMDD}_{HHMMSS}[_extra].png`.
    pub fn output_filename(&self) -> String {
        let extra = if self.is_derived { "_extra" } else { "" };
        format!(
            "{}_{}_{}{}.png",
            self.meta.observatory,
            self.meta.instrument,
            self.meta.obs_date.format("%Y%m%d_%H%M%S"),
            extra
        )
    }
}
