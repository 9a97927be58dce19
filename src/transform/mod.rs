//! Tile compositing: alignment, resampling and mosaicing.

mod align;
mod mosaic;
mod reduce;
mod resample;

#[cfg(test)]
mod composite_integration_tests;

pub use align::{add, intersection_rect, sub, union_rect, Alignment};
pub use mosaic::{crop_candidates, mosaic, CropCandidate, MosaicOptions};
pub use reduce::combine_unordered;
pub use resample::{area_mean, block_mean, resample, upsample_bilinear};
