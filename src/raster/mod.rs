//! Raster band support

pub mod overview;

pub use overview::{BandInfo, OverviewSource, DEFAULT_PREVIEW_BYTES};
