//! Spatial reference systems and coordinate transformations, backed by
//! `proj4rs` and the `crs-definitions` EPSG database.

mod srs;
mod transform;

pub use srs::SpatialRef;
pub use transform::CoordTransform;
