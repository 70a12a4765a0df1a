//! Geo-referencing core of the GSDView raster viewer.
//!
//! The crate converts between image coordinates `(line, pixel)` and
//! geographic coordinates `(lat, lon)` and selects the overview level to use
//! for previews of large rasters.
//!
//! ## Use
//!
//! ```
//! # fn main() -> gsdview::errors::Result<()> {
//! use gsdview::{coordinate_mapper, CoordinateMapping, DatasetInfo, Gcp};
//!
//! let mut gcps = Vec::new();
//! for line in [0.0, 500.0, 1000.0] {
//!     for pixel in [0.0, 500.0, 1000.0] {
//!         gcps.push(Gcp::new(line, pixel, 10.0 + pixel / 1000.0, 45.0 - line / 1000.0));
//!     }
//! }
//! let info = DatasetInfo::new(1000, 1000).with_gcps(gcps, "EPSG:4326");
//!
//! if let Some(mapper) = coordinate_mapper(&info)? {
//!     let (lats, lons) = mapper.img_to_geo_points(&[250.0], &[750.0])?;
//!     assert!((lats[0] - 44.75).abs() < 1e-9);
//!     assert!((lons[0] - 10.75).abs() < 1e-9);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate features
//!
//! * `gdal`: read georeferencing metadata from real datasets through
//!   `gdal-sys` ([`gdal::GdalDataset`]).
//! * `bundled`: like `gdal`, building GDAL from source.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod errors;
pub mod gcp;
pub mod geo_transform;
pub mod mapper;
pub mod options;
pub mod product;
pub mod raster;
pub mod source;
pub mod spatial_ref;

#[cfg(feature = "gdal")]
#[cfg_attr(docsrs, doc(cfg(feature = "gdal")))]
pub mod gdal;

pub use gcp::Gcp;
pub use geo_transform::{GeoTransform, GeoTransformEx, IDENTITY_GEO_TRANSFORM};
pub use mapper::{
    coordinate_mapper, coordinate_mapper_with_options, AffineCoordinateMapper, CoordinateMapper,
    CoordinateMapping, GridCoordinateMapper,
};
pub use options::MapperOptions;
pub use product::{product_id, ProductDescription};
pub use raster::{BandInfo, OverviewSource};
pub use source::{DatasetInfo, GeoreferencedSource};
pub use spatial_ref::{CoordTransform, SpatialRef};

#[cfg(test)]
fn assert_almost_eq(a: f64, b: f64) {
    let diff: f64 = b - a;
    assert!(diff.abs() < 1e-9, "{a} != {b}");
}
