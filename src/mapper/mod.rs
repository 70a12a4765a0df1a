//! Conversion between image `(line, pixel)` and geographic `(lat, lon)`
//! coordinates.
//!
//! Two strategies are available:
//!
//! * [`AffineCoordinateMapper`]: closed form, from the dataset geo-transform,
//!   optionally reprojected to a geographic coordinate system;
//! * [`GridCoordinateMapper`]: smooth surfaces fitted to the ground control
//!   points of the dataset.
//!
//! [`coordinate_mapper`] picks the right one for a dataset.
//!
//! # Example
//!
//! ```
//! # fn main() -> gsdview::errors::Result<()> {
//! use gsdview::{coordinate_mapper, CoordinateMapping, DatasetInfo};
//!
//! let info = DatasetInfo::new(100, 100)
//!     .with_geo_transform([10.0, 0.01, 0.0, 45.0, 0.0, -0.01])
//!     .with_projection("EPSG:4326");
//! let mapper = coordinate_mapper(&info)?.expect("georeferenced dataset");
//! let (lats, lons) = mapper.img_to_geo_points(&[0.0, 100.0], &[0.0, 100.0])?;
//! assert!((lats[1] - 44.0).abs() < 1e-9);
//! assert!((lons[1] - 11.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```

use ndarray::Array2;

use crate::errors::Result;
use crate::options::MapperOptions;
use crate::source::GeoreferencedSource;

mod affine;
mod grid;
pub mod surface;

pub use affine::AffineCoordinateMapper;
pub use grid::{correct_slice_lines, GridCoordinateMapper};

/// Coordinate conversions between image and geographic space.
///
/// Point conversions pair their inputs element-wise; when the inputs have
/// different lengths the longer one is truncated.
pub trait CoordinateMapping {
    /// `(line, pixel) -> (lat, lon)` on the regular grid `lines x pixels`.
    ///
    /// Both returned arrays have shape `(lines.len(), pixels.len())`.
    fn img_to_geo_grid(&self, lines: &[f64], pixels: &[f64]) -> Result<(Array2<f64>, Array2<f64>)>;

    /// `(lat, lon) -> (line, pixel)` on the regular grid `lons x lats`.
    ///
    /// Both returned arrays have shape `(lons.len(), lats.len())`.
    fn geo_to_img_grid(&self, lats: &[f64], lons: &[f64]) -> Result<(Array2<f64>, Array2<f64>)>;

    /// `(line, pixel) -> (lat, lon)`.
    fn img_to_geo_points(&self, lines: &[f64], pixels: &[f64]) -> Result<(Vec<f64>, Vec<f64>)>;

    /// `(lat, lon) -> (line, pixel)`.
    fn geo_to_img_points(&self, lats: &[f64], lons: &[f64]) -> Result<(Vec<f64>, Vec<f64>)>;
}

/// The coordinate mapper of a dataset.
#[derive(Debug)]
pub enum CoordinateMapper {
    Affine(AffineCoordinateMapper),
    GridSurface(GridCoordinateMapper),
}

impl CoordinateMapping for CoordinateMapper {
    fn img_to_geo_grid(&self, lines: &[f64], pixels: &[f64]) -> Result<(Array2<f64>, Array2<f64>)> {
        match self {
            CoordinateMapper::Affine(mapper) => mapper.img_to_geo_grid(lines, pixels),
            CoordinateMapper::GridSurface(mapper) => mapper.img_to_geo_grid(lines, pixels),
        }
    }

    fn geo_to_img_grid(&self, lats: &[f64], lons: &[f64]) -> Result<(Array2<f64>, Array2<f64>)> {
        match self {
            CoordinateMapper::Affine(mapper) => mapper.geo_to_img_grid(lats, lons),
            CoordinateMapper::GridSurface(mapper) => mapper.geo_to_img_grid(lats, lons),
        }
    }

    fn img_to_geo_points(&self, lines: &[f64], pixels: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        match self {
            CoordinateMapper::Affine(mapper) => mapper.img_to_geo_points(lines, pixels),
            CoordinateMapper::GridSurface(mapper) => mapper.img_to_geo_points(lines, pixels),
        }
    }

    fn geo_to_img_points(&self, lats: &[f64], lons: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        match self {
            CoordinateMapper::Affine(mapper) => mapper.geo_to_img_points(lats, lons),
            CoordinateMapper::GridSurface(mapper) => mapper.geo_to_img_points(lats, lons),
        }
    }
}

/// Build the coordinate mapper of `source` with default options.
///
/// See [`coordinate_mapper_with_options`].
pub fn coordinate_mapper<S>(source: &S) -> Result<Option<CoordinateMapper>>
where
    S: GeoreferencedSource + ?Sized,
{
    coordinate_mapper_with_options(source, &MapperOptions::default())
}

/// Build the coordinate mapper of `source`.
///
/// * datasets with GCPs get a [`GridCoordinateMapper`];
/// * datasets with a projection get an [`AffineCoordinateMapper`];
/// * other datasets are not georeferenced: `Ok(None)`.
pub fn coordinate_mapper_with_options<S>(
    source: &S,
    options: &MapperOptions,
) -> Result<Option<CoordinateMapper>>
where
    S: GeoreferencedSource + ?Sized,
{
    if source.gcp_count() > 0 {
        let mapper = GridCoordinateMapper::with_options(source, options)?;
        return Ok(Some(CoordinateMapper::GridSurface(mapper)));
    }

    let has_projection = source
        .projection()
        .is_some_and(|projection| !projection.trim().is_empty());
    if has_projection {
        let mapper = AffineCoordinateMapper::with_options(source, options)?;
        return Ok(Some(CoordinateMapper::Affine(mapper)));
    }

    log::debug!("dataset is not georeferenced");
    Ok(None)
}

/// Number of pairs formed by two point sequences.
fn paired_len(a: &[f64], b: &[f64]) -> usize {
    a.len().min(b.len())
}
