use std::fmt;

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::errors::{GeoError, Result};
use crate::spatial_ref::SpatialRef;

/// Defines a coordinate transformation from one [`SpatialRef`] to another.
///
/// Geographic coordinates are always exchanged in degrees with longitude
/// first, whatever the axis order declared by the authority.
pub struct CoordTransform {
    source: Proj,
    target: Proj,
    source_geographic: bool,
    target_geographic: bool,
    from: String,
    to: String,
}

impl fmt::Debug for CoordTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordTransform")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

impl CoordTransform {
    /// Constructs a new transformation from `source` to `target`.
    pub fn new(source: &SpatialRef, target: &SpatialRef) -> Result<CoordTransform> {
        Ok(Self {
            source: build_proj(source)?,
            target: build_proj(target)?,
            source_geographic: source.is_geographic(),
            target_geographic: target.is_geographic(),
            from: source.authority(),
            to: target.authority(),
        })
    }

    /// Transform a single coordinate pair.
    pub fn transform_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let mut point = if self.source_geographic {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };

        transform(&self.source, &self.target, &mut point).map_err(|e| {
            GeoError::InvalidCoordinateRange {
                from: self.from.clone(),
                to: self.to.clone(),
                msg: Some(format!("{e:?}")),
            }
        })?;

        let (out_x, out_y) = if self.target_geographic {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        if !(out_x.is_finite() && out_y.is_finite()) {
            return Err(GeoError::InvalidCoordinateRange {
                from: self.from.clone(),
                to: self.to.clone(),
                msg: Some(format!("({x}, {y}) has no finite image")),
            });
        }
        Ok((out_x, out_y))
    }

    /// Transform coordinates in place.
    ///
    /// # Arguments
    /// * `x` - slice of x coordinates
    /// * `y` - slice of y coordinates (must match x in length)
    pub fn transform_coords(&self, x: &mut [f64], y: &mut [f64]) -> Result<()> {
        if x.len() != y.len() {
            return Err(GeoError::BadArgument(format!(
                "transform coordinate slices have different lengths: {} != {}",
                x.len(),
                y.len()
            )));
        }
        for (xi, yi) in x.iter_mut().zip(y.iter_mut()) {
            (*xi, *yi) = self.transform_point(*xi, *yi)?;
        }
        Ok(())
    }
}

fn build_proj(srs: &SpatialRef) -> Result<Proj> {
    Proj::from_proj_string(srs.to_proj4()).map_err(|e| GeoError::InvalidSpatialRef {
        definition: srs.to_proj4().to_string(),
        msg: format!("{e:?}"),
    })
}
