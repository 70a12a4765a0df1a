//! Raster ground control point support

use geo_types::Coord;

/// Ground Control Point (GCP) anchoring one image position to one
/// georeferenced position.
///
/// The location is expressed in the GCP spatial reference of the dataset
/// (see [`crate::source::GeoreferencedSource::gcp_projection`]): `x` is the
/// longitude (or easting) and `y` the latitude (or northing). The elevation
/// is carried along but ignored by the 2-D coordinate mappers.
#[derive(Debug, Clone, PartialEq)]
pub struct Gcp {
    pub id: String,
    pub info: Option<String>,
    pub line: f64,
    pub pixel: f64,
    pub location: Coord<f64>,
    pub z: f64,
}

impl Gcp {
    pub fn new(line: f64, pixel: f64, x: f64, y: f64) -> Self {
        Gcp {
            id: String::new(),
            info: None,
            line,
            pixel,
            location: Coord { x, y },
            z: 0.0,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_elevation(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    /// Image position as `(line, pixel)`.
    pub fn image_position(&self) -> (f64, f64) {
        (self.line, self.pixel)
    }
}
