//! The geospatial dataset collaborator consumed by the coordinate mappers.

use std::collections::HashMap;

use crate::gcp::Gcp;
use crate::geo_transform::GeoTransform;
use crate::product::ProductDescription;

/// Georeferencing metadata exposed by a raster dataset.
///
/// Implemented by [`DatasetInfo`] for in-memory descriptions and, with the
/// `gdal` feature, by [`crate::gdal::GdalDataset`].
pub trait GeoreferencedSource {
    /// Raster size as `(width, height)` in pixels.
    fn raster_size(&self) -> (usize, usize);

    /// Affine geo-transform, if the dataset has one.
    fn geo_transform(&self) -> Option<GeoTransform>;

    /// Projection definition of the geo-transform coordinates.
    fn projection(&self) -> Option<String>;

    /// Ground control points, in dataset order.
    fn gcps(&self) -> Vec<Gcp>;

    /// Projection definition of the GCP locations.
    fn gcp_projection(&self) -> Option<String>;

    fn gcp_count(&self) -> usize {
        self.gcps().len()
    }
}

/// Plain-data description of a dataset.
///
/// ```
/// use gsdview::{DatasetInfo, Gcp, GeoreferencedSource};
///
/// let info = DatasetInfo::new(100, 50)
///     .with_gcps(vec![Gcp::new(0.0, 0.0, 10.0, 45.0)], "EPSG:4326");
/// assert_eq!(info.gcp_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetInfo {
    pub width: usize,
    pub height: usize,
    pub geo_transform: Option<GeoTransform>,
    pub projection: Option<String>,
    pub gcps: Vec<Gcp>,
    pub gcp_projection: Option<String>,
    pub driver_name: String,
    pub description: String,
    pub metadata: HashMap<String, String>,
}

impl DatasetInfo {
    pub fn new(width: usize, height: usize) -> Self {
        DatasetInfo {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_geo_transform(mut self, geo_transform: GeoTransform) -> Self {
        self.geo_transform = Some(geo_transform);
        self
    }

    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = Some(projection.into());
        self
    }

    pub fn with_gcps(mut self, gcps: Vec<Gcp>, projection: impl Into<String>) -> Self {
        self.gcps = gcps;
        self.gcp_projection = Some(projection.into());
        self
    }

    pub fn with_driver(mut self, driver_name: impl Into<String>, description: impl Into<String>) -> Self {
        self.driver_name = driver_name.into();
        self.description = description.into();
        self
    }

    pub fn with_metadata_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl GeoreferencedSource for DatasetInfo {
    fn raster_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn geo_transform(&self) -> Option<GeoTransform> {
        self.geo_transform
    }

    fn projection(&self) -> Option<String> {
        self.projection.clone()
    }

    fn gcps(&self) -> Vec<Gcp> {
        self.gcps.clone()
    }

    fn gcp_projection(&self) -> Option<String> {
        self.gcp_projection.clone()
    }

    fn gcp_count(&self) -> usize {
        self.gcps.len()
    }
}

impl ProductDescription for DatasetInfo {
    fn driver_name(&self) -> String {
        self.driver_name.clone()
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn metadata_item(&self, key: &str) -> Option<String> {
        self.metadata.get(key).cloned()
    }
}
