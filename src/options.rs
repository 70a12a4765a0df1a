use crate::raster::overview::DEFAULT_PREVIEW_BYTES;

/// Tunables of the coordinate mappers and of the preview level selection.
///
/// Passed explicitly to the constructors that need it; there is no
/// process-wide default instance to mutate.
///
/// ```
/// use gsdview::MapperOptions;
///
/// let options = MapperOptions::default().max_surface_degree(3);
/// assert_eq!(options.geog_cs(), "WGS84");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MapperOptions {
    geog_cs: String,
    max_surface_degree: usize,
    preview_bytes: u64,
}

impl Default for MapperOptions {
    fn default() -> Self {
        MapperOptions {
            geog_cs: "WGS84".to_string(),
            max_surface_degree: 5,
            preview_bytes: DEFAULT_PREVIEW_BYTES,
        }
    }
}

impl MapperOptions {
    /// Well known geographic coordinate system all geographic output is
    /// expressed in (`WGS84`, `WGS72`, `NAD27`, `NAD83`).
    pub fn geog_cs_name(mut self, name: impl Into<String>) -> Self {
        self.geog_cs = name.into();
        self
    }

    /// Upper bound of the degree of the GCP interpolation surfaces.
    /// Values below 1 are raised to 1.
    pub fn max_surface_degree(mut self, degree: usize) -> Self {
        self.max_surface_degree = degree.max(1);
        self
    }

    /// Byte budget of the preview image used to pick an overview level.
    pub fn preview_bytes(mut self, bytes: u64) -> Self {
        self.preview_bytes = bytes.max(1);
        self
    }

    pub fn geog_cs(&self) -> &str {
        &self.geog_cs
    }

    pub fn surface_degree_limit(&self) -> usize {
        self.max_surface_degree
    }

    pub fn preview_byte_budget(&self) -> u64 {
        self.preview_bytes
    }
}
