use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoError>;

#[derive(Clone, Debug, Error)]
pub enum GeoError {
    #[error("Insufficient number of ground control points: {count} (at least 4 are required)")]
    InsufficientControlPoints { count: usize },
    #[error("The dataset has neither a projection nor a geo-transform")]
    MissingGeoreferencing,
    #[error("Geo transform is uninvertible (determinant: {determinant})")]
    DegenerateTransform { determinant: f64 },
    #[error("Unable to fit a surface of degree {degree} to {points} points: {msg}")]
    SurfaceFitFailure {
        degree: usize,
        points: usize,
        msg: String,
    },
    #[error("Non uniform line spacing between slices: min = {min}, max = {max}")]
    NonUniformSliceSpacing { min: f64, max: f64 },
    #[error("Unable to detect the line spacing of a multi-slice product: no upward step in GCP lines")]
    UndefinedSliceSpacing,
    #[error("Overview with level {level} is not available in the product")]
    MissingOverview { level: u32 },
    #[error("Invalid spatial reference '{definition}': {msg}")]
    InvalidSpatialRef { definition: String, msg: String },
    #[error("Unable to transform coordinates from {from} to {to}{}", .msg.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    InvalidCoordinateRange {
        from: String,
        to: String,
        msg: Option<String>,
    },
    #[error("Bad argument: {0}")]
    BadArgument(String),
    #[cfg(feature = "gdal")]
    #[error("GDAL method '{method_name}' returned a NULL pointer. Error msg: '{msg}'")]
    NullPointer {
        method_name: &'static str,
        msg: String,
    },
    #[cfg(feature = "gdal")]
    #[error(transparent)]
    FfiNulError(#[from] std::ffi::NulError),
}
