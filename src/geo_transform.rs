use crate::errors::{GeoError, Result};

/// Affine transform from image `(pixel, line)` to the coordinates of the
/// dataset projection, in GDAL coefficient order.
///
/// ```text
/// Xgeo = GT[0] + Xpixel * GT[1] + Yline * GT[2]
/// Ygeo = GT[3] + Xpixel * GT[4] + Yline * GT[5]
/// ```
///
/// `GT[0]`/`GT[3]` locate the upper-left corner of the upper-left pixel,
/// `GT[1]`/`GT[5]` are the pixel size along X/Y (`GT[5]` is negative for
/// north-up images) and `GT[2]`/`GT[4]` are the rotation terms.
///
/// ```rust
/// # fn main() -> gsdview::errors::Result<()> {
/// use gsdview::{GeoTransform, GeoTransformEx};
///
/// let transform: GeoTransform = [768269.0, 1.0, 0.0, 4057292.0, 0.0, -1.0];
/// let (x, y) = transform.apply(0.0, 0.0);
/// assert_eq!((x, y), (768269.0, 4057292.0));
/// let (pixel, line) = transform.invert()?.apply(x, y);
/// assert_eq!((pixel, line), (0.0, 0.0));
/// # Ok(())
/// # }
/// ```
///
/// See the [GDAL GeoTransform Tutorial](https://gdal.org/tutorials/geotransforms_tut.html).
pub type GeoTransform = [f64; 6];

/// The transform GDAL reports for datasets that carry no geo-transform.
pub const IDENTITY_GEO_TRANSFORM: GeoTransform = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// Operations on [`GeoTransform`] coefficients.
pub trait GeoTransformEx {
    /// Map an image position to projection coordinates.
    ///
    /// Same arithmetic as `GDALApplyGeoTransform`.
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64);

    /// Determinant of the 2x2 linear part.
    fn determinant(&self) -> f64;

    /// Coefficients of the inverse mapping, projection to image.
    ///
    /// Same arithmetic and degeneracy test as `GDALInvGeoTransform`.
    fn invert(&self) -> Result<GeoTransform>;
}

impl GeoTransformEx for GeoTransform {
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64) {
        let geo_x = self[0] + pixel * self[1] + line * self[2];
        let geo_y = self[3] + pixel * self[4] + line * self[5];
        (geo_x, geo_y)
    }

    fn determinant(&self) -> f64 {
        self[1] * self[5] - self[2] * self[4]
    }

    fn invert(&self) -> Result<GeoTransform> {
        // no rotation
        if self[2] == 0.0 && self[4] == 0.0 && self[1] != 0.0 && self[5] != 0.0 {
            return Ok([
                -self[0] / self[1],
                1.0 / self[1],
                0.0,
                -self[3] / self[5],
                0.0,
                1.0 / self[5],
            ]);
        }

        let det = self.determinant();
        let magnitude = self[1]
            .abs()
            .max(self[2].abs())
            .max(self[4].abs().max(self[5].abs()));
        if !det.is_finite() || det.abs() <= 1e-10 * magnitude * magnitude {
            return Err(GeoError::DegenerateTransform { determinant: det });
        }

        let inv_det = 1.0 / det;
        Ok([
            (self[2] * self[3] - self[0] * self[5]) * inv_det,
            self[5] * inv_det,
            -self[2] * inv_det,
            (-self[1] * self[3] + self[0] * self[4]) * inv_det,
            -self[4] * inv_det,
            self[1] * inv_det,
        ])
    }
}
