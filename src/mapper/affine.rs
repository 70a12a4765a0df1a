use ndarray::Array2;

use crate::errors::{GeoError, Result};
use crate::geo_transform::{GeoTransform, GeoTransformEx, IDENTITY_GEO_TRANSFORM};
use crate::mapper::{paired_len, CoordinateMapping};
use crate::options::MapperOptions;
use crate::source::GeoreferencedSource;
use crate::spatial_ref::{CoordTransform, SpatialRef};

/// Coordinate mapper based on the affine geo-transform of a dataset.
///
/// ```text
/// | Xgeo |   | GT[1] GT[2] |   | Xpixel |   | GT[0] |
/// |      | = |             | * |        | + |       |
/// | Ygeo |   | GT[4] GT[5] |   | Yline  |   | GT[3] |
/// ```
///
/// When the dataset projection is not geographic, image to geographic
/// conversions are followed by a reprojection to the geographic coordinate
/// system of the [`MapperOptions`]. Geographic to image conversions are
/// **not** reprojected: the inverse transform is applied to `(lon, lat)` as if
/// they were expressed in the dataset projection. Check
/// [`is_reprojected`](Self::is_reprojected) before relying on them.
#[derive(Debug)]
pub struct AffineCoordinateMapper {
    direct: GeoTransform,
    inverse: GeoTransform,
    sr_transform: Option<CoordTransform>,
}

impl AffineCoordinateMapper {
    pub fn new<S>(source: &S) -> Result<Self>
    where
        S: GeoreferencedSource + ?Sized,
    {
        Self::with_options(source, &MapperOptions::default())
    }

    pub fn with_options<S>(source: &S, options: &MapperOptions) -> Result<Self>
    where
        S: GeoreferencedSource + ?Sized,
    {
        let projection = source
            .projection()
            .filter(|projection| !projection.trim().is_empty());
        let geo_transform = source.geo_transform();
        if projection.is_none() && geo_transform.is_none() {
            return Err(GeoError::MissingGeoreferencing);
        }

        let sr_transform = match projection {
            Some(definition) => {
                let sref = SpatialRef::from_definition(&definition)?;
                if sref.is_geographic() {
                    None
                } else {
                    let target = SpatialRef::from_well_known_geog_cs(options.geog_cs())?;
                    log::debug!(
                        "reprojecting image coordinates from {} to {}",
                        sref.authority(),
                        target.authority()
                    );
                    Some(CoordTransform::new(&sref, &target)?)
                }
            }
            None => None,
        };

        let geo_transform = geo_transform.unwrap_or_else(|| {
            log::debug!("no geo-transform, using the identity");
            IDENTITY_GEO_TRANSFORM
        });
        Self::from_geo_transform(geo_transform, sr_transform)
    }

    /// Mapper for an explicit geo-transform. `sr_transform`, if any, converts
    /// geo-transform coordinates to `(lon, lat)`.
    pub fn from_geo_transform(
        geo_transform: GeoTransform,
        sr_transform: Option<CoordTransform>,
    ) -> Result<Self> {
        let inverse = geo_transform.invert()?;
        Ok(AffineCoordinateMapper {
            direct: geo_transform,
            inverse,
            sr_transform,
        })
    }

    pub fn geo_transform(&self) -> &GeoTransform {
        &self.direct
    }

    /// `true` when image to geographic conversions go through a
    /// reprojection (and the inverse conversions are thus not exact).
    pub fn is_reprojected(&self) -> bool {
        self.sr_transform.is_some()
    }
}

impl CoordinateMapping for AffineCoordinateMapper {
    fn img_to_geo_grid(&self, lines: &[f64], pixels: &[f64]) -> Result<(Array2<f64>, Array2<f64>)> {
        let (grid_lines, grid_pixels) = outer_product(lines, pixels);
        let (lats, lons) = self.img_to_geo_points(&grid_lines, &grid_pixels)?;
        let shape = (lines.len(), pixels.len());
        Ok((reshape(shape, lats)?, reshape(shape, lons)?))
    }

    fn geo_to_img_grid(&self, lats: &[f64], lons: &[f64]) -> Result<(Array2<f64>, Array2<f64>)> {
        let (grid_lons, grid_lats) = outer_product(lons, lats);
        let (lines, pixels) = self.geo_to_img_points(&grid_lats, &grid_lons)?;
        let shape = (lons.len(), lats.len());
        Ok((reshape(shape, lines)?, reshape(shape, pixels)?))
    }

    fn img_to_geo_points(&self, lines: &[f64], pixels: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let n = paired_len(lines, pixels);
        let mut lats = Vec::with_capacity(n);
        let mut lons = Vec::with_capacity(n);
        for (&line, &pixel) in lines.iter().zip(pixels) {
            let (mut x, mut y) = self.direct.apply(pixel, line);
            if let Some(transform) = &self.sr_transform {
                (x, y) = transform.transform_point(x, y)?;
            }
            lats.push(y);
            lons.push(x);
        }
        Ok((lats, lons))
    }

    fn geo_to_img_points(&self, lats: &[f64], lons: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let n = paired_len(lats, lons);
        let mut lines = Vec::with_capacity(n);
        let mut pixels = Vec::with_capacity(n);
        for (&lat, &lon) in lats.iter().zip(lons) {
            let (pixel, line) = self.inverse.apply(lon, lat);
            lines.push(line);
            pixels.push(pixel);
        }
        Ok((lines, pixels))
    }
}

/// Row-major expansion of `rows x cols` into two flat coordinate lists.
fn outer_product(rows: &[f64], cols: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let size = rows.len() * cols.len();
    let mut grid_rows = Vec::with_capacity(size);
    let mut grid_cols = Vec::with_capacity(size);
    for &row in rows {
        for &col in cols {
            grid_rows.push(row);
            grid_cols.push(col);
        }
    }
    (grid_rows, grid_cols)
}

fn reshape(shape: (usize, usize), values: Vec<f64>) -> Result<Array2<f64>> {
    Array2::from_shape_vec(shape, values).map_err(|e| GeoError::BadArgument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DatasetInfo;

    fn utm_info() -> DatasetInfo {
        DatasetInfo::new(1000, 1000)
            .with_geo_transform([500000.0, 30.0, 0.0, 30000.0, 0.0, -30.0])
            .with_projection("EPSG:32633")
    }

    #[test]
    fn test_missing_georeferencing() {
        let info = DatasetInfo::new(10, 10);
        assert!(matches!(
            AffineCoordinateMapper::new(&info),
            Err(GeoError::MissingGeoreferencing)
        ));
        let info = DatasetInfo::new(10, 10).with_projection("  ");
        assert!(matches!(
            AffineCoordinateMapper::new(&info),
            Err(GeoError::MissingGeoreferencing)
        ));
    }

    #[test]
    fn test_degenerate_transform() {
        let info = DatasetInfo::new(10, 10)
            .with_geo_transform([0.0, 1.0, 1.0, 0.0, 2.0, 2.0])
            .with_projection("EPSG:4326");
        assert!(matches!(
            AffineCoordinateMapper::new(&info),
            Err(GeoError::DegenerateTransform { .. })
        ));
    }

    #[test]
    fn test_projection_without_geo_transform() {
        let info = DatasetInfo::new(10, 10).with_projection("WGS84");
        let mapper = AffineCoordinateMapper::new(&info).unwrap();
        assert_eq!(mapper.geo_transform(), &IDENTITY_GEO_TRANSFORM);
        let (lats, lons) = mapper.img_to_geo_points(&[3.0], &[4.0]).unwrap();
        assert_eq!((lats[0], lons[0]), (3.0, 4.0));
    }

    #[test]
    fn test_geo_transform_without_projection() {
        let info = DatasetInfo::new(10, 10).with_geo_transform([5.0, 0.5, 0.0, 40.0, 0.0, -0.5]);
        let mapper = AffineCoordinateMapper::new(&info).unwrap();
        assert!(!mapper.is_reprojected());
        let (lats, lons) = mapper.img_to_geo_points(&[2.0], &[4.0]).unwrap();
        assert_eq!((lats[0], lons[0]), (39.0, 7.0));
    }

    #[test]
    fn test_reprojected_points() {
        let mapper = AffineCoordinateMapper::new(&utm_info()).unwrap();
        assert!(mapper.is_reprojected());

        // (line 1000, pixel 0) is (500000, 0) on the zone 33 central meridian
        let (lats, lons) = mapper.img_to_geo_points(&[1000.0], &[0.0]).unwrap();
        assert!(lats[0].abs() < 1e-9);
        assert!((lons[0] - 15.0).abs() < 1e-9);

        // top rows are north of the equator, right columns east of the meridian
        let (lats, lons) = mapper.img_to_geo_points(&[0.0], &[999.0]).unwrap();
        assert!(lats[0] > 0.0);
        assert!(lons[0] > 15.0);
    }

    #[test]
    fn test_inverse_is_not_reprojected() {
        let mapper = AffineCoordinateMapper::new(&utm_info()).unwrap();
        // native coordinates go through the plain inverse affine transform
        let (lines, pixels) = mapper.geo_to_img_points(&[0.0], &[500000.0]).unwrap();
        assert!((lines[0] - 1000.0).abs() < 1e-9);
        assert!(pixels[0].abs() < 1e-9);
    }

    #[test]
    fn test_grids() {
        let info = DatasetInfo::new(100, 100)
            .with_geo_transform([10.0, 0.1, 0.0, 50.0, 0.0, -0.1])
            .with_projection("EPSG:4326");
        let mapper = AffineCoordinateMapper::new(&info).unwrap();

        let lines = [0.0, 10.0, 20.0];
        let pixels = [0.0, 50.0];
        let (lat, lon) = mapper.img_to_geo_grid(&lines, &pixels).unwrap();
        assert_eq!(lat.dim(), (3, 2));
        assert_eq!(lon.dim(), (3, 2));
        assert!((lat[[2, 1]] - 48.0).abs() < 1e-9);
        assert!((lon[[2, 1]] - 15.0).abs() < 1e-9);
        assert!((lat[[1, 0]] - 49.0).abs() < 1e-9);

        let lats = [50.0, 49.0];
        let lons = [10.0, 12.0, 15.0];
        let (line, pixel) = mapper.geo_to_img_grid(&lats, &lons).unwrap();
        assert_eq!(line.dim(), (3, 2));
        assert!((line[[2, 1]] - 10.0).abs() < 1e-9);
        assert!((pixel[[2, 1]] - 50.0).abs() < 1e-9);
        assert!((pixel[[1, 0]] - 20.0).abs() < 1e-9);
    }
}
