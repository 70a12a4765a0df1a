use ndarray::Array2;

use crate::errors::{GeoError, Result};
use crate::mapper::surface::{degree_for_points, SmoothSurface};
use crate::mapper::{paired_len, CoordinateMapping};
use crate::options::MapperOptions;
use crate::source::GeoreferencedSource;
use crate::spatial_ref::{CoordTransform, SpatialRef};

/// Minimum number of GCPs a [`GridCoordinateMapper`] can be built from.
pub const MIN_CONTROL_POINTS: usize = 4;

/// Coordinate mapper interpolating the ground control points of a dataset.
///
/// Four [`SmoothSurface`]s are fitted at construction time:
/// `(line, pixel) -> lat`, `(line, pixel) -> lon`, `(lon, lat) -> line` and
/// `(lon, lat) -> pixel`. The GCPs are not retained.
#[derive(Debug, Clone)]
pub struct GridCoordinateMapper {
    img_to_lat: SmoothSurface,
    img_to_lon: SmoothSurface,
    geo_to_line: SmoothSurface,
    geo_to_pixel: SmoothSurface,
}

impl GridCoordinateMapper {
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
        let gcps = source.gcps();
        if gcps.len() < MIN_CONTROL_POINTS {
            return Err(GeoError::InsufficientControlPoints { count: gcps.len() });
        }

        let mut lines = Vec::with_capacity(gcps.len());
        let mut pixels = Vec::with_capacity(gcps.len());
        let mut lons = Vec::with_capacity(gcps.len());
        let mut lats = Vec::with_capacity(gcps.len());
        for gcp in &gcps {
            lines.push(gcp.line);
            pixels.push(gcp.pixel);
            lons.push(gcp.location.x);
            lats.push(gcp.location.y);
        }

        let projection = source
            .gcp_projection()
            .filter(|projection| !projection.trim().is_empty());
        match projection {
            Some(definition) => {
                let sref = SpatialRef::from_definition(&definition)?;
                if !sref.is_geographic() {
                    let target = SpatialRef::from_well_known_geog_cs(options.geog_cs())?;
                    log::debug!(
                        "reprojecting {} GCPs from {} to {}",
                        gcps.len(),
                        sref.authority(),
                        target.authority()
                    );
                    CoordTransform::new(&sref, &target)?.transform_coords(&mut lons, &mut lats)?;
                }
            }
            None => log::debug!("GCPs without projection, assuming geographic coordinates"),
        }

        if correct_slice_lines(&mut lines)? {
            log::debug!("GCP lines corrected for a multi-slice product");
        }

        Self::from_control_points(&lines, &pixels, &lats, &lons, options.surface_degree_limit())
    }

    /// Fit the mapper to control points given as parallel arrays, with
    /// `lats`/`lons` already geographic.
    ///
    /// Surfaces are fitted at `min(max_degree, floor(sqrt(n)) - 1)`. If that
    /// fails, or any surface is rank deficient, they are fitted again at
    /// degree 1, where the minimal-norm solution of a rank deficient system
    /// is accepted (e.g. a plane through four GCPs forming a diamond).
    pub fn from_control_points(
        lines: &[f64],
        pixels: &[f64],
        lats: &[f64],
        lons: &[f64],
        max_degree: usize,
    ) -> Result<Self> {
        let count = lines.len();
        if count < MIN_CONTROL_POINTS {
            return Err(GeoError::InsufficientControlPoints { count });
        }
        if pixels.len() != count || lats.len() != count || lons.len() != count {
            return Err(GeoError::BadArgument(format!(
                "control point arrays have different lengths: {}, {}, {}, {}",
                count,
                pixels.len(),
                lats.len(),
                lons.len()
            )));
        }

        let degree = degree_for_points(count, max_degree);
        log::debug!("surface degree = {degree}");
        if degree == 1 {
            return Self::fit_linear(lines, pixels, lats, lons);
        }
        match Self::fit(lines, pixels, lats, lons, degree).and_then(|mapper| mapper.full_rank(count)) {
            Ok(mapper) => Ok(mapper),
            Err(err) => {
                log::debug!("{err}; fallback to surfaces of degree 1");
                Self::fit_linear(lines, pixels, lats, lons)
            }
        }
    }

    fn fit(lines: &[f64], pixels: &[f64], lats: &[f64], lons: &[f64], degree: usize) -> Result<Self> {
        Ok(GridCoordinateMapper {
            img_to_lat: SmoothSurface::fit(lines, pixels, lats, degree)?,
            img_to_lon: SmoothSurface::fit(lines, pixels, lons, degree)?,
            geo_to_line: SmoothSurface::fit(lons, lats, lines, degree)?,
            geo_to_pixel: SmoothSurface::fit(lons, lats, pixels, degree)?,
        })
    }

    /// Degree 1 fit; rank deficient surfaces keep their minimal-norm solution.
    fn fit_linear(lines: &[f64], pixels: &[f64], lats: &[f64], lons: &[f64]) -> Result<Self> {
        let mapper = Self::fit(lines, pixels, lats, lons, 1)?;
        if !mapper.surfaces().iter().all(|surface| surface.is_full_rank()) {
            log::warn!("GCPs do not determine bilinear surfaces, using minimal-norm fits");
        }
        Ok(mapper)
    }

    fn full_rank(self, points: usize) -> Result<Self> {
        let deficient = self
            .surfaces()
            .into_iter()
            .find(|surface| !surface.is_full_rank())
            .map(|surface| {
                let order = surface.degree() + 1;
                GeoError::SurfaceFitFailure {
                    degree: surface.degree(),
                    points,
                    msg: format!("rank deficient system ({} < {})", surface.rank(), order * order),
                }
            });
        match deficient {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    fn surfaces(&self) -> [&SmoothSurface; 4] {
        [
            &self.img_to_lat,
            &self.img_to_lon,
            &self.geo_to_line,
            &self.geo_to_pixel,
        ]
    }

    /// Degree of the fitted surfaces.
    pub fn degree(&self) -> usize {
        self.img_to_lat.degree()
    }
}

impl CoordinateMapping for GridCoordinateMapper {
    fn img_to_geo_grid(&self, lines: &[f64], pixels: &[f64]) -> Result<(Array2<f64>, Array2<f64>)> {
        Ok((
            self.img_to_lat.eval_grid(lines, pixels),
            self.img_to_lon.eval_grid(lines, pixels),
        ))
    }

    fn geo_to_img_grid(&self, lats: &[f64], lons: &[f64]) -> Result<(Array2<f64>, Array2<f64>)> {
        Ok((
            self.geo_to_line.eval_grid(lons, lats),
            self.geo_to_pixel.eval_grid(lons, lats),
        ))
    }

    fn img_to_geo_points(&self, lines: &[f64], pixels: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let n = paired_len(lines, pixels);
        let mut lats = Vec::with_capacity(n);
        let mut lons = Vec::with_capacity(n);
        for (&line, &pixel) in lines.iter().zip(pixels) {
            lats.push(self.img_to_lat.eval(line, pixel));
            lons.push(self.img_to_lon.eval(line, pixel));
        }
        Ok((lats, lons))
    }

    fn geo_to_img_points(&self, lats: &[f64], lons: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let n = paired_len(lats, lons);
        let mut lines = Vec::with_capacity(n);
        let mut pixels = Vec::with_capacity(n);
        for (&lat, &lon) in lats.iter().zip(lons) {
            lines.push(self.geo_to_line.eval(lon, lat));
            pixels.push(self.geo_to_pixel.eval(lon, lat));
        }
        Ok((lines, pixels))
    }
}

/// Repair GCP line numbers of multi-slice products.
///
/// In multi-slice products every slice restarts its line numbering, so the
/// GCP lines are not sorted. The spacing of the geolocation grid lines is
/// taken from the upward steps of the sequence, which must all be equal;
/// then, at every downward step (a slice boundary), all the following lines
/// are shifted by `previous - boundary + spacing`.
///
/// Returns `Ok(false)` and leaves `lines` untouched when it is already
/// non-decreasing.
///
/// ```
/// use gsdview::mapper::correct_slice_lines;
///
/// let mut lines = [0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0];
/// assert!(correct_slice_lines(&mut lines).unwrap());
/// assert_eq!(lines, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
/// ```
pub fn correct_slice_lines(lines: &mut [f64]) -> Result<bool> {
    if lines.windows(2).all(|w| w[0] <= w[1]) {
        return Ok(false);
    }

    let (min, max) = lines
        .windows(2)
        .filter(|w| w[1] > w[0])
        .map(|w| w[1] - w[0])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), step| {
            (lo.min(step), hi.max(step))
        });
    if min > max {
        return Err(GeoError::UndefinedSliceSpacing);
    }
    if min != max {
        return Err(GeoError::NonUniformSliceSpacing { min, max });
    }
    let spacing = min;

    let mut offset = 0.0;
    let mut previous = lines[0];
    for line in lines.iter_mut().skip(1) {
        let original = *line;
        if original < previous {
            offset += previous - original + spacing;
        }
        previous = original;
        *line = original + offset;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_lines_untouched() {
        let mut lines = [0.0, 0.0, 10.0, 10.0, 20.0];
        assert!(!correct_slice_lines(&mut lines).unwrap());
        assert_eq!(lines, [0.0, 0.0, 10.0, 10.0, 20.0]);
    }

    #[test]
    fn test_two_slices() {
        let mut lines = [0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0];
        assert!(correct_slice_lines(&mut lines).unwrap());
        assert_eq!(lines, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_three_slices_with_repeated_lines() {
        // two GCPs per geolocation line, spacing 10
        let mut lines = [0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 10.0, 10.0];
        assert!(correct_slice_lines(&mut lines).unwrap());
        assert_eq!(
            lines,
            [0.0, 0.0, 10.0, 10.0, 20.0, 20.0, 30.0, 30.0, 40.0, 40.0, 50.0, 50.0]
        );
    }

    #[test]
    fn test_non_uniform_spacing() {
        let mut lines = [0.0, 1.0, 3.0, 0.0, 1.0, 2.0];
        match correct_slice_lines(&mut lines) {
            Err(GeoError::NonUniformSliceSpacing { min, max }) => {
                assert_eq!(min, 1.0);
                assert_eq!(max, 2.0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_undefined_spacing() {
        let mut lines = [3.0, 2.0, 1.0, 0.0];
        assert!(matches!(
            correct_slice_lines(&mut lines),
            Err(GeoError::UndefinedSliceSpacing)
        ));
    }

    #[test]
    fn test_control_point_arrays() {
        assert!(matches!(
            GridCoordinateMapper::from_control_points(&[0.0; 3], &[0.0; 3], &[0.0; 3], &[0.0; 3], 5),
            Err(GeoError::InsufficientControlPoints { count: 3 })
        ));
        assert!(matches!(
            GridCoordinateMapper::from_control_points(&[0.0; 4], &[0.0; 4], &[0.0; 4], &[0.0; 5], 5),
            Err(GeoError::BadArgument(_))
        ));
    }
}
