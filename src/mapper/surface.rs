//! Bivariate smoothing surfaces fitted to scattered data.
//!
//! A surface of degree `k` is the least-squares tensor product polynomial
//! `sum_ij c_ij T_i(u) T_j(v)`, `0 <= i, j <= k`, where `T_i` are Chebyshev
//! polynomials and `(u, v)` are the inputs rescaled so that the bounding box
//! of the fitted scatter maps to `[-1, 1] x [-1, 1]`.

use nalgebra::{DMatrix, DVector};
use ndarray::Array2;

use crate::errors::{GeoError, Result};

/// Singular values below this fraction of the largest one are treated as
/// zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// Degree used for a fit over `points` samples:
/// `min(max_degree, floor(sqrt(points)) - 1)`, at least 1.
///
/// The degree never needs more coefficients than there are points.
pub fn degree_for_points(points: usize, max_degree: usize) -> usize {
    let root = (points as f64).sqrt().floor() as usize;
    root.saturating_sub(1).min(max_degree).max(1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmoothSurface {
    degree: usize,
    x_center: f64,
    x_half_width: f64,
    y_center: f64,
    y_half_width: f64,
    rank: usize,
    coefficients: Vec<f64>,
}

impl SmoothSurface {
    /// Fit `z = f(x, y)` through the scatter.
    ///
    /// Rank deficient systems, e.g. points on too few distinct rows or
    /// columns for the requested degree, get the minimal-norm least-squares
    /// solution; check [`is_full_rank`](Self::is_full_rank). Fails with
    /// [`GeoError::SurfaceFitFailure`] when there are fewer points than
    /// coefficients or the points do not span a 2-D region.
    pub fn fit(x: &[f64], y: &[f64], z: &[f64], degree: usize) -> Result<SmoothSurface> {
        let points = x.len();
        if y.len() != points || z.len() != points {
            return Err(GeoError::BadArgument(format!(
                "surface samples have different lengths: {}, {}, {}",
                points,
                y.len(),
                z.len()
            )));
        }

        let degree = degree.max(1);
        let order = degree + 1;
        let terms = order * order;
        let failure = |msg: &str| GeoError::SurfaceFitFailure {
            degree,
            points,
            msg: msg.to_string(),
        };

        if points < terms {
            return Err(failure(&format!("at least {terms} points are required")));
        }
        if x.iter().chain(y).chain(z).any(|v| !v.is_finite()) {
            return Err(failure("non finite sample"));
        }

        let (x_center, x_half_width) = center_and_half_width(x);
        let (y_center, y_half_width) = center_and_half_width(y);
        if x_half_width <= 0.0 || y_half_width <= 0.0 {
            return Err(failure("samples do not span a 2-D region"));
        }

        let mut surface = SmoothSurface {
            degree,
            x_center,
            x_half_width,
            y_center,
            y_half_width,
            rank: 0,
            coefficients: Vec::new(),
        };

        let mut design = DMatrix::<f64>::zeros(points, terms);
        let mut tu = vec![0.0; order];
        let mut tv = vec![0.0; order];
        for row in 0..points {
            chebyshev(surface.scale_x(x[row]), &mut tu);
            chebyshev(surface.scale_y(y[row]), &mut tv);
            for i in 0..order {
                for j in 0..order {
                    design[(row, i * order + j)] = tu[i] * tv[j];
                }
            }
        }
        let rhs = DVector::from_column_slice(z);

        let svd = design.svd(true, true);
        let eps = svd.singular_values.max() * RANK_TOLERANCE;
        let rank = svd.rank(eps);
        if rank < terms {
            log::debug!("rank deficient system ({rank} < {terms}), using the minimal-norm solution");
        }
        let solution = svd.solve(&rhs, eps).map_err(failure)?;
        if solution.iter().any(|c| !c.is_finite()) {
            return Err(failure("non finite coefficients"));
        }
        surface.rank = rank;
        surface.coefficients = solution.iter().copied().collect();

        Ok(surface)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Numerical rank of the fitted system.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// `true` when every coefficient is determined by the samples.
    pub fn is_full_rank(&self) -> bool {
        let order = self.degree + 1;
        self.rank == order * order
    }

    /// Evaluate the surface at a single point.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        let order = self.degree + 1;
        let mut tu = vec![0.0; order];
        let mut tv = vec![0.0; order];
        chebyshev(self.scale_x(x), &mut tu);
        chebyshev(self.scale_y(y), &mut tv);
        self.combine(&tu, &tv)
    }

    /// Evaluate the surface on the grid `xs x ys`; element `[i, j]` is
    /// `f(xs[i], ys[j])`.
    pub fn eval_grid(&self, xs: &[f64], ys: &[f64]) -> Array2<f64> {
        let order = self.degree + 1;
        let basis = |values: &[f64], scale: &dyn Fn(f64) -> f64| -> Vec<Vec<f64>> {
            values
                .iter()
                .map(|&value| {
                    let mut t = vec![0.0; order];
                    chebyshev(scale(value), &mut t);
                    t
                })
                .collect()
        };
        let tus = basis(xs, &|x: f64| self.scale_x(x));
        let tvs = basis(ys, &|y: f64| self.scale_y(y));

        Array2::from_shape_fn((xs.len(), ys.len()), |(i, j)| self.combine(&tus[i], &tvs[j]))
    }

    #[cfg(test)]
    fn rms_residual(&self, x: &[f64], y: &[f64], z: &[f64]) -> f64 {
        let n = x.len().min(y.len()).min(z.len());
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = (0..n)
            .map(|k| {
                let r = self.eval(x[k], y[k]) - z[k];
                r * r
            })
            .sum();
        (sum / n as f64).sqrt()
    }

    fn scale_x(&self, x: f64) -> f64 {
        (x - self.x_center) / self.x_half_width
    }

    fn scale_y(&self, y: f64) -> f64 {
        (y - self.y_center) / self.y_half_width
    }

    fn combine(&self, tu: &[f64], tv: &[f64]) -> f64 {
        let order = self.degree + 1;
        let mut value = 0.0;
        for (i, tu_i) in tu.iter().enumerate() {
            let row = &self.coefficients[i * order..(i + 1) * order];
            let inner: f64 = row.iter().zip(tv).map(|(c, t)| c * t).sum();
            value += tu_i * inner;
        }
        value
    }
}

fn center_and_half_width(values: &[f64]) -> (f64, f64) {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    ((min + max) / 2.0, (max - min) / 2.0)
}

/// Chebyshev polynomials `T_0(t) .. T_{n-1}(t)` into `out`.
fn chebyshev(t: f64, out: &mut [f64]) {
    for k in 0..out.len() {
        out[k] = match k {
            0 => 1.0,
            1 => t,
            _ => 2.0 * t * out[k - 1] - out[k - 2],
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: usize, cols: usize) -> (Vec<f64>, Vec<f64>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for r in 0..rows {
            for c in 0..cols {
                x.push(r as f64 * 10.0);
                y.push(c as f64 * 7.0 + 3.0);
            }
        }
        (x, y)
    }

    #[test]
    fn test_degree_policy() {
        assert_eq!(degree_for_points(4, 5), 1);
        assert_eq!(degree_for_points(8, 5), 1);
        assert_eq!(degree_for_points(9, 5), 2);
        assert_eq!(degree_for_points(36, 5), 5);
        assert_eq!(degree_for_points(3000, 5), 5);
        assert_eq!(degree_for_points(100, 3), 3);
        assert_eq!(degree_for_points(0, 5), 1);
    }

    #[test]
    fn test_bilinear_interpolates_four_points() {
        let x = [0.0, 0.0, 10.0, 10.0];
        let y = [0.0, 20.0, 0.0, 20.0];
        let z = [1.0, 3.0, 4.0, 11.0];
        let surface = SmoothSurface::fit(&x, &y, &z, 1).unwrap();
        for k in 0..4 {
            assert!((surface.eval(x[k], y[k]) - z[k]).abs() < 1e-9);
        }
        // bilinear: center is the mean of the corners
        assert!((surface.eval(5.0, 10.0) - 4.75).abs() < 1e-9);
    }

    #[test]
    fn test_reproduces_polynomial() {
        let (x, y) = grid(6, 6);
        let f = |x: f64, y: f64| 0.5 + 0.01 * x - 0.2 * y + 1e-4 * x * x * y - 3e-5 * y * y * y;
        let z: Vec<f64> = x.iter().zip(&y).map(|(&a, &b)| f(a, b)).collect();
        let surface = SmoothSurface::fit(&x, &y, &z, 3).unwrap();
        assert!(surface.rms_residual(&x, &y, &z) < 1e-9);
        assert!((surface.eval(12.5, 20.0) - f(12.5, 20.0)).abs() < 1e-8);
    }

    #[test]
    fn test_eval_grid_matches_eval() {
        let (x, y) = grid(4, 4);
        let z: Vec<f64> = x.iter().zip(&y).map(|(a, b)| a * b + a).collect();
        let surface = SmoothSurface::fit(&x, &y, &z, 2).unwrap();
        let xs = [0.0, 5.0, 30.0];
        let ys = [3.0, 10.0];
        let values = surface.eval_grid(&xs, &ys);
        assert_eq!(values.dim(), (3, 2));
        for (i, &xi) in xs.iter().enumerate() {
            for (j, &yj) in ys.iter().enumerate() {
                assert!((values[[i, j]] - surface.eval(xi, yj)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_rank_deficient_fits() {
        // collinear samples: the plane through them is still found
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 2.0, 3.0];
        let z = [0.0, 2.0, 4.0, 6.0];
        let surface = SmoothSurface::fit(&x, &y, &z, 1).unwrap();
        assert!(!surface.is_full_rank());
        assert!(surface.rms_residual(&x, &y, &z) < 1e-9);

        // only two distinct rows cannot determine a quadratic
        let (x, y) = grid(2, 8);
        let z: Vec<f64> = y.iter().map(|v| 2.0 * v - 1.0).collect();
        let surface = SmoothSurface::fit(&x, &y, &z, 2).unwrap();
        assert_eq!(surface.degree(), 2);
        assert!(!surface.is_full_rank());
        assert!(surface.rms_residual(&x, &y, &z) < 1e-9);
        assert!(SmoothSurface::fit(&x, &y, &z, 1).unwrap().is_full_rank());
    }

    #[test]
    fn test_fit_failures() {
        // all samples on one row
        let x = [5.0, 5.0, 5.0, 5.0, 5.0];
        let y = [0.0, 1.0, 2.0, 3.0, 4.0];
        let z = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert!(matches!(
            SmoothSurface::fit(&x, &y, &z, 1),
            Err(GeoError::SurfaceFitFailure { degree: 1, .. })
        ));

        // too few points
        assert!(matches!(
            SmoothSurface::fit(&[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0], &[1.0, 2.0, 3.0], 1),
            Err(GeoError::SurfaceFitFailure { .. })
        ));

        // non finite samples
        assert!(matches!(
            SmoothSurface::fit(&[0.0, 1.0, 0.0, 1.0], &[0.0, 0.0, 1.0, 1.0], &[1.0, f64::NAN, 3.0, 4.0], 1),
            Err(GeoError::SurfaceFitFailure { .. })
        ));
    }
}
