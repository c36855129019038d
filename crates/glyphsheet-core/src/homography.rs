use crate::{Correspondence, GeometryError, Quad, QuadRole};
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Projective transform from canonical-frame coordinates to scan coordinates.
///
/// Normalized so that the bottom-right coefficient is 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectiveTransform {
    pub h: Matrix3<f64>,
}

/// Dense per-pixel sampling locations, row-major.
///
/// `map_x[r * width + c]` / `map_y[r * width + c]` give the fractional
/// scan-frame location that canonical pixel `(r, c)` is read from.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateMap {
    pub width: usize,
    pub height: usize,
    pub map_x: Vec<f32>,
    pub map_y: Vec<f32>,
}

impl CoordinateMap {
    /// Sampling location `(x, y)` for canonical pixel `(row, col)`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> (f32, f32) {
        let idx = row * self.width + col;
        (self.map_x[idx], self.map_y[idx])
    }
}

fn conditioning(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

// Translate to the centroid and scale to a mean distance of sqrt(2); keeps
// the 8x8 system well conditioned for page-sized pixel coordinates.
fn condition_quad(quad: &Quad) -> ([Point2<f64>; 4], Matrix3<f64>) {
    let pts = quad.corners();

    let cx = pts.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let mean_dist = pts
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / 4.0;

    let t = conditioning(cx, cy, mean_dist);
    let out = pts.map(|p| {
        let v = t * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v[0], v[1])
    });
    (out, t)
}

impl ProjectiveTransform {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    /// Solve for the transform carrying each target corner onto its source corner.
    ///
    /// Unknowns are `[h11 h12 h13 h21 h22 h23 h31 h32]` with `h33 = 1`. For a
    /// target corner `(u, v)` and its source corner `(x, y)`:
    ///
    /// ```text
    /// h11 u + h12 v + h13 - x h31 u - x h32 v = x     (rows 0..4)
    /// h21 u + h22 v + h23 - y h31 u - y h32 v = y     (rows 4..8)
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn from_correspondence(c: &Correspondence) -> Result<Self, GeometryError> {
        if c.source.is_degenerate() {
            return Err(GeometryError::DegenerateQuad {
                role: QuadRole::Source,
            });
        }
        if c.target.is_degenerate() {
            return Err(GeometryError::DegenerateQuad {
                role: QuadRole::Target,
            });
        }

        let (src_n, t_src) = condition_quad(&c.source);
        let (dst_n, t_dst) = condition_quad(&c.target);

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for k in 0..4 {
            let u = dst_n[k].x;
            let v = dst_n[k].y;
            let x = src_n[k].x;
            let y = src_n[k].y;

            a[(k, 0)] = u;
            a[(k, 1)] = v;
            a[(k, 2)] = 1.0;
            a[(k, 6)] = -u * x;
            a[(k, 7)] = -v * x;
            b[k] = x;

            let r = k + 4;
            a[(r, 3)] = u;
            a[(r, 4)] = v;
            a[(r, 5)] = 1.0;
            a[(r, 6)] = -u * y;
            a[(r, 7)] = -v * y;
            b[r] = y;
        }

        let coeffs = a.try_inverse().ok_or(GeometryError::Singular)? * b;

        let hn = Matrix3::<f64>::new(
            coeffs[0], coeffs[1], coeffs[2], //
            coeffs[3], coeffs[4], coeffs[5], //
            coeffs[6], coeffs[7], 1.0,
        );

        // hn works in conditioned coordinates: src = T_src^-1 * hn * T_dst * dst
        let t_src_inv = t_src.try_inverse().ok_or(GeometryError::Singular)?;
        let h = t_src_inv * hn * t_dst;

        let s = h[(2, 2)];
        if s.abs() < 1e-12 {
            return Err(GeometryError::Singular);
        }
        let h = h / s;
        if h.iter().any(|v| !v.is_finite()) {
            return Err(GeometryError::NonFinite);
        }

        Ok(Self::new(h))
    }

    /// Map a canonical-frame point `(x, y)` into the scan frame.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let v = self.h * Vector3::new(x, y, 1.0);
        (v[0] / v[2], v[1] / v[2])
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// Expand into a dense map for a `width` × `height` canonical frame.
    ///
    /// Pixel `(row, col)` is mapped as the homogeneous vector `(col, row, 1)`.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn coordinate_map(&self, width: usize, height: usize) -> CoordinateMap {
        let mut map_x = Vec::with_capacity(width * height);
        let mut map_y = Vec::with_capacity(width * height);

        for row in 0..height {
            for col in 0..width {
                let (x, y) = self.apply(col as f64, row as f64);
                map_x.push(x as f32);
                map_y.push(y as f32);
            }
        }

        CoordinateMap {
            width,
            height,
            map_x,
            map_y,
        }
    }
}

/// Solve the correspondence and expand it over a `width` × `height` frame.
pub fn rectification_map(
    c: &Correspondence,
    width: usize,
    height: usize,
) -> Result<CoordinateMap, GeometryError> {
    Ok(ProjectiveTransform::from_correspondence(c)?.coordinate_map(width, height))
}
