use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Quadrilateral with explicitly named corners, clockwise from the upper left.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub upper_left: Point2<f64>,
    pub upper_right: Point2<f64>,
    pub lower_right: Point2<f64>,
    pub lower_left: Point2<f64>,
}

impl Quad {
    pub fn new(
        upper_left: Point2<f64>,
        upper_right: Point2<f64>,
        lower_right: Point2<f64>,
        lower_left: Point2<f64>,
    ) -> Self {
        Self {
            upper_left,
            upper_right,
            lower_right,
            lower_left,
        }
    }

    /// Build a quad from clockwise `(x, y)` pairs starting at the upper left.
    pub fn from_clockwise(points: [(f64, f64); 4]) -> Self {
        let [ul, ur, lr, ll] = points.map(|(x, y)| Point2::new(x, y));
        Self::new(ul, ur, lr, ll)
    }

    /// Axis-aligned rectangle with corners at `(0, 0)` and `(width, height)`.
    pub fn frame(width: f64, height: f64) -> Self {
        Self::from_clockwise([(0.0, 0.0), (width, 0.0), (width, height), (0.0, height)])
    }

    /// Corners in clockwise order starting at the upper left.
    #[inline]
    pub fn corners(&self) -> [Point2<f64>; 4] {
        [
            self.upper_left,
            self.upper_right,
            self.lower_right,
            self.lower_left,
        ]
    }

    /// Copy of this quad shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let [ul, ur, lr, ll] = self.corners().map(|p| Point2::new(p.x + dx, p.y + dy));
        Self::new(ul, ur, lr, ll)
    }

    /// True if any three corners are collinear (coincident corners included).
    ///
    /// A projective transform between two quads exists and is unique exactly
    /// when neither quad is degenerate in this sense.
    pub fn is_degenerate(&self) -> bool {
        let c = self.corners();

        let mut extent = 0.0_f64;
        for i in 0..4 {
            for j in (i + 1)..4 {
                extent = extent.max((c[i] - c[j]).norm());
            }
        }
        if !extent.is_finite() || extent <= f64::EPSILON {
            return true;
        }

        let tol = 1e-9 * extent * extent;
        [(0, 1, 2), (1, 2, 3), (2, 3, 0), (3, 0, 1)]
            .iter()
            .any(|&(a, b, d)| {
                let u = c[b] - c[a];
                let v = c[d] - c[a];
                (u.x * v.y - u.y * v.x).abs() <= tol
            })
    }
}

/// Four point pairs relating a scanned page to the canonical sheet frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Correspondence {
    /// Corners as located on the scanned page.
    pub source: Quad,
    /// Where those corners belong in the canonical frame.
    pub target: Quad,
}

impl Correspondence {
    pub fn new(source: Quad, target: Quad) -> Self {
        Self { source, target }
    }
}
