use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

/// Center of mass of a mask, from raw pixel moments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centroid {
    pub row: f64,
    pub col: f64,
}

impl Centroid {
    /// `None` for an all-zero mask.
    pub fn of(mask: &GrayImage) -> Option<Self> {
        let mut m00 = 0.0f64;
        let mut m10 = 0.0f64;
        let mut m01 = 0.0f64;
        for (x, y, px) in mask.enumerate_pixels() {
            let v = px.0[0] as f64;
            if v == 0.0 {
                continue;
            }
            m00 += v;
            m10 += x as f64 * v;
            m01 += y as f64 * v;
        }
        if m00 == 0.0 {
            return None;
        }
        Some(Self {
            row: m01 / m00,
            col: m10 / m00,
        })
    }
}

/// Axis-aligned box, inclusive of its edge pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub row: u32,
    pub col: u32,
    pub height: u32,
    pub width: u32,
}

impl BoundingBox {
    /// Box of the external contour whose box has the largest area.
    ///
    /// Ties keep the first contour found. `None` when the mask has no
    /// foreground.
    pub fn of(mask: &GrayImage) -> Option<Self> {
        let contours = find_contours::<i32>(mask);

        let mut best: Option<(u64, BoundingBox)> = None;
        for contour in contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        {
            let Some(bbox) = Self::enclosing(contour.points.iter().map(|p| (p.x, p.y))) else {
                continue;
            };
            let area = bbox.area();
            if best.map_or(true, |(best_area, _)| area > best_area) {
                best = Some((area, bbox));
            }
        }
        best.map(|(_, bbox)| bbox)
    }

    fn enclosing(points: impl Iterator<Item = (i32, i32)>) -> Option<Self> {
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for (x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if min_x > max_x || min_x < 0 || min_y < 0 {
            return None;
        }
        Some(Self {
            row: min_y as u32,
            col: min_x as u32,
            height: (max_y - min_y + 1) as u32,
            width: (max_x - min_x + 1) as u32,
        })
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.height as u64 * self.width as u64
    }

    /// `(row + height / 2, col + width / 2)`, integer division.
    #[inline]
    pub fn center(&self) -> (u32, u32) {
        (self.row + self.height / 2, self.col + self.width / 2)
    }
}
