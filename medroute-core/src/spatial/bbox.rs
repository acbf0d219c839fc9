use geo::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned geographic box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Smallest box around `points`, grown by `margin` degrees on every side
    /// and clamped to valid coordinates. `None` when there are no points.
    pub fn around(points: impl IntoIterator<Item = Point<f64>>, margin: f64) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let start = Self::new(first.y(), first.x(), first.y(), first.x());
        let tight = points.fold(start, |bbox, p| Self {
            south: bbox.south.min(p.y()),
            west: bbox.west.min(p.x()),
            north: bbox.north.max(p.y()),
            east: bbox.east.max(p.x()),
        });
        Some(Self {
            south: (tight.south - margin).max(-90.0),
            west: (tight.west - margin).max(-180.0),
            north: (tight.north + margin).min(90.0),
            east: (tight.east + margin).min(180.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_by_margin_and_clamps() {
        let origin = Point::new(4.35, 50.85);
        let hospital = Point::new(4.40, 50.80);
        let bbox = BoundingBox::around([origin, hospital], 0.1).unwrap();
        assert!((bbox.south - 50.70).abs() < 1e-9);
        assert!((bbox.north - 50.95).abs() < 1e-9);
        assert!((bbox.west - 4.25).abs() < 1e-9);
        assert!((bbox.east - 4.50).abs() < 1e-9);

        let pole = BoundingBox::around([Point::new(179.95, 89.95)], 0.1).unwrap();
        assert_eq!((pole.north, pole.east), (90.0, 180.0));
    }

    #[test]
    fn no_points_no_box() {
        assert!(BoundingBox::around(std::iter::empty(), 0.1).is_none());
    }
}
