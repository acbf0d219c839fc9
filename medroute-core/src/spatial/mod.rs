//! Coordinate handling, bounding boxes and nearest-node snapping

mod bbox;
mod nearest;

pub use bbox::BoundingBox;
pub use nearest::{DEFAULT_LINEAR_SCAN_THRESHOLD, NearestNodeIndex, SnappedPoint};

use geo::{Distance, Haversine, Point};

use crate::Error;

/// Checks that a coordinate lies in lat ∈ [-90, 90], lon ∈ [-180, 180]
/// and returns it as a point (x = lon, y = lat).
pub fn validate_coordinate(lat: f64, lon: f64) -> Result<Point<f64>, Error> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Ok(Point::new(lon, lat))
    } else {
        Err(Error::InvalidCoordinate { lat, lon })
    }
}

/// Great-circle distance in metres
pub fn haversine_m(a: Point<f64>, b: Point<f64>) -> f64 {
    Haversine.distance(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_ranges() {
        assert!(validate_coordinate(90.0, -180.0).is_ok());
        assert!(validate_coordinate(-90.0, 180.0).is_ok());
        assert!(matches!(
            validate_coordinate(90.5, 0.0),
            Err(Error::InvalidCoordinate { .. })
        ));
        assert!(validate_coordinate(0.0, 180.1).is_err());
        assert!(validate_coordinate(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn haversine_is_symmetric() {
        let brussels = Point::new(4.3517, 50.8503);
        let antwerp = Point::new(4.4025, 51.2194);
        let d = haversine_m(brussels, antwerp);
        assert_eq!(d, haversine_m(antwerp, brussels));
        assert!((40_000.0..42_000.0).contains(&d), "{d}");
    }
}
