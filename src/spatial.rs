//! Geodesic distance and hotspot geometry.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Meters spanned by one degree of latitude.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        Haversine::distance(self.to_point(), other.to_point())
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Axis-aligned square drawn around a hotspot center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SquareBounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl SquareBounds {
    /// Builds a square of `side_m` meters centered on `center`.
    ///
    /// The longitude half-width is widened by `1 / cos(latitude)` so the
    /// square keeps its ground size away from the equator.
    pub fn around(center: Coordinate, side_m: f64) -> Self {
        let half = side_m / 2.0;
        let lat_delta = half / METERS_PER_DEGREE;
        let lon_delta = half / (center.latitude.to_radians().cos() * METERS_PER_DEGREE);

        Self {
            south_west: Coordinate::new(center.latitude - lat_delta, center.longitude - lon_delta),
            north_east: Coordinate::new(center.latitude + lat_delta, center.longitude + lon_delta),
        }
    }

    pub fn contains(&self, at: &Coordinate) -> bool {
        (self.south_west.latitude..=self.north_east.latitude).contains(&at.latitude)
            && (self.south_west.longitude..=self.north_east.longitude).contains(&at.longitude)
    }

    /// Renders the square as a closed WKT polygon ring (`lon lat` order).
    pub fn to_wkt(&self) -> String {
        let (s, w) = (self.south_west.latitude, self.south_west.longitude);
        let (n, e) = (self.north_east.latitude, self.north_east.longitude);
        format!("POLYGON(({w} {s}, {e} {s}, {e} {n}, {w} {n}, {w} {s}))")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let la = Coordinate::new(34.0522, -118.2437);
        assert_eq!(la.distance_m(&la), 0.0);
    }

    #[test]
    fn test_distance_is_geodesic() {
        // 0.001 degrees of latitude is roughly 111 meters anywhere.
        let a = Coordinate::new(34.0, -118.0);
        let b = Coordinate::new(34.001, -118.0);
        let d = a.distance_m(&b);
        assert!((d - 111.2).abs() < 0.5, "got {d}");

        // The same longitude step is shorter at LA's latitude than a latitude step.
        let c = Coordinate::new(34.0, -117.999);
        assert!(a.distance_m(&c) < d);
    }

    #[test]
    fn test_square_bounds_contains_center() {
        let center = Coordinate::new(34.05, -118.24);
        let bounds = SquareBounds::around(center, 400.0);

        assert!(bounds.contains(&center));
        assert!(!bounds.contains(&Coordinate::new(34.06, -118.24)));
        assert!(bounds.south_west.latitude < center.latitude);
        assert!(bounds.north_east.longitude > center.longitude);
    }

    #[test]
    fn test_square_bounds_side_length() {
        let center = Coordinate::new(34.05, -118.24);
        let bounds = SquareBounds::around(center, 400.0);

        let west = Coordinate::new(center.latitude, bounds.south_west.longitude);
        let east = Coordinate::new(center.latitude, bounds.north_east.longitude);
        let width = west.distance_m(&east);
        assert!((width - 400.0).abs() < 2.0, "got {width}");
    }

    #[test]
    fn test_wkt_ring_is_closed() {
        let bounds = SquareBounds::around(Coordinate::new(0.0, 0.0), 200.0);
        let wkt = bounds.to_wkt();

        assert!(wkt.starts_with("POLYGON(("));
        let inner = wkt.trim_start_matches("POLYGON((").trim_end_matches("))");
        let points: Vec<_> = inner.split(", ").collect();
        assert_eq!(points.len(), 5);
        assert_eq!(points.first(), points.last());
    }
}
