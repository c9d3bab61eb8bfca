use serde::{Deserialize, Serialize};

use crate::config::constants::EARTH_RADIUS_M;
use crate::config::locator_config::DistanceMetric;

/// A position as read from GeoJSON: `x` is longitude, `y` is latitude.
/// No range checks; projected coordinates pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn haversine_distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.y.to_radians();
        let lat2 = other.y.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.x - self.x).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }

    pub fn distance_with(&self, other: &Coordinate, metric: DistanceMetric) -> f64 {
        match metric {
            DistanceMetric::Euclidean => self.distance_to(other),
            DistanceMetric::Haversine => self.haversine_distance_to(other),
        }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(xy: [f64; 2]) -> Self {
        Coordinate::new(xy[0], xy[1])
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Coordinate::new(x, y)
    }
}

/// Anything with a location that can be plotted or snapped to the graph.
pub trait POI {
    fn get_coordinate(&self) -> &Coordinate;
    fn get_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn euclidean_distance() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);
        assert_relative_eq!(a.distance_to(&b), 5.0);
        assert_relative_eq!(a.distance_with(&b, DistanceMetric::Euclidean), 5.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = Coordinate::new(-3.7, 40.0);
        let b = Coordinate::new(-3.7, 41.0);
        let d = a.haversine_distance_to(&b);
        assert_relative_eq!(d, 111_195.0, max_relative = 1e-3);
    }

    #[test]
    fn haversine_is_zero_for_identical_points() {
        let a = Coordinate::new(-99.13, 19.43);
        assert_eq!(a.distance_with(&a, DistanceMetric::Haversine), 0.0);
    }
}
