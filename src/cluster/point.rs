//! Points and cluster membership lists

use super::distance::{distance_planar, sq_distance_planar};

/// Point represents a geographic coordinate (longitude, latitude)
///
/// The point is stored as [longitude, latitude] where:
/// - `[0]` is longitude
/// - `[1]` is latitude
///
/// Coordinates are WGS84 degrees and distances between points are planar,
/// in the same degree units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point(pub [f64; 2]);

/// PointList is a collection of Points
pub type PointList = Vec<Point>;

/// Cluster represents a result of DBScan clustering work
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Cluster ID
    pub c: usize,
    /// Indices of points belonging to this cluster
    pub points: Vec<usize>,
}

impl Point {
    pub fn new(lon: f64, lat: f64) -> Self {
        Point([lon, lat])
    }

    pub fn lon(&self) -> f64 {
        self.0[0]
    }

    pub fn lat(&self) -> f64 {
        self.0[1]
    }

    /// Returns squared (without sqrt) planar distance between two points
    pub fn sq_dist(&self, b: &Point) -> f64 {
        sq_distance_planar(self, b)
    }

    /// Returns planar distance between two points, in degrees
    pub fn dist(&self, b: &Point) -> f64 {
        distance_planar(self, b)
    }

    /// Snaps both coordinates to the nearest multiple of `size`
    ///
    /// Halfway values round to even. A non-positive or non-finite `size`
    /// leaves the point untouched.
    pub fn snap_to_grid(&self, size: f64) -> Point {
        if !(size.is_finite() && size > 0.0) {
            return *self;
        }
        let snap = |v: f64| (v / size).round_ties_even() * size;
        Point([snap(self.0[0]), snap(self.0[1])])
    }

    /// Hashable identity of the point's exact coordinates
    ///
    /// `-0.0` and `0.0` map to the same key.
    pub fn key(&self) -> (u64, u64) {
        let bits = |v: f64| if v == 0.0 { 0 } else { v.to_bits() };
        (bits(self.0[0]), bits(self.0[1]))
    }
}

impl Cluster {
    /// Component-wise mean of the member coordinates
    ///
    /// Returns `None` for an empty cluster.
    pub fn centroid(&self, points: &[Point]) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }

        let mut center = Point([0.0, 0.0]);
        for &i in &self.points {
            for j in 0..2 {
                center.0[j] += points[i].0[j];
            }
        }
        for j in 0..2 {
            center.0[j] /= self.points.len() as f64;
        }

        Some(center)
    }
}
