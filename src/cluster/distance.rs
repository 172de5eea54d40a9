use super::point::Point;

/// Squared planar distance between two points, in degrees²
///
/// Clustering compares this against `eps * eps` so the hot path never
/// takes a square root.
pub fn sq_distance_planar(p1: &Point, p2: &Point) -> f64 {
    let dx = p1.0[0] - p2.0[0];
    let dy = p1.0[1] - p2.0[1];

    dx * dx + dy * dy
}

/// Planar distance between two points, in degrees
///
/// This is the distance used both for the viewport diagonal and for the
/// clustering neighbourhood, so thresholds derived from one are comparable
/// with the other.
pub fn distance_planar(p1: &Point, p2: &Point) -> f64 {
    sq_distance_planar(p1, p2).sqrt()
}
