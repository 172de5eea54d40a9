#[cfg(test)]
mod tests {
    use crate::cluster::Point;
    use crate::cluster::distance::{distance_planar, sq_distance_planar};

    #[test]
    fn test_distance_planar() {
        let p1 = Point([0.0, 0.0]);
        let p2 = Point([3.0, 4.0]);
        assert_eq!(distance_planar(&p1, &p2), 5.0);
        assert_eq!(distance_planar(&p2, &p1), 5.0);
        assert_eq!(sq_distance_planar(&p1, &p2), 25.0);
        assert_eq!(distance_planar(&p1, &p1), 0.0);
    }

    #[test]
    fn test_distance_planar_world_diagonal() {
        let min = Point([-180.0, -90.0]);
        let max = Point([180.0, 90.0]);
        let expected = (360.0_f64 * 360.0 + 180.0 * 180.0).sqrt();
        assert!((distance_planar(&max, &min) - expected).abs() < 1e-9);
    }
}
