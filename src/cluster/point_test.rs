#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_centroid() {
        let points = vec![
            Point([30.244759, 59.955982]),
            Point([30.24472, 59.955975]),
            Point([30.244358, 59.96698]),
        ];
        let c1 = Cluster {
            c: 0,
            points: vec![0, 1, 2],
        };

        let center = c1.centroid(&points).unwrap();
        assert!((center.lon() - 30.244612333333333).abs() < 1e-12);
        assert!((center.lat() - 59.95964566666667).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_of_subset() {
        let points = vec![Point([0.0, 0.0]), Point([10.0, 10.0]), Point([2.0, 4.0])];
        let cluster = Cluster {
            c: 3,
            points: vec![0, 2],
        };
        assert_eq!(cluster.centroid(&points), Some(Point([1.0, 2.0])));
    }

    #[test]
    fn test_centroid_empty() {
        let cluster = Cluster {
            c: 0,
            points: vec![],
        };
        assert_eq!(cluster.centroid(&[Point([1.0, 1.0])]), None);
    }

    #[test]
    fn test_snap_to_grid() {
        let p = Point([-87.6243, 41.7612]);
        let snapped = p.snap_to_grid(0.01);
        assert!((snapped.lon() - -87.62).abs() < 1e-9);
        assert!((snapped.lat() - 41.76).abs() < 1e-9);

        // halfway rounds to even multiples
        assert_eq!(Point([0.5, 1.5]).snap_to_grid(1.0), Point([0.0, 2.0]));
        assert_eq!(Point([2.5, -2.5]).snap_to_grid(1.0), Point([2.0, -2.0]));
    }

    #[test]
    fn test_snap_to_grid_degenerate_size() {
        let p = Point([1.234, 5.678]);
        assert_eq!(p.snap_to_grid(0.0), p);
        assert_eq!(p.snap_to_grid(-1.0), p);
        assert_eq!(p.snap_to_grid(f64::NAN), p);
        assert_eq!(p.snap_to_grid(f64::INFINITY), p);
    }

    #[test]
    fn test_key_merges_signed_zero() {
        assert_eq!(Point([0.0, -0.0]).key(), Point([-0.0, 0.0]).key());
        assert_ne!(Point([0.0, 1.0]).key(), Point([1.0, 0.0]).key());
    }
}
