#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::cluster::Point;
    use crate::viewport::{BoundingBox, Viewport, ViewportSettings};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn bbox(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> BoundingBox {
        BoundingBox {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    #[test]
    fn test_missing_params_use_defaults() {
        let parsed = BoundingBox::from_params(&HashMap::new(), &BoundingBox::WORLD);
        assert_eq!(parsed, BoundingBox::WORLD);
    }

    #[test]
    fn test_bad_params_fall_back_per_side() {
        let parsed = BoundingBox::from_params(
            &params(&[
                ("min_lat", "40"),
                ("max_lat", " 40.1 "),
                ("min_lon", "west"),
                ("max_lon", "NaN"),
            ]),
            &BoundingBox::WORLD,
        );
        assert_eq!(parsed, bbox(40.0, 40.1, -180.0, 180.0));
    }

    #[test]
    fn test_legacy_default_swaps_ranges() {
        let parsed = BoundingBox::from_params(&params(&[("min_lat", "1")]), &BoundingBox::LEGACY);
        assert_eq!(parsed, bbox(1.0, 180.0, -90.0, 90.0));
    }

    #[test]
    fn test_scalars_scale_with_diagonal() {
        let viewport = Viewport::resolve(bbox(0.0, 3.0, 0.0, 4.0), &ViewportSettings::default());
        assert_eq!(viewport.diagonal(), 5.0);
        assert_eq!(viewport.max_distance_between_objects, 5.0 / 8.0);
        assert_eq!(viewport.grid_cell_size, 5.0 / 500.0);

        let settings = ViewportSettings {
            max_objects_in_line: 5.0,
            grid_cell_count: 50.0,
            ..ViewportSettings::default()
        };
        let viewport = Viewport::resolve(bbox(0.0, 3.0, 0.0, 4.0), &settings);
        assert_eq!(viewport.max_distance_between_objects, 1.0);
        assert_eq!(viewport.grid_cell_size, 0.1);
    }

    #[test]
    fn test_world_scalars() {
        let viewport = Viewport::resolve(BoundingBox::WORLD, &ViewportSettings::default());
        let diagonal = (360.0f64 * 360.0 + 180.0 * 180.0).sqrt();
        assert!((viewport.max_distance_between_objects - diagonal / 8.0).abs() < 1e-12);
        assert!((viewport.grid_cell_size - diagonal / 500.0).abs() < 1e-12);
    }

    #[test]
    fn test_covers_boundary() {
        let viewport = Viewport::resolve(bbox(40.0, 40.1, 40.0, 40.1), &ViewportSettings::default());
        assert!(viewport.covers(&Point::new(40.05, 40.05)));
        assert!(viewport.covers(&Point::new(40.0, 40.0)));
        assert!(viewport.covers(&Point::new(40.1, 40.05)));
        assert!(!viewport.covers(&Point::new(40.2, 40.05)));
        assert!(!viewport.covers(&Point::new(40.05, 39.99)));
    }

    #[test]
    fn test_polygon_ring_order() {
        let viewport = Viewport::resolve(bbox(1.0, 2.0, 3.0, 4.0), &ViewportSettings::default());
        let ring: Vec<(f64, f64)> = viewport
            .polygon
            .exterior()
            .coords()
            .map(|c| (c.x, c.y))
            .collect();
        assert_eq!(
            ring,
            vec![(3.0, 1.0), (3.0, 2.0), (4.0, 2.0), (4.0, 1.0), (3.0, 1.0)]
        );
    }

    #[test]
    fn test_zero_area_covers_nothing() {
        let viewport = Viewport::resolve(bbox(40.0, 40.0, 40.0, 40.1), &ViewportSettings::default());
        assert!(viewport.is_empty());
        assert!(!viewport.covers(&Point::new(40.05, 40.0)));

        let viewport = Viewport::resolve(bbox(40.0, 40.0, 40.0, 40.0), &ViewportSettings::default());
        assert!(!viewport.covers(&Point::new(40.0, 40.0)));
        assert_eq!(viewport.max_distance_between_objects, 0.0);
    }

    #[test]
    fn test_inverted_box_covers_rectangle() {
        let viewport = Viewport::resolve(bbox(40.1, 40.0, 40.1, 40.0), &ViewportSettings::default());
        assert!(!viewport.is_empty());
        assert!(viewport.covers(&Point::new(40.05, 40.05)));
        assert!(!viewport.covers(&Point::new(41.0, 40.05)));
        assert!(viewport.max_distance_between_objects > 0.0);
    }
}
