#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use crate::aggregate::{Strategy, aggregate};
    use crate::cluster::Point;
    use crate::filter::{DateRange, VehicleFilter, select_in_viewport};
    use crate::fixture_test::{date, five_groups, vehicle};
    use crate::model::MapVehicle;
    use crate::viewport::{BoundingBox, Viewport, ViewportSettings};

    fn viewport(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Viewport {
        let bbox = BoundingBox {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        };
        Viewport::resolve(bbox, &ViewportSettings::default())
    }

    fn tight_viewport() -> Viewport {
        viewport(40.0, 40.1, 40.0, 40.1)
    }

    fn world_viewport() -> Viewport {
        Viewport::resolve(BoundingBox::WORLD, &ViewportSettings::default())
    }

    fn audi() -> VehicleFilter {
        VehicleFilter {
            vehicle_make_icontains: Some("AUDI".to_string()),
            ..VehicleFilter::default()
        }
    }

    fn map_vehicle(lon: f64, lat: f64) -> MapVehicle {
        vehicle(1, Some(Point::new(lon, lat)))
            .to_map_vehicle()
            .unwrap()
    }

    #[test]
    fn test_whole_world_is_one_cluster() {
        let viewport = world_viewport();
        let records = select_in_viewport(&five_groups(), &VehicleFilter::default(), &viewport);
        assert_eq!(records.len(), 50);

        for strategy in [Strategy::Exact, Strategy::Grid] {
            let clusters = aggregate(&records, &viewport, strategy);
            assert_eq!(clusters.len(), 1, "{strategy:?}");
            assert_eq!(clusters[0].vehicles_count, 50);
            assert_eq!(clusters[0].cluster, 0);
            assert_eq!(clusters[0].vehicle_make, None);
            assert_eq!(clusters[0].creation_date, None);
        }
    }

    #[test]
    fn test_rows_inside_tight_viewport() {
        let viewport = tight_viewport();
        let records = select_in_viewport(&five_groups(), &audi(), &viewport);
        assert_eq!(records.len(), 20);

        let clusters = aggregate(&records, &viewport, Strategy::Exact);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].vehicles_count, 10);
        assert_eq!(clusters[1].vehicles_count, 10);

        // first row at latitude 40.02, longitudes 40.005 .. 40.095
        let centroid = clusters[0].location;
        assert!((centroid.lon() - 40.05).abs() < 1e-9);
        assert!((centroid.lat() - 40.02).abs() < 1e-9);
        assert!((clusters[1].location.lat() - 40.06).abs() < 1e-9);
    }

    #[test]
    fn test_grid_agrees_with_exact_on_fixture() {
        let viewport = tight_viewport();
        let filters = [
            audi(),
            VehicleFilter {
                completion_date: DateRange {
                    lt: Some(date(2021, 1, 1)),
                    ..DateRange::default()
                },
                ..audi()
            },
            VehicleFilter::default(),
        ];

        for filter in filters {
            let records = select_in_viewport(&five_groups(), &filter, &viewport);
            let exact = aggregate(&records, &viewport, Strategy::Exact);
            let grid = aggregate(&records, &viewport, Strategy::Grid);

            let total = |clusters: &[crate::model::MapCluster]| {
                clusters.iter().map(|c| c.vehicles_count).sum::<usize>()
            };
            assert_eq!(total(&exact), records.len());
            assert_eq!(total(&grid), records.len());
            assert!(exact.len().abs_diff(grid.len()) <= 1);
        }
    }

    #[test]
    fn test_single_member_keeps_attributes() {
        let viewport = viewport(0.0, 10.0, 0.0, 10.0);
        let mut far = map_vehicle(9.0, 9.0);
        far.vehicle_make = Some("Ford".to_string());
        let records = vec![map_vehicle(1.0, 1.0), map_vehicle(1.1, 1.0), far.clone()];

        let clusters = aggregate(&records, &viewport, Strategy::Exact);
        assert_eq!(clusters.len(), 2);

        assert_eq!(clusters[0].vehicles_count, 2);
        assert_eq!(clusters[0].vehicle_color, None);
        assert_eq!(clusters[0].type_of_service_request, None);

        let single = &clusters[1];
        assert_eq!(single.vehicles_count, 1);
        assert_eq!(single.vehicle_make.as_deref(), Some("Ford"));
        assert_eq!(single.vehicle_color, far.vehicle_color);
        assert_eq!(single.creation_date, Some(far.creation_date));
        assert_eq!(single.type_of_service_request, Some(far.type_of_service_request));
        assert_eq!(single.location, far.location);
    }

    #[test]
    fn test_grid_centroid_uses_original_locations() {
        let viewport = viewport(0.0, 10.0, 0.0, 10.0);
        let cell = viewport.grid_cell_size;
        let records = vec![
            map_vehicle(5.0 + cell * 0.1, 5.0),
            map_vehicle(5.0 + cell * 0.3, 5.0),
        ];

        let clusters = aggregate(&records, &viewport, Strategy::Grid);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].vehicles_count, 2);
        assert!((clusters[0].location.lon() - (5.0 + cell * 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_input_gives_no_clusters() {
        let viewport = tight_viewport();
        assert!(aggregate(&[], &viewport, Strategy::Exact).is_empty());
        assert!(aggregate(&[], &viewport, Strategy::Grid).is_empty());
    }

    #[test]
    fn test_rerun_is_identical() {
        let viewport = world_viewport();
        let records = select_in_viewport(&five_groups(), &audi(), &tight_viewport());
        let first = aggregate(&records, &viewport, Strategy::Grid);
        let second = aggregate(&records, &viewport, Strategy::Grid);
        assert_eq!(first, second);
    }

    fn to_records(raw: &[(u8, u8)]) -> Vec<MapVehicle> {
        raw.iter()
            .map(|&(x, y)| map_vehicle(x as f64 * 0.05, y as f64 * 0.05))
            .collect()
    }

    quickcheck! {
        fn prop_counts_sum_to_input(raw: Vec<(u8, u8)>) -> bool {
            let records = to_records(&raw);
            let viewport = viewport(0.0, 12.75, 0.0, 12.75);
            [Strategy::Exact, Strategy::Grid].into_iter().all(|strategy| {
                let clusters = aggregate(&records, &viewport, strategy);
                clusters.iter().map(|c| c.vehicles_count).sum::<usize>() == records.len()
                    && clusters.iter().all(|c| c.vehicles_count >= 1)
            })
        }

        fn prop_cluster_ids_are_distinct(raw: Vec<(u8, u8)>) -> bool {
            let records = to_records(&raw);
            let viewport = viewport(0.0, 12.75, 0.0, 12.75);
            let clusters = aggregate(&records, &viewport, Strategy::Exact);
            clusters.windows(2).all(|w| w[0].cluster < w[1].cluster)
        }
    }
}
