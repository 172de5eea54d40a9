#[cfg(test)]
mod tests {
    use crate::aggregate::Strategy;
    use crate::cluster::Point;
    use crate::filter::VehicleFilter;
    use crate::fixture_test::{five_groups, vehicle};
    use crate::store::{MemoryStore, PageRequest, VehicleStore};
    use crate::viewport::{BoundingBox, Viewport, ViewportSettings};

    fn store() -> VehicleStore {
        VehicleStore::Memory(MemoryStore::new(five_groups()))
    }

    fn viewport(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Viewport {
        let bbox = BoundingBox {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        };
        Viewport::resolve(bbox, &ViewportSettings::default())
    }

    #[tokio::test]
    async fn test_zero_area_viewport_skips_backend() {
        // a point sits exactly on the collapsed edge
        let vehicles = vec![vehicle(1, Some(Point::new(40.05, 40.0)))];
        let store = VehicleStore::Memory(MemoryStore::new(vehicles));
        let filter = VehicleFilter::default();
        let flat = viewport(40.0, 40.0, 40.0, 40.1);

        assert!(store.map_points(&filter, &flat).await.unwrap().is_empty());
        for strategy in [Strategy::Exact, Strategy::Grid] {
            let clusters = store.clusters(&filter, &flat, strategy).await.unwrap();
            assert!(clusters.is_empty());
        }
    }

    #[tokio::test]
    async fn test_clusters_cover_viewport_points() {
        let store = store();
        let filter = VehicleFilter::default();
        let tight = viewport(40.0, 40.1, 40.0, 40.1);

        let points = store.map_points(&filter, &tight).await.unwrap();
        assert_eq!(points.len(), 30);

        let clusters = store.clusters(&filter, &tight, Strategy::Exact).await.unwrap();
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters.iter().map(|c| c.vehicles_count).sum::<usize>(), 30);
    }

    #[tokio::test]
    async fn test_list_pages_in_store_order() {
        let page = store()
            .list(
                &VehicleFilter::default(),
                PageRequest {
                    limit: 5,
                    offset: 45,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.count, 50);
        let ids: Vec<i64> = page.results.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![46, 47, 48, 49, 50]);
    }
}
