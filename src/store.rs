//! Record storage behind the HTTP handlers.
//!
//! The in-memory backend holds the whole dataset in an immutable vector and
//! clusters in process. With the `postgis` feature and a `DATABASE_URL`, the
//! same operations run as SQL against PostGIS instead.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::{JoinError, spawn_blocking};

use crate::aggregate::{Strategy, aggregate};
use crate::filter::{VehicleFilter, select, select_in_viewport};
use crate::model::{MapCluster, MapVehicle, Page, Vehicle};
#[cfg(feature = "postgis")]
use crate::postgis::PgStore;
use crate::viewport::Viewport;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Clustering task failed: {0}")]
    Task(#[from] JoinError),

    #[cfg(feature = "postgis")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Limit/offset window of the paginated listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

pub enum VehicleStore {
    Memory(MemoryStore),
    #[cfg(feature = "postgis")]
    Postgres(PgStore),
}

impl VehicleStore {
    pub fn backend(&self) -> &'static str {
        match self {
            VehicleStore::Memory(_) => "memory",
            #[cfg(feature = "postgis")]
            VehicleStore::Postgres(_) => "postgis",
        }
    }

    /// Field-filtered records, ordered by id; the viewport does not apply
    pub async fn list(
        &self,
        filter: &VehicleFilter,
        page: PageRequest,
    ) -> Result<Page<Vehicle>, StoreError> {
        match self {
            VehicleStore::Memory(store) => Ok(store.list(filter, page)),
            #[cfg(feature = "postgis")]
            VehicleStore::Postgres(store) => Ok(store.list(filter, page).await?),
        }
    }

    /// Every filtered, located record inside the viewport
    ///
    /// A zero-area viewport answers with no records on every backend.
    pub async fn map_points(
        &self,
        filter: &VehicleFilter,
        viewport: &Viewport,
    ) -> Result<Vec<MapVehicle>, StoreError> {
        if viewport.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            VehicleStore::Memory(store) => Ok(store.map_points(filter, viewport)),
            #[cfg(feature = "postgis")]
            VehicleStore::Postgres(store) => Ok(store.map_points(filter, viewport).await?),
        }
    }

    /// Viewport clusters of the filtered records
    pub async fn clusters(
        &self,
        filter: &VehicleFilter,
        viewport: &Viewport,
        strategy: Strategy,
    ) -> Result<Vec<MapCluster>, StoreError> {
        if viewport.is_empty() {
            return Ok(Vec::new());
        }
        match self {
            VehicleStore::Memory(store) => {
                let store = store.clone();
                let filter = filter.clone();
                let viewport = viewport.clone();
                Ok(spawn_blocking(move || store.clusters(&filter, &viewport, strategy)).await?)
            }
            #[cfg(feature = "postgis")]
            VehicleStore::Postgres(store) => Ok(store.clusters(filter, viewport, strategy).await?),
        }
    }
}

/// Immutable dataset shared between requests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    vehicles: Arc<Vec<Vehicle>>,
}

impl MemoryStore {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Self {
            vehicles: Arc::new(vehicles),
        }
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn list(&self, filter: &VehicleFilter, page: PageRequest) -> Page<Vehicle> {
        let matching = select(&self.vehicles, filter);
        Page {
            count: matching.len(),
            results: matching
                .into_iter()
                .skip(page.offset)
                .take(page.limit)
                .cloned()
                .collect(),
        }
    }

    pub fn map_points(&self, filter: &VehicleFilter, viewport: &Viewport) -> Vec<MapVehicle> {
        select_in_viewport(&self.vehicles, filter, viewport)
    }

    pub fn clusters(
        &self,
        filter: &VehicleFilter,
        viewport: &Viewport,
        strategy: Strategy,
    ) -> Vec<MapCluster> {
        let records = self.map_points(filter, viewport);
        aggregate(&records, viewport, strategy)
    }
}
