use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::import::load_vehicles;
use crate::store::{MemoryStore, VehicleStore};

pub struct State {
    pub config: Config,
    pub store: VehicleStore,
}

impl State {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store = open_store(&config).await?;
        info!(backend = store.backend(), "Store ready");

        Ok(Arc::new(Self { config, store }))
    }

    #[cfg(test)]
    pub fn with_store(config: Config, store: VehicleStore) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}

#[cfg(feature = "postgis")]
async fn open_store(config: &Config) -> anyhow::Result<VehicleStore> {
    use anyhow::Context;

    if let Some(url) = &config.database_url {
        let store = crate::postgis::PgStore::connect(url)
            .await
            .context("Failed to connect to DATABASE_URL")?;
        return Ok(VehicleStore::Postgres(store));
    }
    open_memory_store(config)
}

#[cfg(not(feature = "postgis"))]
async fn open_store(config: &Config) -> anyhow::Result<VehicleStore> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but PostGIS support is not compiled in, ignoring");
    }
    open_memory_store(config)
}

fn open_memory_store(config: &Config) -> anyhow::Result<VehicleStore> {
    let vehicles = load_vehicles(&config.data_path)?;
    let store = MemoryStore::new(vehicles);
    info!(vehicles = store.len(), "Loaded vehicles into memory");
    Ok(VehicleStore::Memory(store))
}
