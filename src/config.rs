use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

use crate::viewport::{BoundingBox, ViewportSettings};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{key} must be a positive number")]
    NotPositive { key: &'static str },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// CSV export loaded by the in-memory store
    pub data_path: PathBuf,
    /// When set (and built with `postgis`), records are served from PostGIS
    pub database_url: Option<String>,
    /// Default `limit` of the paginated listing
    pub page_size: usize,
    pub viewport: ViewportSettings,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key-value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let max_objects_in_line: f64 = try_load(&lookup, "MAP_MAX_OBJECTS_IN_LINE", "8")?;
        let grid_cell_count: f64 = try_load(&lookup, "MAP_GRID_CELL_COUNT", "500")?;
        let legacy_bbox: bool = try_load(&lookup, "MAP_LEGACY_DEFAULT_BBOX", "false")?;
        let page_size: usize = try_load(&lookup, "PAGE_SIZE", "100")?;

        if !(max_objects_in_line.is_finite() && max_objects_in_line > 0.0) {
            return Err(ConfigError::NotPositive {
                key: "MAP_MAX_OBJECTS_IN_LINE",
            });
        }
        if !(grid_cell_count.is_finite() && grid_cell_count > 0.0) {
            return Err(ConfigError::NotPositive {
                key: "MAP_GRID_CELL_COUNT",
            });
        }
        if page_size == 0 {
            return Err(ConfigError::NotPositive { key: "PAGE_SIZE" });
        }

        Ok(Self {
            port: try_load(&lookup, "RUST_PORT", "8000")?,
            data_path: try_load(&lookup, "VEHICLES_CSV", "files/example.csv")?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            page_size,
            viewport: ViewportSettings {
                max_objects_in_line,
                grid_cell_count,
                default_bbox: if legacy_bbox {
                    warn!("Using legacy default bounding box with swapped lat/lon ranges");
                    BoundingBox::LEGACY
                } else {
                    BoundingBox::WORLD
                },
            },
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value: value.clone(),
            reason: e.to_string(),
        }
    })
}
