//! Abandoned vehicle map API
//!
//! Serves Chicago's abandoned-vehicle complaints over HTTP with three ways of
//! rendering large point sets on a map: a paginated listing, every point for
//! clustering in the browser, and DBSCAN clusters computed on the server for
//! the requested viewport, either exactly or over a snapped grid.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod aggregate;
mod cluster;
mod config;
mod error;
mod filter;
mod import;
mod model;
#[cfg(feature = "postgis")]
mod postgis;
mod routes;
mod server;
#[cfg(any(feature = "postgis", test))]
mod sql;
mod state;
mod store;
mod viewport;

#[cfg(test)]
mod aggregate_test;
#[cfg(test)]
mod store_test;
#[cfg(test)]
mod viewport_test;

use aggregate::{Strategy, aggregate};
use config::Config;
use filter::{VehicleFilter, select_in_viewport};
use viewport::{BoundingBox, Viewport};

#[derive(Parser)]
#[command(name = "vehicle_map")]
#[command(about = "Abandoned vehicle map API with viewport clustering", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// CSV export to load (overrides VEHICLES_CSV)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Port to listen on (overrides RUST_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Cluster a CSV export for one viewport and print the clusters as JSON
    Cluster {
        /// CSV export of abandoned vehicle requests
        #[arg(short, long, default_value = "files/example.csv")]
        input: PathBuf,

        /// Clustering strategy
        #[arg(short, long, value_enum, default_value_t = Strategy::Exact)]
        strategy: Strategy,

        /// Only vehicles whose make contains this text (case-insensitive)
        #[arg(short, long)]
        make: Option<String>,

        /// Southern map border
        #[arg(long, allow_negative_numbers = true)]
        min_lat: Option<f64>,

        /// Northern map border
        #[arg(long, allow_negative_numbers = true)]
        max_lat: Option<f64>,

        /// Western map border
        #[arg(long, allow_negative_numbers = true)]
        min_lon: Option<f64>,

        /// Eastern map border
        #[arg(long, allow_negative_numbers = true)]
        max_lon: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let mut config = Config::load().context("Environment misconfigured")?;

    match args.command {
        Command::Serve { data, port } => {
            if let Some(data) = data {
                config.data_path = data;
            }
            if let Some(port) = port {
                config.port = port;
            }

            let state = state::State::new(config).await?;
            server::start_server(state).await
        }
        Command::Cluster {
            input,
            strategy,
            make,
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        } => {
            let vehicles = import::load_vehicles(&input)?;

            let defaults = config.viewport.default_bbox;
            let bbox = BoundingBox {
                min_lat: min_lat.unwrap_or(defaults.min_lat),
                max_lat: max_lat.unwrap_or(defaults.max_lat),
                min_lon: min_lon.unwrap_or(defaults.min_lon),
                max_lon: max_lon.unwrap_or(defaults.max_lon),
            };
            let viewport = Viewport::resolve(bbox, &config.viewport);
            let filter = VehicleFilter {
                vehicle_make_icontains: make,
                ..VehicleFilter::default()
            };

            let records = select_in_viewport(&vehicles, &filter, &viewport);
            let clusters = aggregate(&records, &viewport, strategy);
            println!("{}", serde_json::to_string_pretty(&clusters)?);
            Ok(())
        }
    }
}
