//! Viewport clustering of filtered vehicles.
//!
//! Two strategies answer the same question, "which markers should this map
//! viewport show":
//!
//! - [`Strategy::Exact`] runs DBSCAN over every filtered point. Its cost grows
//!   with the number of points, so it suits small, well-filtered result sets.
//! - [`Strategy::Grid`] snaps every point onto a grid of
//!   `grid_cell_size`-sized cells first and runs DBSCAN over the distinct
//!   cells only, so the clustering input is bounded by the grid resolution
//!   rather than the row count.
//!
//! Both use `max_distance_between_objects` as the neighbourhood radius and a
//! minimum of one point per cluster, so every point lands in some cluster.
//! Because the grid strategy decides membership per cell, the two may
//! disagree on cluster count (by about one cluster in practice) but always
//! agree on the summed `vehicles_count`.

use std::collections::HashMap;

use clap::ValueEnum;
use tracing::debug;

use crate::cluster::{Cluster, PointList, assign_labels, db_scan};
use crate::model::{MapCluster, MapVehicle};
use crate::viewport::Viewport;

/// Points per DBSCAN neighbourhood needed to form a cluster
const MIN_POINTS: usize = 1;

/// Cluster id reported for points the clustering left unassigned
pub const NOISE_CLUSTER: i64 = -1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Pairwise DBSCAN over every point
    #[default]
    Exact,
    /// DBSCAN over distinct grid cells
    Grid,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Exact => "exact",
            Strategy::Grid => "grid",
        }
    }
}

/// Groups `records` into map clusters for `viewport`, ordered by cluster id
/// with unassigned points last
pub fn aggregate(records: &[MapVehicle], viewport: &Viewport, strategy: Strategy) -> Vec<MapCluster> {
    let eps = viewport.max_distance_between_objects;
    let locations: PointList = records.iter().map(|r| r.location).collect();

    let labels = match strategy {
        Strategy::Exact => exact_labels(&locations, eps),
        Strategy::Grid => grid_labels(&locations, eps, viewport.grid_cell_size),
    };

    let clusters = summarize(records, &locations, &labels);
    debug!(
        strategy = strategy.as_str(),
        points = records.len(),
        clusters = clusters.len(),
        eps,
        "Clustered viewport"
    );
    clusters
}

fn exact_labels(locations: &PointList, eps: f64) -> Vec<Option<usize>> {
    let (clusters, _) = db_scan(locations, eps, MIN_POINTS);
    assign_labels(&clusters, locations.len())
}

/// Clusters distinct grid cells, then hands each point its cell's label
fn grid_labels(locations: &PointList, eps: f64, cell_size: f64) -> Vec<Option<usize>> {
    let mut cells = PointList::new();
    let mut cell_ids: HashMap<(u64, u64), usize> = HashMap::new();
    let mut point_cells = Vec::with_capacity(locations.len());

    for location in locations {
        let snapped = location.snap_to_grid(cell_size);
        let id = *cell_ids.entry(snapped.key()).or_insert_with(|| {
            cells.push(snapped);
            cells.len() - 1
        });
        point_cells.push(id);
    }
    debug!(
        points = locations.len(),
        cells = cells.len(),
        cell_size,
        "Snapped points to grid"
    );

    let (clusters, _) = db_scan(&cells, eps, MIN_POINTS);
    let cell_labels = assign_labels(&clusters, cells.len());

    point_cells.into_iter().map(|cell| cell_labels[cell]).collect()
}

/// Per-cluster count and centroid of the original locations, plus the
/// member's attributes for single-member clusters
///
/// Unlabelled points become single-member clusters with [`NOISE_CLUSTER`].
fn summarize(
    records: &[MapVehicle],
    locations: &PointList,
    labels: &[Option<usize>],
) -> Vec<MapCluster> {
    let mut groups: Vec<Cluster> = Vec::new();
    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut noise = Vec::new();

    for (i, label) in labels.iter().enumerate() {
        match label {
            Some(c) => {
                let slot = *slots.entry(*c).or_insert_with(|| {
                    groups.push(Cluster {
                        c: *c,
                        points: Vec::new(),
                    });
                    groups.len() - 1
                });
                groups[slot].points.push(i);
            }
            None => noise.push(i),
        }
    }
    groups.sort_by_key(|g| g.c);

    let mut result = Vec::with_capacity(groups.len() + noise.len());
    for group in &groups {
        let id = group.c as i64;
        match group.points.as_slice() {
            [only] => result.push(MapCluster::single(id, &records[*only])),
            members => {
                if let Some(centroid) = group.centroid(locations) {
                    result.push(MapCluster::group(id, members.len(), centroid));
                }
            }
        }
    }
    for i in noise {
        result.push(MapCluster::single(NOISE_CLUSTER, &records[i]));
    }

    result
}
