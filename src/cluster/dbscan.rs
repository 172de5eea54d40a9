use super::kdtree::new_kd_tree;
use super::point::{Cluster, PointList};
use bitvec::prelude::*;
use tracing::trace;

// DBSCAN algorithm pseudocode (from <http://en.wikipedia.org/wiki/DBSCAN>):
//
// DBSCAN(D, eps, MinPts)
//    C = 0
//    for each unvisited point P in dataset D
//       mark P as visited
//       NeighborPts = regionQuery(P, eps)
//       if sizeof(NeighborPts) < MinPts
//          mark P as NOISE
//       else
//          C = next cluster
//          expandCluster(P, NeighborPts, C, eps, MinPts)
//
// expandCluster(P, NeighborPts, C, eps, MinPts)
//    add P to cluster C
//    for each point P' in NeighborPts
//       if P' is not visited
//          mark P' as visited
//          NeighborPts' = regionQuery(P', eps)
//          if sizeof(NeighborPts') >= MinPts
//             NeighborPts = NeighborPts joined with NeighborPts'
//       if P' is not yet member of any cluster
//          add P' to cluster C
//
// regionQuery(P, eps)
//    return all points within P's eps-neighborhood (including P)

/// Clusters incoming points using DBSCAN algorithm
///
/// # Arguments
///
/// * `points` - List of points to cluster
/// * `eps` - Neighbourhood radius in degrees, inclusive
/// * `min_points` - Minimum number of points in eps-neighbourhood (density threshold)
///
/// With `min_points <= 1` every point is a core point, so two points end up
/// in the same cluster exactly when a chain of points, each within `eps` of
/// the next, connects them, and `noise` is always empty.
///
/// Cluster ids are `0, 1, 2, ...` in the order clusters are seeded while
/// scanning points by index, so the same input order always yields the same
/// ids.
///
/// # Returns
///
/// A tuple `(clusters, noise)` where:
/// - `clusters` is a vector of found clusters
/// - `noise` is the ascending indices of points that are outliers (not in any cluster)
pub fn db_scan(points: &PointList, eps: f64, min_points: usize) -> (Vec<Cluster>, Vec<usize>) {
    let mut visited = bitvec![0; points.len()];
    let mut members = bitvec![0; points.len()];
    let mut clusters = Vec::new();
    let mut c = 0;
    // Clone points for KD-tree construction (tree needs ownership)
    let kd_tree = new_kd_tree(points.clone());
    trace!(points = points.len(), height = kd_tree.height(), "kd-tree built");

    // NaN and negative radii collapse to zero: a point is still its own neighbour
    let eps = eps.max(0.0);

    let mut neighbor_unique = bitvec![0; points.len()];
    let mut scratch = Vec::new();

    for i in 0..points.len() {
        if visited[i] {
            continue;
        }
        visited.set(i, true);

        let neighbor_pts = kd_tree.in_range(&points[i], eps, Vec::new());
        // not a core point; a later cluster may still claim it as a border point
        if neighbor_pts.len() < min_points {
            continue;
        }

        let mut cluster = Cluster { c, points: vec![i] };
        members.set(i, true);
        c += 1;

        for &j in &neighbor_pts {
            neighbor_unique.set(j, true);
        }

        let mut neighbor_pts = neighbor_pts;
        let mut j = 0;
        // neighbor_pts grows while it is walked
        while j < neighbor_pts.len() {
            let k = neighbor_pts[j];
            if !visited[k] {
                visited.set(k, true);
                scratch.clear();
                scratch = kd_tree.in_range(&points[k], eps, scratch);
                if scratch.len() >= min_points {
                    for &p in &scratch {
                        if !neighbor_unique[p] {
                            neighbor_pts.push(p);
                            neighbor_unique.set(p, true);
                        }
                    }
                }
            }

            if !members[k] {
                cluster.points.push(k);
                members.set(k, true);
            }
            j += 1;
        }
        for &p in &neighbor_pts {
            neighbor_unique.set(p, false);
        }
        clusters.push(cluster);
    }

    let noise = members.iter_zeros().collect();
    (clusters, noise)
}

/// Flattens clusters into a per-point label
///
/// `labels[i]` is the cluster id of point `i`, or `None` for noise.
pub fn assign_labels(clusters: &[Cluster], num_points: usize) -> Vec<Option<usize>> {
    let mut labels = vec![None; num_points];

    for cluster in clusters {
        for &idx in &cluster.points {
            labels[idx] = Some(cluster.c);
        }
    }

    labels
}
