//! DBScan clustering on planar (lon, lat) points using a K-D Tree
pub mod dbscan;
pub mod distance;
pub mod kdtree;
pub mod point;

#[cfg(test)]
mod distance_test;
#[cfg(test)]
mod point_test;

pub use dbscan::{assign_labels, db_scan};
pub use point::{Cluster, Point, PointList};
