//! Static 2-D tree for planar range queries
//!
//! The tree is built once over a fixed point list by splitting on the median
//! of alternating axes, so it is balanced and never rebalanced afterwards.

use super::point::{Point, PointList};

/// KD-Tree for planar range queries
///
/// Points are separated from nodes. Nodes live in a flat arena and hold only
/// indices into the points slice.
pub struct KDTree {
    /// All points in the tree
    pub points: PointList,
    nodes: Vec<KDTreeNode>,
    root: Option<usize>,
}

/// A node in the K-D tree
///
/// Every point in the left subtree is `<=` this node's point on the split
/// axis, every point in the right subtree is `>=`.
struct KDTreeNode {
    point_id: usize,
    split: usize,
    left: Option<usize>,
    right: Option<usize>,
}

impl KDTree {
    /// Finds every point whose planar distance to `pt` is at most `dist`
    ///
    /// The bound is inclusive, and a point always lies within range of itself.
    /// To avoid allocation, the `nodes` vector can be pre-allocated with a
    /// larger capacity and re-used across multiple calls.
    pub fn in_range(&self, pt: &Point, dist: f64, mut nodes: Vec<usize>) -> Vec<usize> {
        if dist.is_nan() || dist < 0.0 {
            return nodes;
        }
        let r2 = dist * dist;

        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            let here = &self.points[node.point_id];

            if here.sq_dist(pt) <= r2 {
                nodes.push(node.point_id);
            }

            let diff = pt.0[node.split] - here.0[node.split];
            if let Some(left) = node.left
                && diff <= dist
            {
                stack.push(left);
            }
            if let Some(right) = node.right
                && -diff <= dist
            {
                stack.push(right);
            }
        }

        nodes
    }

    /// Returns the height of the K-D tree
    pub fn height(&self) -> usize {
        fn walk(nodes: &[KDTreeNode], id: Option<usize>) -> usize {
            match id {
                None => 0,
                Some(id) => 1 + walk(nodes, nodes[id].left).max(walk(nodes, nodes[id].right)),
            }
        }
        walk(&self.nodes, self.root)
    }
}

/// Creates a new K-D tree built from the given points
pub fn new_kd_tree(points: PointList) -> KDTree {
    let mut ids: Vec<usize> = (0..points.len()).collect();
    let mut nodes = Vec::with_capacity(points.len());
    let root = build_tree(&points, &mut nodes, &mut ids, 0);

    KDTree {
        points,
        nodes,
        root,
    }
}

/// Places the median of `ids` on the split axis at this node and recurses
/// into the two halves
fn build_tree(
    points: &PointList,
    nodes: &mut Vec<KDTreeNode>,
    ids: &mut [usize],
    depth: usize,
) -> Option<usize> {
    if ids.is_empty() {
        return None;
    }

    let split = depth % 2;
    let mid = ids.len() / 2;
    ids.select_nth_unstable_by(mid, |&a, &b| points[a].0[split].total_cmp(&points[b].0[split]));

    let id = nodes.len();
    nodes.push(KDTreeNode {
        point_id: ids[mid],
        split,
        left: None,
        right: None,
    });

    let (lower, upper) = ids.split_at_mut(mid);
    let left = build_tree(points, nodes, lower, depth + 1);
    let right = build_tree(points, nodes, &mut upper[1..], depth + 1);
    nodes[id].left = left;
    nodes[id].right = right;

    Some(id)
}
