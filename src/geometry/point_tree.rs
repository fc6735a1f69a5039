// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Bounding volume hierarchy over points for nearest-neighbor queries
//! Used to project labels between meshes whose points do not correspond

use super::BoundingBox;
use nalgebra::Point3;

/// BVH node
#[derive(Debug, Clone)]
struct PointNode {
    /// Bounding box of this node
    bbox: BoundingBox,
    /// Children (None for leaf)
    children: Option<Box<(PointNode, PointNode)>>,
    /// Point indices (only for leaf nodes)
    point_indices: Vec<usize>,
}

/// Static nearest-neighbor index over a point set
#[derive(Debug, Clone)]
pub struct PointTree {
    points: Vec<Point3<f64>>,
    root: Option<PointNode>,
}

const MAX_DEPTH: usize = 32;
const MAX_LEAF_POINTS: usize = 8;

impl PointTree {
    pub fn build(points: Vec<Point3<f64>>) -> Self {
        if points.is_empty() {
            return Self { points, root: None };
        }
        let indices: Vec<usize> = (0..points.len()).collect();
        let root = Self::build_recursive(&points, indices, 0);
        Self {
            points,
            root: Some(root),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    fn build_recursive(points: &[Point3<f64>], mut indices: Vec<usize>, depth: usize) -> PointNode {
        let bbox = BoundingBox::from_points(indices.iter().map(|&i| &points[i]));

        if indices.len() <= MAX_LEAF_POINTS || depth >= MAX_DEPTH {
            return PointNode {
                bbox,
                children: None,
                point_indices: indices,
            };
        }

        // Split at the median of the longest axis
        let axis = bbox.longest_axis();
        indices.sort_by(|&a, &b| points[a][axis].total_cmp(&points[b][axis]).then(a.cmp(&b)));
        let right_indices = indices.split_off(indices.len() / 2);

        let left = Self::build_recursive(points, indices, depth + 1);
        let right = Self::build_recursive(points, right_indices, depth + 1);

        PointNode {
            bbox,
            children: Some(Box::new((left, right))),
            point_indices: Vec::new(),
        }
    }

    /// Closest point to `query` as `(index, distance)`.
    ///
    /// Among equidistant points the lowest index wins.
    pub fn nearest(&self, query: &Point3<f64>) -> Option<(usize, f64)> {
        let root = self.root.as_ref()?;
        let mut best: Option<(usize, f64)> = None;
        self.nearest_recursive(root, query, &mut best);
        best.map(|(index, dist_sq)| (index, dist_sq.sqrt()))
    }

    fn nearest_recursive(
        &self,
        node: &PointNode,
        query: &Point3<f64>,
        best: &mut Option<(usize, f64)>,
    ) {
        if let Some((_, best_sq)) = *best {
            if node.bbox.distance_squared_to(query) > best_sq {
                return;
            }
        }

        match &node.children {
            None => {
                for &i in &node.point_indices {
                    let dist_sq = (self.points[i] - query).norm_squared();
                    let better = match *best {
                        None => true,
                        Some((best_i, best_sq)) => {
                            dist_sq < best_sq || (dist_sq == best_sq && i < best_i)
                        }
                    };
                    if better {
                        *best = Some((i, dist_sq));
                    }
                }
            }
            Some(children) => {
                let (left, right) = children.as_ref();
                // Visit the closer child first so the farther one is usually pruned
                if left.bbox.distance_squared_to(query) <= right.bbox.distance_squared_to(query) {
                    self.nearest_recursive(left, query, best);
                    self.nearest_recursive(right, query, best);
                } else {
                    self.nearest_recursive(right, query, best);
                    self.nearest_recursive(left, query, best);
                }
            }
        }
    }

    /// Index of the closest tree point for every query, in query order.
    /// Empty when the tree is empty.
    pub fn nearest_all(&self, queries: &[Point3<f64>]) -> Vec<usize> {
        queries
            .iter()
            .filter_map(|q| self.nearest(q).map(|(i, _)| i))
            .collect()
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        fn depth_of(node: &PointNode) -> usize {
            match &node.children {
                None => 1,
                Some(children) => 1 + depth_of(&children.0).max(depth_of(&children.1)),
            }
        }
        self.root.as_ref().map_or(0, depth_of)
    }
}
