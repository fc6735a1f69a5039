// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Side label projection from the resolved regions back onto the original mesh

use super::{Body, Partition, RawSide};
use crate::error::{ClipError, ClipResult};
use crate::geometry::{Mesh, NaiveSplit, PointTree};
use nalgebra::Point3;

/// One resolved side of a clip
#[derive(Debug, Clone)]
pub struct Region {
    /// `false` for the near region, `true` for the far region
    pub label: bool,
    pub mesh: Mesh,
    /// Nearest original-mesh point for every region point; lets callers carry
    /// per-point attributes of the original mesh over to the region
    pub source_indices: Vec<usize>,
}

impl Region {
    fn new(label: bool, mesh: Mesh, source: &PointTree) -> Self {
        let source_indices = source.nearest_all(&mesh.positions());
        Self {
            label,
            mesh,
            source_indices,
        }
    }

    pub fn is_far(&self) -> bool {
        self.label
    }

    /// Copy a per-point attribute of the original mesh onto this region.
    /// `None` when `attribute` has no entry for some source point.
    pub fn transfer<T: Clone>(&self, attribute: &[T]) -> Option<Vec<T>> {
        self.source_indices
            .iter()
            .map(|&i| attribute.get(i).cloned())
            .collect()
    }
}

/// Regions and freshly computed labels of one pass, before they touch the
/// session state
#[derive(Debug, Clone)]
pub struct Projection {
    pub near: Region,
    pub far: Region,
    /// One label per original-mesh point
    pub labels: Vec<bool>,
}

/// Merge the bodies of each resolved side, weld their seams, and give every
/// original point the label of the closest region point.
///
/// Equidistant region points resolve to the near region, which is searched
/// first.
pub fn project(
    bodies: &[Body],
    partition: &Partition,
    original: &PointTree,
    clean_tolerance: f64,
) -> ClipResult<Projection> {
    let merge_side = |ids: &[usize]| -> Mesh {
        let side_bodies = bodies.iter().filter(|b| ids.contains(&b.id));
        Mesh::merged(side_bodies.map(|b| &b.mesh)).clean(clean_tolerance)
    };
    let near_mesh = merge_side(&partition.near);
    let far_mesh = merge_side(&partition.far);

    let mut union_points: Vec<Point3<f64>> = near_mesh.positions();
    union_points.extend(far_mesh.positions());
    if union_points.is_empty() {
        return Err(ClipError::NothingClipped);
    }
    let near_count = near_mesh.vertex_count();
    let tree = PointTree::build(union_points);

    let labels = tree
        .nearest_all(original.points())
        .into_iter()
        .map(|i| i >= near_count)
        .collect();

    Ok(Projection {
        near: Region::new(false, near_mesh, original),
        far: Region::new(true, far_mesh, original),
        labels,
    })
}

/// Single-sided clip: every point takes the label of the only populated side.
pub fn project_uniform(split: NaiveSplit, side: RawSide, original: &PointTree) -> Projection {
    Projection {
        labels: vec![side.label(); original.len()],
        near: Region::new(false, split.behind, original),
        far: Region::new(true, split.front, original),
    }
}
