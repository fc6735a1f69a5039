// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Connected-component decomposition of triangle meshes

use super::{Mesh, Triangle};
use ahash::AHashMap;
use ena::unify::{InPlaceUnificationTable, UnifyKey};

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
struct VertexKey(u32);

impl UnifyKey for VertexKey {
    type Value = ();
    fn index(&self) -> u32 {
        self.0
    }
    fn from_index(u: u32) -> VertexKey {
        VertexKey(u)
    }
    fn tag() -> &'static str {
        "VertexKey"
    }
}

/// Component label for every triangle; triangles sharing a point share a
/// label. Labels are numbered by the first triangle that reaches them.
fn label_triangles(mesh: &Mesh) -> (Vec<usize>, usize) {
    let mut ufind: InPlaceUnificationTable<VertexKey> = InPlaceUnificationTable::new();
    let keys: Vec<VertexKey> = (0..mesh.vertices.len()).map(|_| ufind.new_key(())).collect();
    for triangle in &mesh.triangles {
        let [a, b, c] = triangle.indices.map(|i| keys[i]);
        ufind.union(a, b);
        ufind.union(b, c);
    }

    let mut labels_by_root: AHashMap<VertexKey, usize> = AHashMap::new();
    let labels = mesh
        .triangles
        .iter()
        .map(|t| {
            let root = ufind.find(keys[t.indices[0]]);
            let next = labels_by_root.len();
            *labels_by_root.entry(root).or_insert(next)
        })
        .collect();
    (labels, labels_by_root.len())
}

/// Number of connected bodies, without materializing them
pub fn count_bodies(mesh: &Mesh) -> usize {
    label_triangles(mesh).1
}

/// Split a mesh into its maximal connected pieces.
///
/// Pieces are ordered by the lowest triangle index they contain and each one
/// keeps only the points it references, in first-use order.
pub fn split_bodies(mesh: &Mesh) -> Vec<Mesh> {
    let (labels, count) = label_triangles(mesh);
    let mut bodies: Vec<Mesh> = (0..count).map(|_| Mesh::new()).collect();
    let mut remaps: Vec<AHashMap<usize, usize>> = (0..count).map(|_| AHashMap::new()).collect();

    for (triangle, &label) in mesh.triangles.iter().zip(&labels) {
        let body = &mut bodies[label];
        let remap = &mut remaps[label];
        let indices = triangle.indices.map(|i| {
            *remap
                .entry(i)
                .or_insert_with(|| body.add_vertex(mesh.vertices[i]))
        });
        body.add_triangle(Triangle::new(indices));
    }

    bodies
}
