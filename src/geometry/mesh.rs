// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Mesh representation and utilities

use super::BoundingBox;
use crate::error::{ClipError, ClipResult};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    /// Vertex without a meaningful normal yet (see `Mesh::recompute_normals`)
    pub fn at(position: Point3<f64>) -> Self {
        Self::new(position, Vector3::z())
    }
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.indices;
        a == b || b == c || a == c
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Build a mesh from raw positions and index triples
    pub fn from_parts(positions: &[Point3<f64>], triangles: &[[usize; 3]]) -> Self {
        let mut mesh = Self::with_capacity(positions.len(), triangles.len());
        mesh.vertices.extend(positions.iter().map(|p| Vertex::at(*p)));
        mesh.triangles.extend(triangles.iter().map(|t| Triangle::new(*t)));
        mesh.recompute_normals();
        mesh
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// A mesh without cells is empty, whatever its point count
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter().map(|v| &v.position))
    }

    /// Check that every point is finite and every triangle references an
    /// existing vertex
    pub fn validate(&self) -> ClipResult<()> {
        if self.triangles.is_empty() {
            return Err(ClipError::EmptyMesh);
        }
        if let Some(index) = self
            .vertices
            .iter()
            .position(|v| !v.position.coords.iter().all(|c| c.is_finite()))
        {
            return Err(ClipError::NonFiniteVertex { index });
        }
        let vertex_count = self.vertices.len();
        for (triangle, tri) in self.triangles.iter().enumerate() {
            if let Some(&index) = tri.indices.iter().find(|&&i| i >= vertex_count) {
                return Err(ClipError::InvalidIndex {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Merge with another mesh (simple union, points are not deduplicated)
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for triangle in &other.triangles {
            self.triangles.push(Triangle::new([
                triangle.indices[0] + offset,
                triangle.indices[1] + offset,
                triangle.indices[2] + offset,
            ]));
        }
    }

    /// Geometric union of several meshes, in order
    pub fn merged<'a>(meshes: impl IntoIterator<Item = &'a Mesh>) -> Mesh {
        let mut result = Mesh::new();
        for mesh in meshes {
            result.merge(mesh);
        }
        result
    }

    /// Weld points that lie within `tolerance` of an earlier kept point.
    ///
    /// The first occurrence wins and keeps its position. Triangles collapsed
    /// by the weld are dropped, as are points no triangle references.
    pub fn clean(&self, tolerance: f64) -> Mesh {
        let mut welded = self.clone();
        welded.weld_vertices(tolerance);
        welded.remove_degenerate_triangles();
        welded.remove_orphaned_vertices();
        welded
    }

    /// Weld vertices within `tolerance` of each other, returning how many
    /// vertices were removed. Uses a uniform grid so each vertex is only
    /// compared against its 27 neighbouring cells.
    pub fn weld_vertices(&mut self, tolerance: f64) -> usize {
        if self.vertices.is_empty() {
            return 0;
        }

        let original_count = self.vertices.len();
        // Any cell at least as wide as the tolerance keeps matches within the 3x3x3 neighbourhood
        let cell_size = tolerance.max(1e-9);
        let cell_of = |p: &Point3<f64>| -> (i64, i64, i64) {
            let discretize = |v: f64| (v / cell_size).floor() as i64;
            (discretize(p.x), discretize(p.y), discretize(p.z))
        };

        let mut grid: AHashMap<(i64, i64, i64), Vec<usize>> = AHashMap::new();
        let mut new_vertices: Vec<Vertex> = Vec::with_capacity(original_count);
        let mut new_indices: Vec<usize> = vec![0; original_count];

        for (i, vertex) in self.vertices.iter().enumerate() {
            let pos = vertex.position;
            let (cx, cy, cz) = cell_of(&pos);

            let mut found = None;
            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(candidates) = grid.get(&(
                            cx.saturating_add(dx),
                            cy.saturating_add(dy),
                            cz.saturating_add(dz),
                        )) else {
                            continue;
                        };
                        for &j in candidates {
                            if (new_vertices[j].position - pos).norm() <= tolerance {
                                found = Some(j);
                                break 'search;
                            }
                        }
                    }
                }
            }

            new_indices[i] = match found {
                Some(j) => j,
                None => {
                    let j = new_vertices.len();
                    new_vertices.push(*vertex);
                    grid.entry((cx, cy, cz)).or_default().push(j);
                    j
                }
            };
        }

        for triangle in &mut self.triangles {
            for index in &mut triangle.indices {
                *index = new_indices[*index];
            }
        }
        self.vertices = new_vertices;

        original_count - self.vertices.len()
    }

    /// Remove triangles that reference the same vertex twice
    pub fn remove_degenerate_triangles(&mut self) -> usize {
        let original_count = self.triangles.len();
        self.triangles.retain(|t| !t.is_degenerate());
        original_count - self.triangles.len()
    }

    /// Remove orphaned vertices (vertices not referenced by any triangle)
    /// Returns the number of vertices removed
    pub fn remove_orphaned_vertices(&mut self) -> usize {
        let mut used_vertices = vec![false; self.vertices.len()];
        for triangle in &self.triangles {
            for &index in &triangle.indices {
                used_vertices[index] = true;
            }
        }

        let mut new_indices = vec![0; self.vertices.len()];
        let mut new_vertices = Vec::new();
        for (old_idx, &used) in used_vertices.iter().enumerate() {
            if used {
                new_indices[old_idx] = new_vertices.len();
                new_vertices.push(self.vertices[old_idx]);
            }
        }

        for triangle in &mut self.triangles {
            for index in &mut triangle.indices {
                *index = new_indices[*index];
            }
        }

        let removed = self.vertices.len() - new_vertices.len();
        self.vertices = new_vertices;
        removed
    }

    /// Keep only the triangles selected by `keep`, compacting the vertices
    pub fn extract_triangles(&self, mut keep: impl FnMut(&Triangle) -> bool) -> Mesh {
        let mut sub = Mesh {
            vertices: self.vertices.clone(),
            triangles: self.triangles.iter().filter(|t| keep(t)).copied().collect(),
        };
        sub.remove_orphaned_vertices();
        sub
    }

    /// Recompute vertex normals from triangle geometry
    /// This calculates face normals and averages them at shared vertices
    pub fn recompute_normals(&mut self) {
        if self.vertices.is_empty() || self.triangles.is_empty() {
            return;
        }

        let mut normal_sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); self.vertices.len()];

        for triangle in &self.triangles {
            let [i0, i1, i2] = triangle.indices;
            let edge1 = self.vertices[i1].position - self.vertices[i0].position;
            let edge2 = self.vertices[i2].position - self.vertices[i0].position;
            // Unnormalized cross product weights by area
            let face_normal = edge1.cross(&edge2);
            if face_normal.norm() > 1e-12 {
                for &idx in &triangle.indices {
                    normal_sums[idx] += face_normal;
                }
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(normal_sums) {
            vertex.normal = sum.try_normalize(1e-12).unwrap_or_else(Vector3::z);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        Mesh::from_parts(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = quad();
        let b = quad();
        a.merge(&b);
        assert_eq!(a.vertex_count(), 8);
        assert_eq!(a.triangle_count(), 4);
        assert_eq!(a.triangles[2].indices, [4, 5, 6]);
    }

    #[test]
    fn test_clean_fuses_merged_duplicates() {
        let merged = Mesh::merged([&quad(), &quad()]);
        let cleaned = merged.clean(1e-6);
        assert_eq!(cleaned.vertex_count(), 4);
        assert_eq!(cleaned.triangle_count(), 4);
    }

    #[test]
    fn test_clean_drops_collapsed_triangles() {
        let mesh = Mesh::from_parts(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1e-7, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2], [0, 1, 3]],
        );
        let cleaned = mesh.clean(1e-5);
        assert_eq!(cleaned.triangle_count(), 1);
        assert_eq!(cleaned.vertex_count(), 3);
    }

    #[test]
    fn test_zero_tolerance_only_fuses_exact_duplicates() {
        let mesh = Mesh::from_parts(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 1.0 + 1e-9, 0.0),
            ],
            &[[0, 1, 2], [0, 1, 3], [0, 1, 4]],
        );
        let mut welded = mesh.clone();
        assert_eq!(welded.weld_vertices(0.0), 1);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut mesh = quad();
        mesh.add_triangle(Triangle::new([0, 1, 9]));
        assert_eq!(
            mesh.validate(),
            Err(ClipError::InvalidIndex {
                triangle: 2,
                index: 9,
                vertex_count: 4
            })
        );
        assert_eq!(Mesh::new().validate(), Err(ClipError::EmptyMesh));
    }

    #[test]
    fn test_validate_rejects_non_finite_points() {
        let mut mesh = quad();
        mesh.vertices[2].position.y = f64::NAN;
        assert_eq!(mesh.validate(), Err(ClipError::NonFiniteVertex { index: 2 }));

        mesh.vertices[2].position.y = 1.0;
        mesh.vertices[3].position.x = f64::INFINITY;
        assert_eq!(mesh.validate(), Err(ClipError::NonFiniteVertex { index: 3 }));
    }

    #[test]
    fn test_recompute_normals() {
        let mesh = quad();
        assert!(mesh
            .vertices
            .iter()
            .all(|v| (v.normal - Vector3::z()).norm() < 1e-12));
    }
}
