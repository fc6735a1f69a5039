// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Cutting plane and the naive two-sided mesh clip

use super::{Mesh, Triangle, Vertex};
use crate::error::{ClipError, ClipResult};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Which side of a plane a point lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Positive side of the normal
    Front,
    /// Negative side of the normal
    Back,
    /// Within epsilon of the plane
    OnPlane,
}

impl PlaneSide {
    /// Side for a signed distance, with `epsilon` as the on-plane band
    pub fn from_distance(distance: f64, epsilon: f64) -> Self {
        if distance > epsilon {
            PlaneSide::Front
        } else if distance < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }
}

/// A plane through `origin` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    origin: Point3<f64>,
    normal: Vector3<f64>,
}

impl Plane {
    /// Creates a plane from a point on it and a normal, normalizing the normal.
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> ClipResult<Self> {
        if !origin.coords.iter().all(|c| c.is_finite()) {
            return Err(ClipError::InvalidOrigin);
        }
        if !normal.iter().all(|c| c.is_finite()) {
            return Err(ClipError::InvalidPlane);
        }
        let normal = normal.try_normalize(f64::EPSILON).ok_or(ClipError::InvalidPlane)?;
        Ok(Self { origin, normal })
    }

    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Positive in front of the plane, negative behind it
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&(point - self.origin))
    }

    pub fn classify(&self, point: &Point3<f64>, epsilon: f64) -> PlaneSide {
        PlaneSide::from_distance(self.signed_distance(point), epsilon)
    }
}

/// Output of the naive plane clip: raw side 0 and raw side 1
#[derive(Debug, Clone, Default)]
pub struct NaiveSplit {
    pub behind: Mesh,
    pub front: Mesh,
}

impl NaiveSplit {
    /// Both halves hold at least one triangle
    pub fn is_two_sided(&self) -> bool {
        !self.behind.is_empty() && !self.front.is_empty()
    }

    pub fn clean(&self, tolerance: f64) -> NaiveSplit {
        NaiveSplit {
            behind: self.behind.clean(tolerance),
            front: self.front.clean(tolerance),
        }
    }
}

/// Accumulates one side of the clip, compacting vertices as they are used
struct SideBuilder {
    mesh: Mesh,
    from_source: AHashMap<usize, usize>,
    from_edge: AHashMap<(usize, usize), usize>,
}

/// A polygon corner: either an input vertex or the crossing on an input edge
#[derive(Clone, Copy)]
enum Corner {
    Source(usize),
    Crossing { edge: (usize, usize), vertex: Vertex },
}

impl SideBuilder {
    fn new() -> Self {
        Self {
            mesh: Mesh::new(),
            from_source: AHashMap::new(),
            from_edge: AHashMap::new(),
        }
    }

    fn corner_index(&mut self, corner: Corner, source: &Mesh) -> usize {
        match corner {
            Corner::Source(i) => *self
                .from_source
                .entry(i)
                .or_insert_with(|| self.mesh.add_vertex(source.vertices[i])),
            Corner::Crossing { edge, vertex } => *self
                .from_edge
                .entry(edge)
                .or_insert_with(|| self.mesh.add_vertex(vertex)),
        }
    }

    /// Fan-triangulate a convex polygon given as corners
    fn add_polygon(&mut self, corners: &[Corner], source: &Mesh) {
        if corners.len() < 3 {
            return;
        }
        let indices: Vec<usize> = corners
            .iter()
            .map(|&c| self.corner_index(c, source))
            .collect();
        for k in 1..indices.len() - 1 {
            self.mesh
                .add_triangle(Triangle::new([indices[0], indices[k], indices[k + 1]]));
        }
    }
}

/// Split `mesh` by `plane` into the part behind it and the part in front.
///
/// Triangles without a front vertex go behind (coplanar ones included),
/// triangles without a back vertex go in front, and spanning triangles are
/// cut. Each crossing edge yields one intersection point that both sides and
/// both incident triangles share, so the halves meet on identical points.
pub fn clip_mesh(mesh: &Mesh, plane: &Plane, epsilon: f64) -> NaiveSplit {
    let distances: Vec<f64> = mesh
        .vertices
        .iter()
        .map(|v| plane.signed_distance(&v.position))
        .collect();
    let side_of = |i: usize| PlaneSide::from_distance(distances[i], epsilon);

    let mut crossings: AHashMap<(usize, usize), Vertex> = AHashMap::new();
    let mut behind = SideBuilder::new();
    let mut front = SideBuilder::new();

    for triangle in &mesh.triangles {
        let sides = triangle.indices.map(side_of);
        let has_front = sides.contains(&PlaneSide::Front);
        let has_back = sides.contains(&PlaneSide::Back);
        let whole = triangle.indices.map(Corner::Source);

        if !has_front {
            behind.add_polygon(&whole, mesh);
            continue;
        }
        if !has_back {
            front.add_polygon(&whole, mesh);
            continue;
        }

        // Sutherland-Hodgman walk over the three edges
        let mut front_corners = Vec::with_capacity(4);
        let mut back_corners = Vec::with_capacity(4);
        for k in 0..3 {
            let current = triangle.indices[k];
            let next = triangle.indices[(k + 1) % 3];
            match sides[k] {
                PlaneSide::Front => front_corners.push(Corner::Source(current)),
                PlaneSide::Back => back_corners.push(Corner::Source(current)),
                PlaneSide::OnPlane => {
                    front_corners.push(Corner::Source(current));
                    back_corners.push(Corner::Source(current));
                }
            }

            let crosses = matches!(
                (sides[k], sides[(k + 1) % 3]),
                (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
            );
            if crosses {
                let edge = (current.min(next), current.max(next));
                let vertex = *crossings
                    .entry(edge)
                    .or_insert_with(|| edge_crossing(mesh, &distances, edge));
                let corner = Corner::Crossing { edge, vertex };
                front_corners.push(corner);
                back_corners.push(corner);
            }
        }

        front.add_polygon(&front_corners, mesh);
        behind.add_polygon(&back_corners, mesh);
    }

    NaiveSplit {
        behind: behind.mesh,
        front: front.mesh,
    }
}

/// Interpolated crossing on edge `(a, b)`, always computed from the lower index
fn edge_crossing(mesh: &Mesh, distances: &[f64], (a, b): (usize, usize)) -> Vertex {
    let (va, vb) = (&mesh.vertices[a], &mesh.vertices[b]);
    let t = distances[a] / (distances[a] - distances[b]);
    let position = va.position + (vb.position - va.position) * t;
    let normal = va.normal.lerp(&vb.normal, t);
    Vertex::new(position, normal.try_normalize(1e-12).unwrap_or(va.normal))
}
