// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Clipping session: owns the mesh and the accumulated side labels

use super::{
    discover_bodies, project, project_uniform, resolve, select_anchors, AdjacencyGraph, AnchorTie,
    Projection, RawSide, Region,
};
use crate::config::ClipConfig;
use crate::error::{ClipError, ClipResult};
use crate::geometry::{clip_mesh, BoundingBox, Mesh, NaiveSplit, Plane, PointTree};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// A mesh with one near/far label per point. `true` marks far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledMesh {
    pub mesh: Mesh,
    pub sides: Vec<bool>,
}

impl LabeledMesh {
    /// Every point starts out far
    pub fn new(mesh: Mesh) -> Self {
        let sides = vec![true; mesh.vertex_count()];
        Self { mesh, sides }
    }

    pub fn is_far(&self, index: usize) -> bool {
        self.sides.get(index).copied().unwrap_or(true)
    }

    pub fn near_count(&self) -> usize {
        self.sides.iter().filter(|&&far| !far).count()
    }

    pub fn far_count(&self) -> usize {
        self.sides.iter().filter(|&&far| far).count()
    }

    /// Triangles whose three points are all near
    pub fn extract_near(&self) -> Mesh {
        self.mesh
            .extract_triangles(|t| t.indices.iter().all(|&i| !self.is_far(i)))
    }

    /// Triangles whose three points are all far
    pub fn extract_far(&self) -> Mesh {
        self.mesh
            .extract_triangles(|t| t.indices.iter().all(|&i| self.is_far(i)))
    }

    fn and_assign(&mut self, computed: &[bool]) {
        for (side, &new) in self.sides.iter_mut().zip(computed) {
            *side = *side && new;
        }
    }

    fn reset(&mut self) {
        self.sides.iter_mut().for_each(|side| *side = true);
    }
}

/// Summary of one clip pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipReport {
    pub origin: Point3<f64>,
    pub normal: Vector3<f64>,
    /// Set when the plane left triangles on one raw side only
    pub fallback: Option<RawSide>,
    pub body_count: usize,
    pub root: Option<usize>,
    pub nearest_far: Option<usize>,
    pub near_bodies: Vec<usize>,
    pub far_bodies: Vec<usize>,
    pub anchor_ties: Vec<AnchorTie>,
    pub near_points: usize,
    pub far_points: usize,
}

/// Repeatedly clips one tube mesh, narrowing the far-labeled region.
///
/// The session state is the per-point label array; every successful
/// [`clip`](Self::clip) AND-combines its computed labels into it. A failed
/// clip leaves the session untouched.
#[derive(Debug)]
pub struct TubeClipper {
    mesh: Mesh,
    surface: Mesh,
    surface_bounds: BoundingBox,
    clipped: LabeledMesh,
    near_side: Option<Region>,
    far_side: Option<Region>,
    last_report: Option<ClipReport>,
    config: ClipConfig,
    source_tree: PointTree,
}

impl TubeClipper {
    pub fn new(mesh: Mesh) -> ClipResult<Self> {
        Self::with_config(mesh, ClipConfig::default())
    }

    pub fn with_config(mesh: Mesh, config: ClipConfig) -> ClipResult<Self> {
        config.validate()?;
        mesh.validate()?;

        // Same points in the same order, so labels line up with the input
        let mut surface = mesh.clone();
        let dropped = surface.remove_degenerate_triangles();
        if surface.is_empty() {
            return Err(ClipError::EmptyMesh);
        }

        let source_tree = PointTree::build(mesh.positions());
        debug!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            dropped,
            "created clipping session"
        );

        Ok(Self {
            clipped: LabeledMesh::new(mesh.clone()),
            surface_bounds: surface.bounding_box(),
            mesh,
            surface,
            near_side: None,
            far_side: None,
            last_report: None,
            config,
            source_tree,
        })
    }

    /// Run one resolution pass with the plane through `origin` along
    /// `normal`. `origin` doubles as the reference point for anchor
    /// selection.
    #[instrument(skip(self), fields(vertices = self.mesh.vertex_count()))]
    pub fn clip(&mut self, origin: Point3<f64>, normal: Vector3<f64>) -> ClipResult<&mut Self> {
        let plane = Plane::new(origin, normal)?;
        let split = self.naive_split(&plane);
        debug!(
            behind = split.behind.triangle_count(),
            front = split.front.triangle_count(),
            "naive split"
        );

        let (projection, mut report) = match (split.behind.is_empty(), split.front.is_empty()) {
            (true, true) => return Err(ClipError::NothingClipped),
            (false, true) => self.single_sided(split, RawSide::Near, &plane),
            (true, false) => self.single_sided(split, RawSide::Far, &plane),
            (false, false) => self.resolve_crossings(&split, &plane)?,
        };

        // Nothing below can fail
        self.clipped.and_assign(&projection.labels);
        report.near_points = self.clipped.near_count();
        report.far_points = self.clipped.far_count();
        info!(
            fallback = ?report.fallback,
            bodies = report.body_count,
            near = report.near_points,
            far = report.far_points,
            "clip applied"
        );

        self.near_side = Some(projection.near);
        self.far_side = Some(projection.far);
        self.last_report = Some(report);
        Ok(self)
    }

    /// Raw halves of the surface, cleaned. A plane that stays clear of the
    /// surface box puts the whole surface on one side without clipping.
    fn naive_split(&self, plane: &Plane) -> NaiveSplit {
        let epsilon = self.config.plane_epsilon;
        let tolerance = self.config.raw_clean_tolerance;
        if self.surface_bounds.intersects_plane(plane, epsilon) {
            return clip_mesh(&self.surface, plane, epsilon).clean(tolerance);
        }

        let whole = self.surface.clean(tolerance);
        if plane.signed_distance(&self.surface_bounds.center()) > 0.0 {
            NaiveSplit {
                behind: Mesh::new(),
                front: whole,
            }
        } else {
            NaiveSplit {
                behind: whole,
                front: Mesh::new(),
            }
        }
    }

    fn single_sided(
        &self,
        split: NaiveSplit,
        side: RawSide,
        plane: &Plane,
    ) -> (Projection, ClipReport) {
        debug!(%side, "plane does not bisect the surface, labeling uniformly");
        let report = ClipReport {
            fallback: Some(side),
            ..Self::empty_report(plane)
        };
        (project_uniform(split, side, &self.source_tree), report)
    }

    fn resolve_crossings(
        &self,
        split: &NaiveSplit,
        plane: &Plane,
    ) -> ClipResult<(Projection, ClipReport)> {
        let bodies = discover_bodies(split)?;
        let graph = AdjacencyGraph::build(
            &bodies,
            self.config.adjacency_weld_tolerance,
            self.config.parallel_adjacency,
        );
        let anchors = select_anchors(&bodies, &plane.origin())?;
        let partition = resolve(graph, &anchors);
        let projection = project(
            &bodies,
            &partition,
            &self.source_tree,
            self.config.region_clean_tolerance,
        )?;

        let report = ClipReport {
            body_count: bodies.len(),
            root: Some(anchors.root),
            nearest_far: Some(anchors.nearest_far),
            near_bodies: partition.near,
            far_bodies: partition.far,
            anchor_ties: anchors.ties,
            ..Self::empty_report(plane)
        };
        Ok((projection, report))
    }

    fn empty_report(plane: &Plane) -> ClipReport {
        ClipReport {
            origin: plane.origin(),
            normal: plane.normal(),
            fallback: None,
            body_count: 0,
            root: None,
            nearest_far: None,
            near_bodies: Vec::new(),
            far_bodies: Vec::new(),
            anchor_ties: Vec::new(),
            near_points: 0,
            far_points: 0,
        }
    }

    /// Mark every point far again and forget the last pass
    pub fn reset(&mut self) {
        self.clipped.reset();
        self.near_side = None;
        self.far_side = None;
        self.last_report = None;
    }

    /// Naive plane clip of the working surface, without any resolution
    pub fn preview(&self, origin: Point3<f64>, normal: Vector3<f64>) -> ClipResult<NaiveSplit> {
        let plane = Plane::new(origin, normal)?;
        Ok(self.naive_split(&plane))
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// The input mesh without its degenerate triangles
    pub fn surface(&self) -> &Mesh {
        &self.surface
    }

    pub fn clipped(&self) -> &LabeledMesh {
        &self.clipped
    }

    pub fn near_side(&self) -> Option<&Region> {
        self.near_side.as_ref()
    }

    pub fn far_side(&self) -> Option<&Region> {
        self.far_side.as_ref()
    }

    pub fn last_report(&self) -> Option<&ClipReport> {
        self.last_report.as_ref()
    }

    pub fn config(&self) -> &ClipConfig {
        &self.config
    }
}
