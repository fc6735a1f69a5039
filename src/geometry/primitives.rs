// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Tubular mesh generators used as fixtures and benchmark inputs

use super::{Mesh, Triangle, Vertex};
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
pub enum Primitive {
    /// Open tube swept along a polyline
    Tube {
        path: Vec<Point3<f64>>,
        radius: f64,
        segments: u32,
    },
}

impl Primitive {
    /// Fewer than 3 `segments` falls back to 16 around the circumference
    pub fn tube(path: Vec<Point3<f64>>, radius: f64, segments: u32) -> Self {
        let segments = if segments >= 3 { segments } else { 16 };
        Self::Tube {
            path,
            radius,
            segments,
        }
    }

    /// Straight open tube along +z from z=0 to z=height
    pub fn cylinder(height: f64, radius: f64, segments: u32) -> Self {
        let steps = height.ceil().max(1.0) as usize;
        let path = (0..=steps)
            .map(|i| Point3::new(0.0, 0.0, height * i as f64 / steps as f64))
            .collect();
        Self::tube(path, radius, segments)
    }

    /// Open U-shaped tube lying in the xz plane: two legs rising from z=0 to
    /// z=`height` at x=0 and x=`width`, joined by a bottom run at z=0.
    /// `step` controls the sampling distance along the path.
    pub fn u_tube(width: f64, height: f64, radius: f64, step: f64, segments: u32) -> Self {
        let top_left = Point3::new(0.0, 0.0, height);
        let bottom_left = Point3::origin();
        let bottom_right = Point3::new(width, 0.0, 0.0);
        let top_right = Point3::new(width, 0.0, height);

        let mut path = Vec::new();
        push_segment(&mut path, top_left, bottom_left, step);
        push_segment(&mut path, bottom_left, bottom_right, step);
        push_segment(&mut path, bottom_right, top_right, step);
        path.push(top_right);
        Self::tube(path, radius, segments)
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Tube {
                path,
                radius,
                segments,
            } => generate_tube_mesh(path, *radius, *segments),
        }
    }
}

/// Sample `from`..`to` (excluding `to`) every `step` units
fn push_segment(path: &mut Vec<Point3<f64>>, from: Point3<f64>, to: Point3<f64>, step: f64) {
    let length = (to - from).norm();
    let steps = (length / step.max(f64::EPSILON)).ceil().max(1.0) as usize;
    for i in 0..steps {
        path.push(from + (to - from) * (i as f64 / steps as f64));
    }
}

fn generate_tube_mesh(path: &[Point3<f64>], radius: f64, segments: u32) -> Mesh {
    let mut mesh = Mesh::new();
    if path.len() < 2 {
        return mesh;
    }

    let segments = segments as usize;
    let mut rings: Vec<Vec<usize>> = Vec::with_capacity(path.len());
    let mut reference = initial_reference(path[1] - path[0]);

    for (i, center) in path.iter().enumerate() {
        // Average incoming and outgoing directions at interior points
        let incoming = if i > 0 {
            (center - path[i - 1]).normalize()
        } else {
            Vector3::zeros()
        };
        let outgoing = if i + 1 < path.len() {
            (path[i + 1] - center).normalize()
        } else {
            Vector3::zeros()
        };
        let tangent = (incoming + outgoing).try_normalize(1e-12).unwrap_or(outgoing);

        // Parallel-transport the reference axis so rings do not twist
        let u = (reference - tangent * reference.dot(&tangent)).normalize();
        let v = tangent.cross(&u);
        reference = u;

        let ring = (0..segments)
            .map(|j| {
                let angle = 2.0 * PI * j as f64 / segments as f64;
                let normal = u * angle.cos() + v * angle.sin();
                mesh.add_vertex(Vertex::new(center + normal * radius, normal))
            })
            .collect();
        rings.push(ring);
    }

    for pair in rings.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        for j in 0..segments {
            let next = (j + 1) % segments;
            mesh.add_triangle(Triangle::new([a[j], a[next], b[next]]));
            mesh.add_triangle(Triangle::new([a[j], b[next], b[j]]));
        }
    }

    mesh
}

/// Any axis not parallel to the first tangent
fn initial_reference(tangent: Vector3<f64>) -> Vector3<f64> {
    let tangent = tangent.normalize();
    if tangent.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    }
}
