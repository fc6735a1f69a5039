// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Bodies: the connected pieces of a naive two-sided clip

use crate::error::{ClipError, ClipResult};
use crate::geometry::{split_bodies, Mesh, NaiveSplit};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the plane a body came from under the uncorrected split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawSide {
    /// Behind the plane (raw side 0)
    Near = 0,
    /// In front of the plane (raw side 1)
    Far = 1,
}

impl RawSide {
    /// Session label for every point of a uniform single-sided clip
    pub fn label(self) -> bool {
        matches!(self, RawSide::Far)
    }
}

impl fmt::Display for RawSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawSide::Near => write!(f, "near-raw (0)"),
            RawSide::Far => write!(f, "far-raw (1)"),
        }
    }
}

/// A maximal connected component of one raw side
#[derive(Debug, Clone)]
pub struct Body {
    /// Discovery order across side 0 then side 1
    pub id: usize,
    pub side: RawSide,
    pub mesh: Mesh,
}

impl Body {
    /// Smallest Euclidean distance from `point` to any point of the body
    pub fn min_distance_to(&self, point: &Point3<f64>) -> f64 {
        self.mesh
            .vertices
            .iter()
            .map(|v| (v.position - point).norm())
            .fold(f64::INFINITY, f64::min)
    }
}

/// Decompose both raw sides into bodies, numbering side 0 first.
///
/// A side that still holds triangles must yield at least one body;
/// anything else means the component split is inconsistent.
pub fn discover_bodies(split: &NaiveSplit) -> ClipResult<Vec<Body>> {
    let mut bodies = Vec::new();
    for (side, mesh) in [(RawSide::Near, &split.behind), (RawSide::Far, &split.front)] {
        let pieces = split_bodies(mesh);
        if pieces.is_empty() && !mesh.is_empty() {
            return Err(ClipError::EmptyBodySet {
                side,
                triangles: mesh.triangle_count(),
            });
        }
        for piece in pieces {
            bodies.push(Body {
                id: bodies.len(),
                side,
                mesh: piece,
            });
        }
    }
    Ok(bodies)
}
