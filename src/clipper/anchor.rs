// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Anchor selection: the bodies on each raw side nearest the reference point

use super::{Body, RawSide};
use crate::error::{ClipError, ClipResult};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Several bodies on one side share the minimum distance to the reference.
/// The first in discovery order was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorTie {
    pub side: RawSide,
    pub chosen: usize,
    pub tied: Vec<usize>,
    pub distance: f64,
}

/// `root` anchors the true-near region; `nearest_far` is the one crossing
/// that acts as the cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchors {
    pub root: usize,
    pub nearest_far: usize,
    pub ties: Vec<AnchorTie>,
}

/// Pick the nearest body on each raw side. Ties go to the body discovered
/// first and are logged at WARN.
pub fn select_anchors(bodies: &[Body], origin: &Point3<f64>) -> ClipResult<Anchors> {
    let mut ties = Vec::new();
    let root = nearest_on_side(bodies, RawSide::Near, origin, &mut ties)?;
    let nearest_far = nearest_on_side(bodies, RawSide::Far, origin, &mut ties)?;
    Ok(Anchors {
        root,
        nearest_far,
        ties,
    })
}

fn nearest_on_side(
    bodies: &[Body],
    side: RawSide,
    origin: &Point3<f64>,
    ties: &mut Vec<AnchorTie>,
) -> ClipResult<usize> {
    let distances: Vec<(usize, f64)> = bodies
        .iter()
        .filter(|b| b.side == side)
        .map(|b| (b.id, b.min_distance_to(origin)))
        .collect();

    // Strict comparison keeps the earliest body among equals
    let (chosen, distance) = distances
        .iter()
        .copied()
        .reduce(|best, candidate| if candidate.1 < best.1 { candidate } else { best })
        .ok_or(ClipError::EmptyBodySet { side, triangles: 0 })?;

    let tied: Vec<usize> = distances
        .iter()
        .filter(|&&(_, d)| d == distance)
        .map(|&(id, _)| id)
        .collect();
    if tied.len() > 1 {
        warn!(
            %side,
            chosen,
            ?tied,
            distance,
            "ambiguous anchor: bodies tie for nearest to the reference point"
        );
        ties.push(AnchorTie {
            side,
            chosen,
            tied,
            distance,
        });
    }

    Ok(chosen)
}
