// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Cut-graph resolution: partition bodies into true-near and true-far sets

use super::{AdjacencyGraph, Anchors};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body ids on each resolved side, both sorted ascending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub near: Vec<usize>,
    pub far: Vec<usize>,
}

/// Remove `nearest_far` from the graph and keep whatever still reaches
/// `root` on the near side. Everything else, `nearest_far` and isolated
/// bodies included, is far.
///
/// Crossings other than the nearest one stay bridged through the residual
/// graph, so they do not split the near region.
pub fn resolve(mut graph: AdjacencyGraph, anchors: &Anchors) -> Partition {
    let all = graph.nodes();
    graph.remove_node(anchors.nearest_far);

    let mut near = graph.component_of(anchors.root);
    if near.is_empty() {
        // root absent from the graph entirely
        near.push(anchors.root);
    }

    let far: Vec<usize> = all
        .into_iter()
        .chain(std::iter::once(anchors.nearest_far))
        .filter(|id| near.binary_search(id).is_err())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    debug!(
        root = anchors.root,
        nearest_far = anchors.nearest_far,
        ?near,
        ?far,
        "resolved cut graph"
    );
    Partition { near, far }
}
