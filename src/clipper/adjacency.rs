// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Topological adjacency between bodies and the graph built from it

use super::Body;
use crate::geometry::{count_bodies, Mesh};
use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use std::collections::VecDeque;
use tracing::debug;

/// Two bodies are adjacent when their merged, welded geometry forms a single
/// connected piece. Each input is already maximal, so re-fusing can only come
/// from a shared boundary.
///
/// The lower id is always merged first, which makes the test symmetric even
/// when welding chains points together.
pub fn are_adjacent(a: &Body, b: &Body, weld_tolerance: f64) -> bool {
    let (first, second) = if a.id <= b.id { (a, b) } else { (b, a) };

    // Boxes further apart than the weld tolerance cannot share a point
    if !first
        .mesh
        .bounding_box()
        .intersects(&second.mesh.bounding_box(), weld_tolerance.max(0.0))
    {
        return false;
    }

    let mut merged = Mesh::with_capacity(
        first.mesh.vertex_count() + second.mesh.vertex_count(),
        first.mesh.triangle_count() + second.mesh.triangle_count(),
    );
    merged.merge(&first.mesh);
    merged.merge(&second.mesh);
    merged.weld_vertices(weld_tolerance);
    count_bodies(&merged) == 1
}

/// Undirected graph over body ids, built once per clip and then consumed
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    /// Every node keeps an entry, isolated ones included
    neighbors: AHashMap<usize, AHashSet<usize>>,
}

impl AdjacencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test every unordered pair of bodies. Pair tests are independent, so
    /// with `parallel` they run on the rayon pool; edges are inserted here
    /// afterwards.
    pub fn build(bodies: &[Body], weld_tolerance: f64, parallel: bool) -> Self {
        let pairs: Vec<(usize, usize)> = (0..bodies.len())
            .flat_map(|i| (i + 1..bodies.len()).map(move |j| (i, j)))
            .collect();

        let adjacent =
            |&(i, j): &(usize, usize)| are_adjacent(&bodies[i], &bodies[j], weld_tolerance);
        let edges: Vec<(usize, usize)> = if parallel {
            pairs.par_iter().filter(|&&p| adjacent(&p)).copied().collect()
        } else {
            pairs.iter().filter(|&&p| adjacent(&p)).copied().collect()
        };

        let mut graph = Self::new();
        for body in bodies {
            graph.add_node(body.id);
        }
        for (i, j) in edges {
            graph.add_edge(bodies[i].id, bodies[j].id);
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built body adjacency graph"
        );
        graph
    }

    pub fn add_node(&mut self, id: usize) {
        self.neighbors.entry(id).or_default();
    }

    pub fn add_edge(&mut self, a: usize, b: usize) {
        if a == b {
            self.add_node(a);
            return;
        }
        self.neighbors.entry(a).or_default().insert(b);
        self.neighbors.entry(b).or_default().insert(a);
    }

    /// Drop a node and all its incident edges; returns false if absent
    pub fn remove_node(&mut self, id: usize) -> bool {
        let Some(adjacent) = self.neighbors.remove(&id) else {
            return false;
        };
        for other in adjacent {
            if let Some(set) = self.neighbors.get_mut(&other) {
                set.remove(&id);
            }
        }
        true
    }

    pub fn contains(&self, id: usize) -> bool {
        self.neighbors.contains_key(&id)
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.neighbors.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Sorted neighbors of `id`
    pub fn neighbors(&self, id: usize) -> Vec<usize> {
        let mut result: Vec<usize> = self
            .neighbors
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        result.sort_unstable();
        result
    }

    /// Sorted node ids
    pub fn nodes(&self) -> Vec<usize> {
        let mut nodes: Vec<usize> = self.neighbors.keys().copied().collect();
        nodes.sort_unstable();
        nodes
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.values().map(|set| set.len()).sum::<usize>() / 2
    }

    /// Edges as sorted `(low, high)` pairs
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self
            .neighbors
            .iter()
            .flat_map(|(&a, set)| set.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Sorted ids reachable from `start`, `start` included. Empty if
    /// `start` is not a node.
    pub fn component_of(&self, start: usize) -> Vec<usize> {
        if !self.contains(start) {
            return Vec::new();
        }
        let mut visited = AHashSet::new();
        let mut queue = VecDeque::from([start]);
        visited.insert(start);
        while let Some(id) = queue.pop_front() {
            for &next in self.neighbors.get(&id).into_iter().flatten() {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        let mut component: Vec<usize> = visited.into_iter().collect();
        component.sort_unstable();
        component
    }

    /// All connected components, each sorted, ordered by smallest member
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let mut seen = AHashSet::new();
        let mut components = Vec::new();
        for id in self.nodes() {
            if seen.contains(&id) {
                continue;
            }
            let component = self.component_of(id);
            seen.extend(component.iter().copied());
            components.push(component);
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipper::{discover_bodies, RawSide};
    use crate::geometry::{clip_mesh, Plane, Primitive};
    use nalgebra::{Point3, Vector3};

    fn u_tube_bodies() -> Vec<Body> {
        let mesh = Primitive::u_tube(10.0, 10.0, 1.0, 1.0, 8).to_mesh();
        let plane = Plane::new(Point3::new(0.0, 0.0, 5.5), Vector3::z()).unwrap();
        discover_bodies(&clip_mesh(&mesh, &plane, 1e-9)).unwrap()
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let bodies = u_tube_bodies();
        for a in &bodies {
            for b in &bodies {
                if a.id != b.id {
                    assert_eq!(are_adjacent(a, b, 1e-4), are_adjacent(b, a, 1e-4));
                }
            }
        }
    }

    #[test]
    fn test_u_tube_adjacency() {
        let bodies = u_tube_bodies();
        assert_eq!(bodies[0].side, RawSide::Near);
        // The bottom run touches both leg tops; the leg tops are far apart
        assert!(are_adjacent(&bodies[0], &bodies[1], 1e-4));
        assert!(are_adjacent(&bodies[0], &bodies[2], 1e-4));
        assert!(!are_adjacent(&bodies[1], &bodies[2], 1e-4));
    }

    #[test]
    fn test_parallel_and_serial_builds_agree() {
        let bodies = u_tube_bodies();
        let serial = AdjacencyGraph::build(&bodies, 1e-4, false);
        let parallel = AdjacencyGraph::build(&bodies, 1e-4, true);
        assert_eq!(serial.edges(), parallel.edges());
        assert_eq!(serial.edges(), vec![(0, 1), (0, 2)]);
    }

    #[test]
    fn test_remove_node_and_components() {
        let mut graph = AdjacencyGraph::new();
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(3, 4);
        graph.add_node(5);

        assert_eq!(graph.connected_components(), vec![vec![0, 1, 2], vec![3, 4], vec![5]]);
        assert!(graph.remove_node(1));
        assert!(!graph.remove_node(1));
        assert!(!graph.has_edge(0, 1));
        assert_eq!(graph.neighbors(2), Vec::<usize>::new());
        assert_eq!(
            graph.connected_components(),
            vec![vec![0], vec![2], vec![3, 4], vec![5]]
        );
        assert_eq!(graph.component_of(1), Vec::<usize>::new());
    }
}
