// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Near/far resolution of a plane clip over a tube mesh
//!
//! A plane can cross a bent tube more than once. The naive split then puts
//! pieces of the tube on the wrong side. This module decomposes the split
//! into bodies, finds which bodies touch, and keeps only the crossing
//! nearest the reference point as the real cut.

pub mod adjacency;
pub mod anchor;
pub mod body;
pub mod cut_graph;
pub mod projector;
pub mod session;

pub use adjacency::{are_adjacent, AdjacencyGraph};
pub use anchor::{select_anchors, AnchorTie, Anchors};
pub use body::{discover_bodies, Body, RawSide};
pub use cut_graph::{resolve, Partition};
pub use projector::{project, project_uniform, Projection, Region};
pub use session::{ClipReport, LabeledMesh, TubeClipper};
