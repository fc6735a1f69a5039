// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Geometry module - mesh representation and the primitive operations the
//! clipper is built on: plane clip, component split, merge, clean and
//! nearest-neighbor lookup

mod bbox;
mod components;
mod mesh;
mod plane;
mod point_tree;
mod primitives;

pub use bbox::BoundingBox;
pub use components::{count_bodies, split_bodies};
pub use mesh::{Mesh, Triangle, Vertex};
pub use plane::{clip_mesh, NaiveSplit, Plane, PlaneSide};
pub use point_tree::PointTree;
pub use primitives::Primitive;
