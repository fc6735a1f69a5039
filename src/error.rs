// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Error types for mesh clipping

use crate::clipper::RawSide;
use thiserror::Error;

/// Failures surfaced by the geometry primitives and the clip pipeline.
///
/// A degenerate plane (one that misses the mesh) is not an error; it is
/// handled by the single-sided fallback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipError {
    #[error("mesh has no triangles")]
    EmptyMesh,

    #[error("triangle {triangle} references vertex {index} of {vertex_count}")]
    InvalidIndex {
        triangle: usize,
        index: usize,
        vertex_count: usize,
    },

    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },

    #[error("cut normal must be finite and non-zero")]
    InvalidPlane,

    #[error("reference point must be finite")]
    InvalidOrigin,

    #[error("no bodies found on the {side} side, which has {triangles} triangles")]
    EmptyBodySet { side: RawSide, triangles: usize },

    #[error("plane clip left no triangles on either side")]
    NothingClipped,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ClipResult<T> = std::result::Result<T, ClipError>;
