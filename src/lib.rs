// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Tubeclip
//!
//! Plane clipping for tube meshes that the plane may cross more than once.
//! Only the crossing nearest a reference point acts as the cut; pieces on
//! the far side of the plane that stay connected to the near region keep
//! the near label. Labels accumulate over repeated clips on one session.

pub mod cli;
pub mod clipper;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;

pub use clipper::{ClipReport, LabeledMesh, RawSide, Region, TubeClipper};
pub use config::ClipConfig;
pub use error::{ClipError, ClipResult};
pub use geometry::{Mesh, Plane, Primitive};
pub use io::{export_labels, export_report, export_stl, import_stl};

use anyhow::Result;
use nalgebra::{Point3, Vector3};
use std::path::Path;

/// Load an STL tube and apply a sequence of clips to it
pub fn clip_file(
    path: impl AsRef<Path>,
    cuts: &[(Point3<f64>, Vector3<f64>)],
    config: ClipConfig,
) -> Result<TubeClipper> {
    let mesh = import_stl(path)?;
    let mut clipper = TubeClipper::with_config(mesh, config)?;
    for &(origin, normal) in cuts {
        clipper.clip(origin, normal)?;
    }
    Ok(clipper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_clip_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("tube.stl");
        export_stl(&Primitive::cylinder(4.0, 1.0, 8).to_mesh(), &path)?;

        let cuts = [(Point3::new(0.0, 0.0, 2.5), Vector3::z())];
        let clipper = clip_file(&path, &cuts, ClipConfig::default())?;
        assert_eq!(clipper.clipped().near_count(), 24);
        assert_eq!(clipper.clipped().far_count(), 16);
        Ok(())
    }
}
