// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Exporters for meshes, side labels and clip reports

use crate::clipper::{ClipReport, LabeledMesh};
use crate::geometry::Mesh;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

/// Export mesh to binary STL
pub fn export_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .filter_map(|tri| {
            let [a, b, c] = tri.indices.map(|i| mesh.vertices.get(i).map(|v| v.position));
            let (a, b, c) = (a?, b?, c?);
            // STL wants the facet normal, not averaged vertex normals
            let normal = (b - a)
                .cross(&(c - a))
                .try_normalize(1e-12)
                .unwrap_or_else(nalgebra::Vector3::zeros);
            let vertex = |p: nalgebra::Point3<f64>| {
                StlVertex::new([p.x as f32, p.y as f32, p.z as f32])
            };
            Some(StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [vertex(a), vertex(b), vertex(c)],
            })
        })
        .collect();

    let file =
        File::create(path).with_context(|| format!("Failed to create STL file: {:?}", path))?;
    stl_io::write_stl(&mut BufWriter::new(file), triangles.iter())
        .with_context(|| format!("Failed to write STL file: {:?}", path))?;
    Ok(())
}

/// Side labels as written to disk: one boolean per mesh point, `true` = far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelExport {
    pub vertex_count: usize,
    pub near_count: usize,
    pub far_count: usize,
    pub sides: Vec<bool>,
}

impl From<&LabeledMesh> for LabelExport {
    fn from(labeled: &LabeledMesh) -> Self {
        Self {
            vertex_count: labeled.mesh.vertex_count(),
            near_count: labeled.near_count(),
            far_count: labeled.far_count(),
            sides: labeled.sides.clone(),
        }
    }
}

/// Write the session labels as JSON
pub fn export_labels(labeled: &LabeledMesh, path: impl AsRef<Path>) -> Result<()> {
    write_json(&LabelExport::from(labeled), path.as_ref())
}

/// Write clip reports as a JSON array
pub fn export_report(reports: &[ClipReport], path: impl AsRef<Path>) -> Result<()> {
    write_json(&reports, path.as_ref())
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create JSON file: {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write JSON file: {:?}", path))?;
    Ok(())
}
