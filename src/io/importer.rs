// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! STL importer

use crate::geometry::{Mesh, Triangle, Vertex};
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Import an STL file (ASCII or binary) as an indexed mesh
pub fn import_stl(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open STL file: {:?}", path))?;
    read_stl(&mut BufReader::new(file))
        .with_context(|| format!("Failed to read STL file: {:?}", path))
}

/// Read STL data from any seekable source.
///
/// stl_io already merges coincident corners, so tube rings come back with
/// shared vertices and connected topology. Normals are recomputed per
/// vertex from the triangles.
pub fn read_stl<R: Read + Seek>(reader: &mut R) -> Result<Mesh> {
    let stl = stl_io::read_stl(reader).context("Malformed STL data")?;

    let mut mesh = Mesh::with_capacity(stl.vertices.len(), stl.faces.len());
    for v in &stl.vertices {
        mesh.add_vertex(Vertex::at(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64)));
    }
    for face in &stl.faces {
        mesh.add_triangle(Triangle::new(face.vertices));
    }
    mesh.recompute_normals();
    Ok(mesh)
}
