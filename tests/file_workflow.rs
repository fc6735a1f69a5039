// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! File round trips: STL in, labels, side meshes and reports out

use anyhow::Result;
use nalgebra::{Point3, Vector3};
use tempfile::tempdir;
use tubeclip::geometry::{count_bodies, Primitive};
use tubeclip::io::{self, LabelExport};
use tubeclip::{clip_file, ClipConfig, ClipReport, RawSide, TubeClipper};

#[test]
fn test_clip_stl_and_export_sides() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("u_tube.stl");
    io::export_stl(&Primitive::u_tube(10.0, 10.0, 1.0, 1.0, 8).to_mesh(), &input)?;

    let clipper = clip_file(
        &input,
        &[(Point3::new(0.0, 0.0, 5.5), Vector3::z())],
        ClipConfig::default(),
    )?;
    let clipped = clipper.clipped();
    assert_eq!(clipped.far_count(), 5 * 8);

    let near_path = dir.path().join("near.stl");
    let far_path = dir.path().join("far.stl");
    io::export_stl(&clipped.extract_near(), &near_path)?;
    io::export_stl(&clipped.extract_far(), &far_path)?;

    // The bottom run and the untouched leg stay in one piece
    let near = io::import_stl(&near_path)?;
    let far = io::import_stl(&far_path)?;
    assert_eq!(count_bodies(&near), 1);
    assert_eq!(count_bodies(&far), 1);
    assert_eq!(far.triangle_count(), 4 * 8 * 2);
    Ok(())
}

#[test]
fn test_labels_and_report_json() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("cylinder.stl");
    io::export_stl(&Primitive::cylinder(4.0, 1.0, 8).to_mesh(), &input)?;

    let cuts = [
        (Point3::new(0.0, 0.0, 2.5), Vector3::z()),
        (Point3::new(0.0, 0.0, -1.0), Vector3::z()),
    ];
    let clipper = clip_file(&input, &cuts, ClipConfig::default())?;

    let labels_path = dir.path().join("labels.json");
    io::export_labels(clipper.clipped(), &labels_path)?;
    let labels: LabelExport = serde_json::from_str(&std::fs::read_to_string(&labels_path)?)?;
    assert_eq!(labels.vertex_count, 40);
    assert_eq!(labels.far_count, 16);
    assert_eq!(labels.sides.len(), 40);

    let report_path = dir.path().join("report.json");
    let reports: Vec<ClipReport> = clipper.last_report().cloned().into_iter().collect();
    io::export_report(&reports, &report_path)?;
    let loaded: Vec<ClipReport> = serde_json::from_str(&std::fs::read_to_string(&report_path)?)?;
    assert_eq!(loaded, reports);
    assert_eq!(loaded[0].fallback, Some(RawSide::Far));
    Ok(())
}

#[test]
fn test_config_file_drives_session() -> Result<()> {
    let dir = tempdir()?;
    let config_path = dir.path().join("tubeclip.toml");
    let config = ClipConfig {
        parallel_adjacency: false,
        region_clean_tolerance: 1e-6,
        ..ClipConfig::default()
    };
    config.save(&config_path)?;

    let loaded = ClipConfig::from_file(&config_path)?;
    assert_eq!(loaded, config);
    let clipper = TubeClipper::with_config(Primitive::cylinder(2.0, 1.0, 8).to_mesh(), loaded)?;
    assert!(!clipper.config().parallel_adjacency);
    Ok(())
}
