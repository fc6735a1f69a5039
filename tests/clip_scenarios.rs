// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! End-to-end clipping scenarios on synthetic tubes

use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use tubeclip::clipper::{are_adjacent, discover_bodies};
use tubeclip::geometry::{clip_mesh, Plane, Primitive};
use tubeclip::{ClipConfig, ClipError, Mesh, RawSide, TubeClipper};

fn u_tube() -> Mesh {
    // Legs at x = 0 and x = 10 rising to z = 10
    Primitive::u_tube(10.0, 10.0, 1.0, 1.0, 8).to_mesh()
}

fn cylinder() -> Mesh {
    Primitive::cylinder(4.0, 1.0, 8).to_mesh()
}

fn far_set(clipper: &TubeClipper) -> Vec<usize> {
    let sides = &clipper.clipped().sides;
    (0..sides.len()).filter(|&i| sides[i]).collect()
}

fn assert_labels(clipper: &TubeClipper, expected_far: impl Fn(&Point3<f64>) -> bool) {
    let clipped = clipper.clipped();
    for (vertex, &far) in clipped.mesh.vertices.iter().zip(&clipped.sides) {
        assert_eq!(
            far,
            expected_far(&vertex.position),
            "point {:?} labeled {}",
            vertex.position,
            if far { "far" } else { "near" }
        );
    }
}

#[test]
fn test_single_crossing() {
    let mut clipper = TubeClipper::new(cylinder()).unwrap();
    clipper.clip(Point3::new(0.0, 0.0, 2.5), Vector3::z()).unwrap();

    let report = clipper.last_report().unwrap();
    assert_eq!(report.fallback, None);
    assert_eq!(report.body_count, 2);
    assert_eq!(report.root, Some(0));
    assert_eq!(report.nearest_far, Some(1));
    assert_eq!(report.near_bodies, vec![0]);
    assert_eq!(report.far_bodies, vec![1]);
    assert!(report.anchor_ties.is_empty());

    assert_labels(&clipper, |p| p.z > 2.5);
}

#[test]
fn test_u_tube_second_crossing_stays_near() {
    let mut clipper = TubeClipper::new(u_tube()).unwrap();
    clipper.clip(Point3::new(0.0, 0.0, 5.5), Vector3::z()).unwrap();

    let report = clipper.last_report().unwrap();
    assert_eq!(report.body_count, 3);
    assert_eq!(report.root, Some(0));
    assert_eq!(report.nearest_far, Some(1));
    assert_eq!(report.near_bodies, vec![0, 2]);
    assert_eq!(report.far_bodies, vec![1]);

    // Only the top of the leg at the reference point is cut off
    assert_labels(&clipper, |p| p.x < 5.0 && p.z > 5.5);
    assert_eq!(clipper.clipped().far_count(), 5 * 8);
}

#[test]
fn test_u_tube_reference_on_other_leg() {
    let mut clipper = TubeClipper::new(u_tube()).unwrap();
    clipper.clip(Point3::new(10.0, 0.0, 5.5), Vector3::z()).unwrap();

    let report = clipper.last_report().unwrap();
    assert_eq!(report.nearest_far, Some(2));
    assert_eq!(report.near_bodies, vec![0, 1]);
    assert_labels(&clipper, |p| p.x > 5.0 && p.z > 5.5);
}

#[test]
fn test_u_tube_flipped_normal() {
    // Leg tops are now raw near, the bottom run is the single far body
    let mut clipper = TubeClipper::new(u_tube()).unwrap();
    clipper.clip(Point3::new(0.0, 0.0, 5.5), -Vector3::z()).unwrap();

    let report = clipper.last_report().unwrap();
    assert_eq!(report.body_count, 3);
    assert_eq!(report.root, Some(0));
    assert_eq!(report.nearest_far, Some(2));
    assert_eq!(report.near_bodies, vec![0]);
    assert_eq!(report.far_bodies, vec![1, 2]);

    assert_labels(&clipper, |p| !(p.x < 5.0 && p.z > 5.5));
}

#[test]
fn test_fallback_front_side_is_a_no_op() {
    let mut clipper = TubeClipper::new(cylinder()).unwrap();
    clipper.clip(Point3::new(0.0, 0.0, -5.0), Vector3::z()).unwrap();

    let report = clipper.last_report().unwrap();
    assert_eq!(report.fallback, Some(RawSide::Far));
    assert_eq!(report.body_count, 0);
    assert_eq!(clipper.clipped().near_count(), 0);
    assert!(clipper.near_side().unwrap().mesh.is_empty());
    assert_eq!(
        clipper.far_side().unwrap().mesh.triangle_count(),
        clipper.mesh().triangle_count()
    );
}

#[test]
fn test_fallback_behind_labels_everything_near() {
    let mut clipper = TubeClipper::new(cylinder()).unwrap();
    clipper.clip(Point3::new(0.0, 0.0, 10.0), Vector3::z()).unwrap();

    assert_eq!(clipper.last_report().unwrap().fallback, Some(RawSide::Near));
    assert_eq!(clipper.clipped().far_count(), 0);
}

#[test]
fn test_no_op_cut_after_real_cut_leaves_labels() {
    let mut clipper = TubeClipper::new(u_tube()).unwrap();
    clipper.clip(Point3::new(0.0, 0.0, 5.5), Vector3::z()).unwrap();
    let before = clipper.clipped().sides.clone();

    clipper.clip(Point3::new(0.0, 0.0, 50.0), -Vector3::z()).unwrap();
    assert_eq!(clipper.last_report().unwrap().fallback, Some(RawSide::Far));
    assert_eq!(clipper.clipped().sides, before);
}

#[test]
fn test_repeated_clip_is_idempotent() {
    let mut clipper = TubeClipper::new(u_tube()).unwrap();
    clipper.clip(Point3::new(0.0, 0.0, 5.5), Vector3::z()).unwrap();
    let first = clipper.clipped().sides.clone();
    clipper.clip(Point3::new(0.0, 0.0, 5.5), Vector3::z()).unwrap();
    assert_eq!(clipper.clipped().sides, first);
}

#[test]
fn test_far_set_narrows_across_calls() {
    let mut clipper = TubeClipper::new(cylinder()).unwrap();
    let mut previous = far_set(&clipper);

    for z in [3.5, 1.5, 2.5] {
        clipper.clip(Point3::new(0.0, 0.0, z), Vector3::z()).unwrap();
        let current = far_set(&clipper);
        assert!(current.iter().all(|i| previous.contains(i)));
        previous = current;
    }
    assert_labels(&clipper, |p| p.z > 3.5);
}

#[test]
fn test_every_point_labeled_and_region_vertices_agree() {
    let mut clipper = TubeClipper::new(u_tube()).unwrap();
    clipper.clip(Point3::new(0.0, 0.0, 5.5), Vector3::z()).unwrap();

    let clipped = clipper.clipped();
    assert_eq!(clipped.sides.len(), clipper.mesh().vertex_count());
    assert_eq!(clipped.near_count() + clipped.far_count(), clipped.sides.len());

    for region in [clipper.near_side().unwrap(), clipper.far_side().unwrap()] {
        assert_eq!(region.source_indices.len(), region.mesh.vertex_count());
        for (vertex, &source) in region.mesh.vertices.iter().zip(&region.source_indices) {
            if vertex.position == clipped.mesh.vertices[source].position {
                assert_eq!(clipped.sides[source], region.label);
            }
        }
    }
}

#[test]
fn test_adjacency_is_symmetric_over_u_tube_bodies() {
    let plane = Plane::new(Point3::new(0.0, 0.0, 5.5), Vector3::z()).unwrap();
    let split = clip_mesh(&u_tube(), &plane, 1e-9).clean(1e-4);
    let bodies = discover_bodies(&split).unwrap();
    assert_eq!(bodies.len(), 3);

    for a in &bodies {
        for b in &bodies {
            assert_eq!(are_adjacent(a, b, 1e-4), are_adjacent(b, a, 1e-4));
        }
    }
}

#[test]
fn test_failed_clip_leaves_session_untouched() {
    let mut clipper = TubeClipper::new(u_tube()).unwrap();
    clipper.clip(Point3::new(0.0, 0.0, 5.5), Vector3::z()).unwrap();
    let sides = clipper.clipped().sides.clone();
    let near_triangles = clipper.near_side().unwrap().mesh.triangle_count();

    let err = clipper
        .clip(Point3::new(0.0, 0.0, 2.0), Vector3::new(f64::NAN, 0.0, 1.0))
        .unwrap_err();
    assert_eq!(err, ClipError::InvalidPlane);
    assert_eq!(clipper.clipped().sides, sides);
    assert_eq!(clipper.near_side().unwrap().mesh.triangle_count(), near_triangles);
}

#[test]
fn test_report_normal_is_normalized() {
    let mut clipper = TubeClipper::new(cylinder()).unwrap();
    clipper.clip(Point3::new(0.0, 0.0, 2.5), Vector3::new(0.0, 0.0, 2.0)).unwrap();
    assert_relative_eq!(clipper.last_report().unwrap().normal, Vector3::z(), epsilon = 1e-12);
}

#[test]
fn test_serial_adjacency_matches_parallel() {
    let config = ClipConfig {
        parallel_adjacency: false,
        ..ClipConfig::default()
    };
    let mut serial = TubeClipper::with_config(u_tube(), config).unwrap();
    let mut parallel = TubeClipper::new(u_tube()).unwrap();
    serial.clip(Point3::new(0.0, 0.0, 5.5), Vector3::z()).unwrap();
    parallel.clip(Point3::new(0.0, 0.0, 5.5), Vector3::z()).unwrap();
    assert_eq!(serial.clipped().sides, parallel.clipped().sides);
}

#[test]
fn test_invalid_config_rejected() {
    let config = ClipConfig {
        plane_epsilon: f64::INFINITY,
        ..ClipConfig::default()
    };
    assert!(matches!(
        TubeClipper::with_config(cylinder(), config),
        Err(ClipError::InvalidConfig(_))
    ));
}
