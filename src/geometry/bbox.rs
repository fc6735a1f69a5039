// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Bounding box utilities

use super::Plane;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox.expand_to_include(point);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z)
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    /// Squared distance from `point` to the box, zero when inside
    pub fn distance_squared_to(&self, point: &Point3<f64>) -> f64 {
        let clamped = point.sup(&self.min).inf(&self.max);
        (point - clamped).norm_squared()
    }

    /// True when the boxes overlap once both are grown by `margin`
    pub fn intersects(&self, other: &BoundingBox, margin: f64) -> bool {
        self.min.x <= other.max.x + margin
            && self.max.x + margin >= other.min.x
            && self.min.y <= other.max.y + margin
            && self.max.y + margin >= other.min.y
            && self.min.z <= other.max.z + margin
            && self.max.z + margin >= other.min.z
    }

    /// True when the plane passes within `margin` of the box. When false,
    /// every point of the box is more than `margin` from the plane, on the
    /// side of the box center.
    pub fn intersects_plane(&self, plane: &Plane, margin: f64) -> bool {
        if self.is_empty() {
            return false;
        }
        let normal = plane.normal();
        let half = self.size() / 2.0;
        let radius = half.x * normal.x.abs() + half.y * normal.y.abs() + half.z * normal.z.abs();
        plane.signed_distance(&self.center()).abs() <= radius + margin
    }
}
