// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! I/O module - importing meshes and exporting clip results

mod exporter;
mod importer;

pub use exporter::{export_labels, export_report, export_stl, LabelExport};
pub use importer::{import_stl, read_stl};
