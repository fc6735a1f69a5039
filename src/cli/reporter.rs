// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! CLI output reporter with colored formatting

use crate::clipper::{ClipReport, LabeledMesh};
use crate::geometry::NaiveSplit;
use anyhow::{bail, Context, Result};
use colored::*;
use nalgebra::Vector3;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report one clip pass
    pub fn report_clip(index: usize, report: &ClipReport) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!(
            "{} #{} origin {} normal {}",
            "Clip".bold(),
            index + 1,
            Self::format_vector(&report.origin.coords).cyan(),
            Self::format_vector(&report.normal).cyan()
        );
        println!("{}", "━".repeat(80).bright_black());

        match report.fallback {
            Some(side) => println!(
                "  {} plane does not bisect the tube, all points on the {} side",
                "Fallback:".yellow().bold(),
                side
            ),
            None => {
                Self::print_field("Bodies", report.body_count.to_string());
                if let (Some(root), Some(nearest_far)) = (report.root, report.nearest_far) {
                    Self::print_field("Root", root.to_string());
                    Self::print_field("Nearest far", nearest_far.to_string());
                }
                Self::print_field("Near bodies", format!("{:?}", report.near_bodies));
                Self::print_field("Far bodies", format!("{:?}", report.far_bodies));
            }
        }

        for tie in &report.anchor_ties {
            Self::report_warning(&format!(
                "bodies {:?} on the {} side tie at distance {:.6}; chose {}",
                tie.tied, tie.side, tie.distance, tie.chosen
            ));
        }
    }

    /// Report the accumulated labels after all clips
    pub fn report_summary(file: &str, labeled: &LabeledMesh, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Clipped:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());
        Self::print_field("Points", labeled.mesh.vertex_count().to_string().cyan());
        Self::print_field("Near", labeled.near_count().to_string().green());
        Self::print_field("Far", labeled.far_count().to_string().red());
        Self::print_field("Time", Self::format_duration(duration).yellow());
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report a naive split
    pub fn report_preview(file: &str, split: &NaiveSplit) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Preview:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());
        Self::print_field("Behind", format!("{} triangles", split.behind.triangle_count()));
        Self::print_field("Front", format!("{} triangles", split.front.triangle_count()));
        if !split.is_two_sided() {
            Self::report_warning("plane does not bisect the tube");
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn print_field(name: &str, value: impl std::fmt::Display) {
        println!("  {} {}", format!("{}:", name).bright_black(), value);
    }

    fn format_vector(v: &Vector3<f64>) -> String {
        format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

/// Parse `x,y,z` into a vector
pub fn parse_vector(s: &str) -> Result<Vector3<f64>> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        bail!("expected three comma-separated numbers, got {:?}", s);
    }
    let mut v = Vector3::zeros();
    for (axis, part) in parts.iter().enumerate() {
        v[axis] = part
            .parse()
            .with_context(|| format!("{:?} is not a number", part))?;
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }

    #[test]
    fn test_parse_vector() {
        assert_eq!(parse_vector("1, -2.5,3").unwrap(), Vector3::new(1.0, -2.5, 3.0));
        assert!(parse_vector("1,2").is_err());
        assert!(parse_vector("1,x,3").is_err());
    }
}
