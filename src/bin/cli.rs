// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Tubeclip CLI

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use nalgebra::{Point3, Vector3};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tubeclip::cli::{parse_vector, Reporter};
use tubeclip::{io, ClipConfig, TubeClipper};

#[derive(Parser)]
#[command(name = "tubeclip")]
#[command(
    about = "Tubeclip - clip tube meshes at the crossing nearest a reference point",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clip an STL tube with one or more planes, applied in order
    Clip {
        /// Input STL file
        input: PathBuf,

        /// Plane origin and reference point, x,y,z (repeat for each cut)
        #[arg(long, required = true, value_parser = parse_vector, allow_hyphen_values = true)]
        origin: Vec<Vector3<f64>>,

        /// Plane normal, x,y,z (one per --origin)
        #[arg(long, required = true, value_parser = parse_vector, allow_hyphen_values = true)]
        normal: Vec<Vector3<f64>>,

        /// Write per-point side labels as JSON
        #[arg(long)]
        labels: Option<PathBuf>,

        /// Write the near triangles as STL
        #[arg(long)]
        near: Option<PathBuf>,

        /// Write the far triangles as STL
        #[arg(long)]
        far: Option<PathBuf>,

        /// Write the clip reports as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Configuration file (defaults to tubeclip.toml and TUBECLIP_* variables)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write the two halves of the naive plane split, without resolution
    Preview {
        /// Input STL file
        input: PathBuf,

        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        origin: Vector3<f64>,

        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        normal: Vector3<f64>,

        /// Output STL for the half behind the plane
        #[arg(long)]
        behind: Option<PathBuf>,

        /// Output STL for the half in front of the plane
        #[arg(long)]
        front: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli.command) {
        Reporter::report_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "tubeclip=debug" } else { "tubeclip=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Clip {
            input,
            origin,
            normal,
            labels,
            near,
            far,
            report,
            config,
        } => {
            let outputs = ClipOutputs {
                labels,
                near,
                far,
                report,
            };
            clip_command(&input, &origin, &normal, config.as_deref(), &outputs)
        }
        Commands::Preview {
            input,
            origin,
            normal,
            behind,
            front,
        } => preview_command(&input, origin, normal, behind.as_deref(), front.as_deref()),
        Commands::Version => {
            println!("Tubeclip v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

struct ClipOutputs {
    labels: Option<PathBuf>,
    near: Option<PathBuf>,
    far: Option<PathBuf>,
    report: Option<PathBuf>,
}

fn clip_command(
    input: &Path,
    origins: &[Vector3<f64>],
    normals: &[Vector3<f64>],
    config: Option<&Path>,
    outputs: &ClipOutputs,
) -> Result<()> {
    if origins.len() != normals.len() {
        bail!(
            "every --origin needs a matching --normal ({} origins, {} normals)",
            origins.len(),
            normals.len()
        );
    }
    let config = match config {
        Some(path) => ClipConfig::from_file(path)?,
        None => ClipConfig::load()?,
    };

    let start = std::time::Instant::now();
    let mesh = io::import_stl(input)?;
    let mut clipper = TubeClipper::with_config(mesh, config)?;

    let mut reports = Vec::with_capacity(origins.len());
    for (index, (origin, normal)) in origins.iter().zip(normals).enumerate() {
        clipper.clip(Point3::from(*origin), *normal)?;
        if let Some(report) = clipper.last_report() {
            Reporter::report_clip(index, report);
            reports.push(report.clone());
        }
    }
    Reporter::report_summary(&input.display().to_string(), clipper.clipped(), start.elapsed());

    if let Some(path) = &outputs.labels {
        io::export_labels(clipper.clipped(), path)?;
        Reporter::success(&format!("labels written to {}", path.display()));
    }
    if let Some(path) = &outputs.near {
        io::export_stl(&clipper.clipped().extract_near(), path)?;
        Reporter::success(&format!("near side written to {}", path.display()));
    }
    if let Some(path) = &outputs.far {
        io::export_stl(&clipper.clipped().extract_far(), path)?;
        Reporter::success(&format!("far side written to {}", path.display()));
    }
    if let Some(path) = &outputs.report {
        io::export_report(&reports, path)?;
        Reporter::success(&format!("report written to {}", path.display()));
    }
    Ok(())
}

fn preview_command(
    input: &Path,
    origin: Vector3<f64>,
    normal: Vector3<f64>,
    behind: Option<&Path>,
    front: Option<&Path>,
) -> Result<()> {
    let clipper = TubeClipper::with_config(io::import_stl(input)?, ClipConfig::load()?)?;
    let split = clipper.preview(Point3::from(origin), normal)?;
    Reporter::report_preview(&input.display().to_string(), &split);

    if let Some(path) = behind {
        io::export_stl(&split.behind, path)?;
    }
    if let Some(path) = front {
        io::export_stl(&split.front, path)?;
    }
    Ok(())
}
