// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! Clipper configuration

use crate::error::{ClipError, ClipResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up by [`ClipConfig::load`]
pub const CONFIG_FILE: &str = "tubeclip.toml";

/// Tolerances and switches for one clipping session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Weld tolerance applied to both raw halves right after the plane clip
    pub raw_clean_tolerance: f64,
    /// Weld tolerance applied to the merged near and far regions
    pub region_clean_tolerance: f64,
    /// Weld tolerance used when merging two bodies to test adjacency
    pub adjacency_weld_tolerance: f64,
    /// Points closer than this to the plane count as lying on it
    pub plane_epsilon: f64,
    /// Run the pairwise adjacency tests on the rayon pool
    pub parallel_adjacency: bool,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            raw_clean_tolerance: 1e-4,
            region_clean_tolerance: 1e-5,
            adjacency_weld_tolerance: 1e-4,
            plane_epsilon: 1e-9,
            parallel_adjacency: true,
        }
    }
}

impl ClipConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: ClipConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `tubeclip.toml` from the working directory if present, then
    /// apply `TUBECLIP_*` environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        let tolerances = [
            ("TUBECLIP_RAW_CLEAN_TOLERANCE", &mut self.raw_clean_tolerance),
            ("TUBECLIP_REGION_CLEAN_TOLERANCE", &mut self.region_clean_tolerance),
            ("TUBECLIP_ADJACENCY_WELD_TOLERANCE", &mut self.adjacency_weld_tolerance),
            ("TUBECLIP_PLANE_EPSILON", &mut self.plane_epsilon),
        ];
        for (name, field) in tolerances {
            if let Ok(value) = std::env::var(name) {
                *field = value
                    .parse()
                    .with_context(|| format!("{name} is not a number: {value:?}"))?;
            }
        }

        if let Ok(value) = std::env::var("TUBECLIP_PARALLEL_ADJACENCY") {
            self.parallel_adjacency = value.parse().with_context(|| {
                format!("TUBECLIP_PARALLEL_ADJACENCY is not a boolean: {value:?}")
            })?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Every tolerance must be finite and non-negative
    pub fn validate(&self) -> ClipResult<()> {
        let tolerances = [
            ("raw_clean_tolerance", self.raw_clean_tolerance),
            ("region_clean_tolerance", self.region_clean_tolerance),
            ("adjacency_weld_tolerance", self.adjacency_weld_tolerance),
            ("plane_epsilon", self.plane_epsilon),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(ClipError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}
