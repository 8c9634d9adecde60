//! Tunables for every stage of the capture pipeline.
//!
//! The defaults are the literal constants the downstream classifier was
//! trained against. Change them only with evidence: a different padding or
//! clutter threshold produces different feature grids for the same stroke.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub capture: CaptureConfig,
    pub trim: TrimConfig,
    pub normalize: NormalizeConfig,
    pub window: WindowConfig,
}

/// Size of the drawing canvas and the stroke rasterizer's jump limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub width: usize,
    pub height: usize,
    /// Samples at least this far (pixels) from the previous one start a new stroke.
    pub max_jump: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 220,
            height: 280,
            max_jump: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    /// A span narrower than this fraction of the grid side gets padded.
    pub thin_ratio: f64,
    /// Padding added on each side, as a fraction of the grid side.
    pub padding_ratio: f64,
    /// The clutter sweep only runs for aspect ratios inside `[min_aspect, max_aspect]`.
    pub min_aspect: f64,
    pub max_aspect: f64,
    /// Cumulative pixels a sweep may discard: total active / this.
    pub clutter_total_divisor: f64,
    /// Per-line cap: `min(clutter_line_max, clutter_line_ratio * cross range)`.
    pub clutter_line_max: f64,
    pub clutter_line_ratio: f64,
    /// A sweep advances less than this fraction of the tight span.
    pub clutter_max_shrink: f64,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            thin_ratio: 0.33,
            padding_ratio: 0.20,
            min_aspect: 0.5,
            max_aspect: 2.0,
            clutter_total_divisor: 10.0,
            clutter_line_max: 5.0,
            clutter_line_ratio: 0.05,
            clutter_max_shrink: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub width: usize,
    pub height: usize,
    /// Density (relative to the average) that activates a cell on its own.
    pub strong_ratio: f64,
    /// Density that activates a cell when it has more than `min_neighbors` populated neighbors.
    pub weak_ratio: f64,
    pub min_neighbors: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            strong_ratio: 0.7,
            weak_ratio: 0.35,
            min_neighbors: 1,
        }
    }
}

/// Layout and colors of the demo window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub margin: usize,
    pub hud_height: usize,
    pub background: u32,
    pub panel: u32,
    pub ink: u32,
    pub frame: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            margin: 20,
            hud_height: 20,
            background: 0x00_FF_DE_AD, // navajo white
            panel: 0x00_FF_FF_FF,
            ink: 0x00_00_00_00,
            frame: 0x00_40_40_40,
        }
    }
}

impl Config {
    /// Reads a TOML config. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(target: "config", "no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let config = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("invalid config at {}: {e}", path.display())))?;
        info!(target: "config", "loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::Config(format!("failed to create config dir: {e}")))?;
            }
        }
        let text = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, text)
            .map_err(|e| Error::Config(format!("failed to write {}: {e}", path.display())))
    }
}
