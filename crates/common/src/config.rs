//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MotionError, MotionResult};

/// Full configuration for a motion-analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// Dense optical flow parameters.
    pub flow: FlowParams,

    /// Horizontal blob locator settings.
    pub locator: LocatorConfig,

    /// Number of consecutive frames a previous detection is re-reported
    /// when the current frame has no motion. 0 disables holding.
    pub hold_frames: u32,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Polynomial-expansion optical flow parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowParams {
    /// Image scale between pyramid levels, in (0, 1).
    pub pyr_scale: f64,

    /// Number of pyramid levels above the base image.
    pub levels: usize,

    /// Averaging window size in pixels.
    pub win_size: usize,

    /// Solver iterations per pyramid level.
    pub iterations: usize,

    /// Neighborhood radius of the polynomial expansion.
    pub poly_n: usize,

    /// Gaussian sigma weighting the polynomial fit.
    pub poly_sigma: f64,
}

/// Settings for the horizontal blob locator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Pixels cropped from every side of the flow field.
    pub edge_clip: usize,

    /// Motion history smoothing factor in [0, 1].
    pub alpha: f64,

    /// Percentile in [0, 100] above which cells become foreground.
    pub percentile: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "flowpulse_motion_core=trace,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            pyr_scale: 0.5,
            levels: 5,
            win_size: 7,
            iterations: 5,
            poly_n: 5,
            poly_sigma: 1.2,
        }
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            edge_clip: 8,
            alpha: 0.25,
            percentile: 80.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl FlowParams {
    pub fn validate(&self) -> MotionResult<()> {
        if !(self.pyr_scale > 0.0 && self.pyr_scale < 1.0) {
            return Err(MotionError::config(format!(
                "pyr_scale must lie in (0, 1), got {}",
                self.pyr_scale
            )));
        }
        if self.win_size == 0 || self.poly_n == 0 {
            return Err(MotionError::config(
                "win_size and poly_n must be at least 1",
            ));
        }
        if !(self.poly_sigma >= 0.0) {
            return Err(MotionError::config(format!(
                "poly_sigma must be non-negative, got {}",
                self.poly_sigma
            )));
        }
        Ok(())
    }
}

impl LocatorConfig {
    pub fn validate(&self) -> MotionResult<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(MotionError::InvalidAlpha { alpha: self.alpha });
        }
        if !(0.0..=100.0).contains(&self.percentile) {
            return Err(MotionError::config(format!(
                "percentile must lie in [0, 100], got {}",
                self.percentile
            )));
        }
        Ok(())
    }
}

impl PipelineConfig {
    /// Check every section. Called by loaders; also useful after CLI overrides.
    pub fn validate(&self) -> MotionResult<()> {
        self.flow.validate()?;
        self.locator.validate()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> MotionResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config at {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> MotionResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Save config to the standard location.
    pub fn save(&self) -> MotionResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("flowpulse").join("config.json")
}
