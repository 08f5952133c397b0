//! Data-generation settings
//!
//! Loaded from a JSON file; every field is optional and falls back to the
//! defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// On-disk format for trial tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    /// File extension for trial files
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Arena width and height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaSize {
    pub width: f64,
    pub height: f64,
}

impl ArenaSize {
    pub fn as_vec(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }
}

impl Default for ArenaSize {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

/// Data-generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Trials ===
    /// Number of valid trials to produce
    pub total_trials: usize,
    /// Smallest step count a trial may run for
    pub min_steps: u32,
    /// Step counts are drawn from `min_steps..max_steps` (exclusive)
    pub max_steps: u32,
    /// Fixed timestep
    pub time_delta: f64,

    // === Balls ===
    pub ball_count: usize,
    /// Launch impulses are drawn uniformly from `[0, max_impulse)`
    pub max_impulse: f64,
    pub ball_radius: f64,
    pub ball_mass: f64,

    // === Arena ===
    pub arena_size: ArenaSize,

    // === Reproducibility ===
    /// RNG seed; drawn from OS entropy when absent
    pub seed: Option<u64>,

    // === Output ===
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    /// Log progress every this many trials (0 disables)
    pub progress_interval: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_trials: 10_000,
            min_steps: 1,
            max_steps: 500,
            time_delta: TIME_DELTA,

            ball_count: 1,
            max_impulse: 100.0,
            ball_radius: BALL_RADIUS,
            ball_mass: BALL_MASS,

            arena_size: ArenaSize::default(),

            seed: None,

            output_dir: PathBuf::from("output"),
            format: OutputFormat::Csv,
            progress_interval: 1000,
        }
    }
}

impl Settings {
    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded settings from {}", path.display());
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from JSON without validating
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check every field is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_steps < 1 {
            return Err(ConfigError::invalid("min_steps", "must be at least 1"));
        }
        if self.max_steps <= self.min_steps {
            return Err(ConfigError::invalid(
                "max_steps",
                format!(
                    "must exceed min_steps ({}), got {}",
                    self.min_steps, self.max_steps
                ),
            ));
        }
        if !(self.time_delta.is_finite() && self.time_delta > 0.0) {
            return Err(ConfigError::invalid(
                "time_delta",
                format!("must be positive, got {}", self.time_delta),
            ));
        }
        if self.ball_count == 0 {
            return Err(ConfigError::invalid("ball_count", "must be at least 1"));
        }
        if !(self.max_impulse.is_finite() && self.max_impulse >= 0.0) {
            return Err(ConfigError::invalid(
                "max_impulse",
                format!("must be non-negative, got {}", self.max_impulse),
            ));
        }
        if !(self.ball_radius.is_finite() && self.ball_radius > 0.0) {
            return Err(ConfigError::invalid(
                "ball_radius",
                format!("must be positive, got {}", self.ball_radius),
            ));
        }
        if !(self.ball_mass.is_finite() && self.ball_mass > 0.0) {
            return Err(ConfigError::invalid(
                "ball_mass",
                format!("must be positive, got {}", self.ball_mass),
            ));
        }
        let size = self.arena_size.as_vec();
        if !(size.is_finite() && size.x > 0.0 && size.y > 0.0) {
            return Err(ConfigError::invalid(
                "arena_size",
                format!("width and height must be positive, got {size}"),
            ));
        }
        Ok(())
    }
}
