//! Elastic Arena - synthetic training data from bouncing balls
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, collisions, run protocol, features)
//! - `datagen`: Trial orchestration (randomized trials, retry on invalid runs)
//! - `persistence`: CSV/JSON trial tables on disk
//! - `settings`: Data-generation configuration

pub mod datagen;
pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use datagen::{GenerationStats, Trial, TrialGenerator};
pub use error::{ConfigError, DataGenError, PersistError, SimError};
pub use settings::{OutputFormat, Settings};

use glam::DVec2;

/// Simulation defaults
pub mod consts {
    /// Ball radius (arena units)
    pub const BALL_RADIUS: f64 = 6.15;
    /// Ball mass. Unit mass makes an impulse numerically equal to the
    /// velocity it produces.
    pub const BALL_MASS: f64 = 1.0;

    /// Default fixed timestep
    pub const TIME_DELTA: f64 = 0.01;
    /// Default arena width
    pub const ARENA_WIDTH: f64 = 100.0;
    /// Default arena height
    pub const ARENA_HEIGHT: f64 = 100.0;
}

/// Normalize an angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped + 0.0 }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}
