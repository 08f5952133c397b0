//! Per-ball feature records and the joined trial table
//!
//! A record is captured for every ball at three checkpoints (initial,
//! midpoint, final). Records are pure functions of a ball's state and the
//! arena size.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::shapes::{WallDistances, distance_to_walls};
use super::state::Body;

/// The three moments of a run at which features are recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Checkpoint {
    Initial,
    Midpoint,
    Final,
}

impl Checkpoint {
    /// Column suffix used in tabular output
    pub fn suffix(&self) -> &'static str {
        match self {
            Checkpoint::Initial => "0",
            Checkpoint::Midpoint => "m",
            Checkpoint::Final => "f",
        }
    }
}

/// Direction of travel in [0, 2π).
///
/// Follows `atan(vy / vx)`, shifted by π when moving left and by 2π when
/// still negative. A vertical velocity (`vx == 0`) maps to π/2 or 3π/2 by the
/// sign of `vy`, and a ball at rest maps to 0.
pub fn travel_angle(vel: DVec2) -> f64 {
    if vel.x == 0.0 {
        return if vel.y > 0.0 {
            FRAC_PI_2
        } else if vel.y < 0.0 {
            3.0 * FRAC_PI_2
        } else {
            0.0
        };
    }
    let mut angle = (vel.y / vel.x).atan();
    if vel.x < 0.0 {
        angle += PI;
    }
    if angle < 0.0 {
        angle += TAU;
    }
    // Tiny negative angles round up to exactly 2π
    crate::normalize_angle(angle)
}

/// Derived state of one ball at one checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Ball identity (index within its arena)
    pub id: usize,
    /// Signed distances to the four walls
    pub walls: WallDistances,
    pub speed: f64,
    /// Direction of travel in [0, 2π)
    pub angle: f64,
    pub pos: DVec2,
    pub vel: DVec2,
}

impl FeatureRecord {
    /// Record a ball's current state
    pub fn capture(body: &Body, arena_size: DVec2) -> Self {
        Self {
            id: body.id,
            walls: distance_to_walls(body.pos, arena_size),
            speed: body.vel.length(),
            angle: travel_angle(body.vel),
            pos: body.pos,
            vel: body.vel,
        }
    }

    /// Record every ball, in body order
    pub fn capture_all(bodies: &[Body], arena_size: DVec2) -> Vec<Self> {
        bodies
            .iter()
            .map(|b| Self::capture(b, arena_size))
            .collect()
    }

    /// Values in column order: wall distances, speed, angle, position, velocity
    pub fn values(&self) -> [f64; 10] {
        [
            self.walls.left,
            self.walls.right,
            self.walls.bottom,
            self.walls.top,
            self.speed,
            self.angle,
            self.pos.x,
            self.pos.y,
            self.vel.x,
            self.vel.y,
        ]
    }

    /// Column names for `values()` at the given checkpoint
    pub fn column_names(checkpoint: Checkpoint) -> [String; 10] {
        let s = checkpoint.suffix();
        [
            format!("left_d{s}"),
            format!("right_d{s}"),
            format!("bot_d{s}"),
            format!("top_d{s}"),
            format!("speed{s}"),
            format!("angle{s}"),
            format!("px{s}"),
            format!("py{s}"),
            format!("vx{s}"),
            format!("vy{s}"),
        ]
    }
}

/// One ball's records across a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRow {
    pub id: usize,
    pub initial: FeatureRecord,
    pub midpoint: FeatureRecord,
    pub final_state: FeatureRecord,
}

impl TrialRow {
    /// Training label: the final position
    pub fn label(&self) -> DVec2 {
        self.final_state.pos
    }
}

/// Joined features and labels for a valid run, one row per ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialTable {
    /// Total steps in the run
    pub step_limit: u32,
    /// Step index at which the midpoint was captured
    pub midpoint_step: u32,
    pub rows: Vec<TrialRow>,
}

impl TrialTable {
    /// Join three checkpoint captures. Each capture must list the same balls
    /// in body order, which is what [`FeatureRecord::capture_all`] produces.
    pub fn join(
        step_limit: u32,
        initial: Vec<FeatureRecord>,
        midpoint: Vec<FeatureRecord>,
        final_state: Vec<FeatureRecord>,
    ) -> Self {
        debug_assert_eq!(initial.len(), midpoint.len());
        debug_assert_eq!(initial.len(), final_state.len());
        let rows = initial
            .into_iter()
            .zip(midpoint)
            .zip(final_state)
            .map(|((initial, midpoint), final_state)| {
                debug_assert!(initial.id == midpoint.id && initial.id == final_state.id);
                TrialRow {
                    id: initial.id,
                    initial,
                    midpoint,
                    final_state,
                }
            })
            .collect();
        Self {
            step_limit,
            midpoint_step: step_limit / 2,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header for tabular output: id, initial features, midpoint features,
    /// final position labels
    pub fn header() -> Vec<String> {
        let mut columns = vec!["id".to_string()];
        columns.extend(FeatureRecord::column_names(Checkpoint::Initial));
        columns.extend(FeatureRecord::column_names(Checkpoint::Midpoint));
        columns.push("pxf".to_string());
        columns.push("pyf".to_string());
        columns
    }
}
