//! Deterministic simulation module
//!
//! Everything a single trial needs lives here. This module must be pure and
//! deterministic:
//! - Fixed timestep only
//! - Randomness only through a caller-supplied RNG
//! - Stable iteration order (by body index)
//! - No logging, no I/O

pub mod collision;
pub mod features;
pub mod shapes;
pub mod state;
pub mod tick;

pub use collision::{Contact, detect_contacts, reflect_velocity, resolve_body_body, resolve_contact};
pub use features::{Checkpoint, FeatureRecord, TrialRow, TrialTable, travel_angle};
pub use shapes::{
    Segment, WallDistances, arena_walls, circle_segment_overlap, circles_overlap, distance_to_walls,
    is_in_bounds,
};
pub use state::{Arena, Body, Completion, RunPhase};
pub use tick::step;
