//! Fixed timestep integration
//!
//! One step drifts every ball by `vel * dt`, then detects overlaps at the new
//! positions and resolves them in a fixed order. No sub-stepping, so a ball
//! fast enough to cross a wall within one step tunnels through it.

use super::collision::{detect_contacts, resolve_contact};
use super::shapes::Segment;
use super::state::Body;

/// Advance the balls by one fixed timestep
pub fn step(bodies: &mut [Body], walls: &[Segment], dt: f64) {
    for body in bodies.iter_mut() {
        body.pos += body.vel * dt;
    }

    for contact in detect_contacts(bodies, walls) {
        resolve_contact(bodies, &contact);
    }
}
