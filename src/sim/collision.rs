//! Contact detection and elastic collision response
//!
//! Both kinds of contact are resolved along the contact normal only, so the
//! tangential part of every velocity is left untouched. Ball-ball contacts
//! exchange momentum with the 1D elastic formula; walls have infinite mass and
//! mirror the normal component.

use glam::DVec2;

use super::shapes::{Segment, circle_segment_overlap, circles_overlap};
use super::state::Body;

/// A detected overlap for the current step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    /// Two balls overlap. `normal` is the unit vector from `i` toward `j`.
    BodyBody { i: usize, j: usize, normal: DVec2 },
    /// A ball overlaps a wall. `normal` points from the wall toward the ball.
    BodyWall {
        body: usize,
        wall: usize,
        normal: DVec2,
    },
}

/// Contact between two balls, if they overlap and the normal is defined
pub fn body_body_contact(i: usize, a: &Body, j: usize, b: &Body) -> Option<Contact> {
    if !circles_overlap(a.pos, a.radius, b.pos, b.radius) {
        return None;
    }
    // Coincident centers have no contact normal
    let normal = (b.pos - a.pos).try_normalize()?;
    Some(Contact::BodyBody { i, j, normal })
}

/// Contact between a ball and a wall segment
pub fn body_wall_contact(index: usize, body: &Body, wall_index: usize, wall: &Segment) -> Option<Contact> {
    if !circle_segment_overlap(body.pos, body.radius, wall) {
        return None;
    }
    let t = wall.project(body.pos);
    let normal = if t > 0.0 && t < 1.0 {
        // Face contact: the wall's own normal, flipped when the center has
        // crossed to the outside. Never rebuilt from the projected point, so
        // the tangential part of a reflected velocity stays exact.
        let inward = wall.inward_normal();
        if (body.pos - wall.a).dot(inward) < 0.0 { -inward } else { inward }
    } else {
        // End cap: normal from the endpoint to the center
        let closest = wall.closest_point(body.pos);
        (body.pos - closest)
            .try_normalize()
            .unwrap_or_else(|| wall.inward_normal())
    };
    Some(Contact::BodyWall {
        body: index,
        wall: wall_index,
        normal,
    })
}

/// Gather every contact in deterministic order: ball pairs `(i, j)` with
/// `i < j` ascending, then ball-wall pairs by ball then wall.
pub fn detect_contacts(bodies: &[Body], walls: &[Segment]) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for (i, a) in bodies.iter().enumerate() {
        for (j, b) in bodies.iter().enumerate().skip(i + 1) {
            contacts.extend(body_body_contact(i, a, j, b));
        }
    }
    for (i, body) in bodies.iter().enumerate() {
        for (w, wall) in walls.iter().enumerate() {
            contacts.extend(body_wall_contact(i, body, w, wall));
        }
    }
    contacts
}

/// Apply one contact to the ball velocities
pub fn resolve_contact(bodies: &mut [Body], contact: &Contact) {
    match *contact {
        Contact::BodyBody { i, j, normal } => {
            let (lo, hi) = bodies.split_at_mut(j);
            resolve_body_body(&mut lo[i], &mut hi[0], normal);
        }
        Contact::BodyWall { body, normal, .. } => {
            let b = &mut bodies[body];
            b.vel = reflect_velocity(b.vel, normal);
        }
    }
}

/// Perfectly elastic ball-ball response along `normal` (unit, from `a` to `b`).
///
/// Pairs that are already separating are left alone so an overlap that
/// persists into the next step does not bounce twice.
pub fn resolve_body_body(a: &mut Body, b: &mut Body, normal: DVec2) {
    let approach = (a.vel - b.vel).dot(normal);
    if approach <= 0.0 {
        return;
    }
    let total = a.mass + b.mass;
    a.vel -= (2.0 * b.mass / total) * approach * normal;
    b.vel += (2.0 * a.mass / total) * approach * normal;
}

/// Mirror the normal component of a velocity moving into a wall.
///
/// `normal` points away from the wall. Velocities already leaving the wall are
/// returned unchanged.
#[inline]
pub fn reflect_velocity(velocity: DVec2, normal: DVec2) -> DVec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }
    velocity - 2.0 * vn * normal
}
