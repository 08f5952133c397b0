//! Arena state and the single-use run protocol
//!
//! An [`Arena`] owns one trial: its balls, its four walls, and the joined
//! feature table once the run completes. The lifecycle is an explicit state
//! machine so that the one-shot `run()` cannot be repeated.

use glam::DVec2;
use rand::Rng;

use super::features::{Checkpoint, FeatureRecord, TrialTable};
use super::shapes::{Segment, arena_walls, is_in_bounds};
use super::tick::step;
use crate::consts::{BALL_MASS, BALL_RADIUS};
use crate::error::SimError;
use crate::polar_to_cartesian;

/// A ball
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Index within the owning arena
    pub id: usize,
    pub pos: DVec2,
    pub vel: DVec2,
    pub mass: f64,
    pub radius: f64,
    /// Set once the launch impulse has been applied
    pub impulse_applied: bool,
}

impl Body {
    pub fn new(id: usize, pos: DVec2, mass: f64, radius: f64) -> Self {
        Self {
            id,
            pos,
            vel: DVec2::ZERO,
            mass,
            radius,
            impulse_applied: false,
        }
    }

    /// Momentum (mass × velocity)
    #[inline]
    pub fn momentum(&self) -> DVec2 {
        self.vel * self.mass
    }

    /// Translational kinetic energy
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.vel.length_squared()
    }
}

/// How a completed run ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Completion {
    /// Every ball stayed inside the arena; the trial table is available
    Valid,
    /// A ball was outside the arena at a checked checkpoint
    Invalid { checkpoint: Checkpoint, body: usize },
}

impl Completion {
    pub fn is_valid(&self) -> bool {
        matches!(self, Completion::Valid)
    }
}

/// Lifecycle phase of an arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunPhase {
    /// Walls built, no balls yet
    Constructed,
    /// Balls placed, ready to run
    Populated,
    /// Step loop in progress
    Running,
    /// Terminal
    Completed(Completion),
}

/// One trial: balls in a walled rectangle, run exactly once
#[derive(Debug, Clone)]
pub struct Arena {
    size: DVec2,
    dt: f64,
    step_limit: u32,
    /// Steps taken so far (0-indexed counter, never exceeds `step_limit`)
    step: u32,
    bodies: Vec<Body>,
    walls: [Segment; 4],
    phase: RunPhase,
    table: Option<TrialTable>,
}

impl Arena {
    /// Create an empty arena of `size` that will run for `step_limit` steps of
    /// `dt` each
    pub fn new(step_limit: u32, dt: f64, size: DVec2) -> Result<Self, SimError> {
        if step_limit == 0 {
            return Err(SimError::InvalidArena("step limit must be at least 1".into()));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidArena(format!(
                "time delta must be positive, got {dt}"
            )));
        }
        if !(size.is_finite() && size.x > 0.0 && size.y > 0.0) {
            return Err(SimError::InvalidArena(format!(
                "size must be positive, got {size}"
            )));
        }
        Ok(Self {
            size,
            dt,
            step_limit,
            step: 0,
            bodies: Vec::new(),
            walls: arena_walls(size),
            phase: RunPhase::Constructed,
            table: None,
        })
    }

    pub fn size(&self) -> DVec2 {
        self.size
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn step_limit(&self) -> u32 {
        self.step_limit
    }

    /// Step index at which midpoint features are captured
    pub fn midpoint_step(&self) -> u32 {
        self.step_limit / 2
    }

    /// Steps actually taken
    pub fn steps_taken(&self) -> u32 {
        self.step
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn walls(&self) -> &[Segment; 4] {
        &self.walls
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Joined features and labels, present only after a valid run
    pub fn table(&self) -> Option<&TrialTable> {
        self.table.as_ref()
    }

    /// Take ownership of the trial table
    pub fn into_table(self) -> Option<TrialTable> {
        self.table
    }

    fn ensure_placing(&self, operation: &'static str) -> Result<(), SimError> {
        match self.phase {
            RunPhase::Constructed | RunPhase::Populated => Ok(()),
            phase => Err(SimError::WrongPhase { operation, phase }),
        }
    }

    /// Add a default ball (radius 6.15, unit mass) at rest. Returns its index.
    pub fn add_ball(&mut self, pos: DVec2) -> Result<usize, SimError> {
        self.add_ball_with(pos, BALL_MASS, BALL_RADIUS)
    }

    /// Add a ball with explicit mass and radius at rest. Returns its index.
    pub fn add_ball_with(&mut self, pos: DVec2, mass: f64, radius: f64) -> Result<usize, SimError> {
        self.ensure_placing("add a ball")?;
        if !(mass.is_finite() && mass > 0.0) {
            return Err(SimError::InvalidBall(format!("mass must be positive, got {mass}")));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SimError::InvalidBall(format!(
                "radius must be positive, got {radius}"
            )));
        }
        let id = self.bodies.len();
        self.bodies.push(Body::new(id, pos, mass, radius));
        self.phase = RunPhase::Populated;
        Ok(id)
    }

    /// Add `count` default balls at uniformly random positions
    pub fn populate_random<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Result<(), SimError> {
        self.populate_random_with(count, BALL_MASS, BALL_RADIUS, rng)
    }

    /// Add `count` balls of the given mass and radius at uniformly random
    /// positions
    pub fn populate_random_with<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        mass: f64,
        radius: f64,
        rng: &mut R,
    ) -> Result<(), SimError> {
        for _ in 0..count {
            let pos = DVec2::new(
                rng.random::<f64>() * self.size.x,
                rng.random::<f64>() * self.size.y,
            );
            self.add_ball_with(pos, mass, radius)?;
        }
        Ok(())
    }

    /// Apply a ball's one launch impulse: `vel += impulse / mass`
    pub fn apply_impulse(&mut self, index: usize, impulse: DVec2) -> Result<(), SimError> {
        self.ensure_placing("apply an impulse")?;
        let count = self.bodies.len();
        let body = self
            .bodies
            .get_mut(index)
            .ok_or(SimError::BodyOutOfRange { index, count })?;
        if body.impulse_applied {
            return Err(SimError::ImpulseAlreadyApplied(index));
        }
        body.vel += impulse / body.mass;
        body.impulse_applied = true;
        Ok(())
    }

    /// Push ball `index` in a uniformly random direction with an impulse of
    /// `magnitude`
    pub fn push_random_ball<R: Rng + ?Sized>(
        &mut self,
        magnitude: f64,
        index: usize,
        rng: &mut R,
    ) -> Result<(), SimError> {
        let angle = rng.random::<f64>() * std::f64::consts::TAU;
        self.apply_impulse(index, polar_to_cartesian(magnitude, angle))
    }

    /// First ball outside the arena, if any
    fn first_out_of_bounds(&self) -> Option<usize> {
        self.bodies
            .iter()
            .find(|b| !is_in_bounds(b.pos, self.size))
            .map(|b| b.id)
    }

    fn complete(&mut self, completion: Completion) -> Completion {
        self.phase = RunPhase::Completed(completion);
        completion
    }

    /// Run the trial. Callable once, after every ball has been launched.
    ///
    /// Captures initial features, steps `step_limit` times capturing midpoint
    /// features before step `step_limit / 2`, then captures final features.
    /// A ball outside the arena at the midpoint ends the run immediately; one
    /// outside at the end invalidates it. Neither is an error.
    pub fn run(&mut self) -> Result<Completion, SimError> {
        match self.phase {
            RunPhase::Populated => {}
            RunPhase::Running | RunPhase::Completed(_) => return Err(SimError::AlreadyRun),
            phase => {
                return Err(SimError::WrongPhase {
                    operation: "run",
                    phase,
                });
            }
        }
        if let Some(body) = self.bodies.iter().find(|b| !b.impulse_applied) {
            return Err(SimError::MissingImpulse(body.id));
        }
        self.phase = RunPhase::Running;

        let initial = FeatureRecord::capture_all(&self.bodies, self.size);
        let midpoint_step = self.midpoint_step();
        let mut midpoint = Vec::new();

        while self.step < self.step_limit {
            if self.step == midpoint_step {
                midpoint = FeatureRecord::capture_all(&self.bodies, self.size);
                if let Some(body) = self.first_out_of_bounds() {
                    return Ok(self.complete(Completion::Invalid {
                        checkpoint: Checkpoint::Midpoint,
                        body,
                    }));
                }
            }
            step(&mut self.bodies, &self.walls, self.dt);
            self.step += 1;
        }

        let final_state = FeatureRecord::capture_all(&self.bodies, self.size);
        if let Some(body) = self.first_out_of_bounds() {
            return Ok(self.complete(Completion::Invalid {
                checkpoint: Checkpoint::Final,
                body,
            }));
        }

        self.table = Some(TrialTable::join(self.step_limit, initial, midpoint, final_state));
        Ok(self.complete(Completion::Valid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const SIZE: DVec2 = DVec2::new(100.0, 100.0);

    fn single_ball_arena(steps: u32, vel: DVec2) -> Arena {
        let mut arena = Arena::new(steps, 0.01, SIZE).unwrap();
        let id = arena.add_ball(DVec2::new(50.0, 50.0)).unwrap();
        arena.apply_impulse(id, vel * BALL_MASS).unwrap();
        arena
    }

    #[test]
    fn test_new_rejects_bad_parameters() {
        assert!(matches!(Arena::new(0, 0.01, SIZE), Err(SimError::InvalidArena(_))));
        assert!(matches!(Arena::new(10, 0.0, SIZE), Err(SimError::InvalidArena(_))));
        assert!(matches!(Arena::new(10, f64::NAN, SIZE), Err(SimError::InvalidArena(_))));
        assert!(matches!(
            Arena::new(10, 0.01, DVec2::new(100.0, -1.0)),
            Err(SimError::InvalidArena(_))
        ));
    }

    #[test]
    fn test_end_to_end_single_ball() {
        let mut arena = single_ball_arena(4, DVec2::new(10.0, 0.0));
        assert_eq!(arena.run(), Ok(Completion::Valid));
        assert_eq!(arena.steps_taken(), 4);

        let table = arena.table().unwrap();
        assert_eq!(table.step_limit, 4);
        assert_eq!(table.midpoint_step, 2);
        let row = &table.rows[0];
        assert_eq!(row.id, 0);
        assert_eq!(row.initial.pos, DVec2::new(50.0, 50.0));
        assert!((row.midpoint.pos - DVec2::new(50.2, 50.0)).length() < 1e-9);
        assert!((row.final_state.pos - DVec2::new(50.4, 50.0)).length() < 1e-9);
        assert!((row.label() - DVec2::new(50.4, 50.0)).length() < 1e-9);
        for rec in [&row.initial, &row.midpoint, &row.final_state] {
            assert_eq!(rec.angle, 0.0);
            assert_eq!(rec.speed, 10.0);
            assert_eq!(rec.vel, DVec2::new(10.0, 0.0));
        }
        assert!((row.midpoint.walls.right - 49.8).abs() < 1e-9);
    }

    #[test]
    fn test_escape_before_midpoint_is_invalid() {
        let mut arena = single_ball_arena(500, DVec2::new(10000.0, 0.0));
        let completion = arena.run().unwrap();
        assert_eq!(
            completion,
            Completion::Invalid {
                checkpoint: Checkpoint::Midpoint,
                body: 0
            }
        );
        // No stepping past the midpoint
        assert_eq!(arena.steps_taken(), 250);
        assert!(arena.table().is_none());
        assert_eq!(arena.phase(), RunPhase::Completed(completion));
    }

    #[test]
    fn test_escape_after_midpoint_is_invalid_at_final() {
        // Starts near the right wall and leaves within one step
        let mut arena = Arena::new(1, 0.01, SIZE).unwrap();
        let id = arena.add_ball(DVec2::new(99.0, 50.0)).unwrap();
        arena.apply_impulse(id, DVec2::new(1000.0, 0.0)).unwrap();
        assert_eq!(
            arena.run(),
            Ok(Completion::Invalid {
                checkpoint: Checkpoint::Final,
                body: 0
            })
        );
        assert_eq!(arena.steps_taken(), 1);
    }

    #[test]
    fn test_single_step_midpoint_equals_initial() {
        let mut arena = single_ball_arena(1, DVec2::new(10.0, 0.0));
        assert!(arena.run().unwrap().is_valid());
        let row = &arena.table().unwrap().rows[0];
        assert_eq!(row.initial, row.midpoint);
    }

    #[test]
    fn test_run_twice_is_an_error() {
        let mut arena = single_ball_arena(4, DVec2::new(10.0, 0.0));
        arena.run().unwrap();
        assert_eq!(arena.run(), Err(SimError::AlreadyRun));
    }

    #[test]
    fn test_run_requires_balls_and_impulses() {
        let mut empty = Arena::new(4, 0.01, SIZE).unwrap();
        assert!(matches!(empty.run(), Err(SimError::WrongPhase { .. })));

        let mut arena = Arena::new(4, 0.01, SIZE).unwrap();
        arena.add_ball(DVec2::new(20.0, 20.0)).unwrap();
        arena.add_ball(DVec2::new(70.0, 70.0)).unwrap();
        arena.apply_impulse(0, DVec2::X).unwrap();
        assert_eq!(arena.run(), Err(SimError::MissingImpulse(1)));
        // Failed precondition leaves the arena runnable
        assert_eq!(arena.phase(), RunPhase::Populated);
    }

    #[test]
    fn test_impulse_once_per_ball() {
        let mut arena = Arena::new(4, 0.01, SIZE).unwrap();
        arena.add_ball(DVec2::new(20.0, 20.0)).unwrap();
        arena.apply_impulse(0, DVec2::X).unwrap();
        assert_eq!(
            arena.apply_impulse(0, DVec2::X),
            Err(SimError::ImpulseAlreadyApplied(0))
        );
        assert_eq!(
            arena.apply_impulse(3, DVec2::X),
            Err(SimError::BodyOutOfRange { index: 3, count: 1 })
        );
    }

    #[test]
    fn test_impulse_scales_with_mass() {
        let mut arena = Arena::new(4, 0.01, SIZE).unwrap();
        let id = arena.add_ball_with(DVec2::new(50.0, 50.0), 4.0, 2.0).unwrap();
        arena.apply_impulse(id, DVec2::new(8.0, -4.0)).unwrap();
        assert_eq!(arena.bodies()[id].vel, DVec2::new(2.0, -1.0));
    }

    #[test]
    fn test_body_momentum() {
        let mut body = Body::new(0, DVec2::ZERO, 2.5, 1.0);
        body.vel = DVec2::new(4.0, -2.0);
        assert_eq!(body.momentum(), DVec2::new(10.0, -5.0));
        assert_eq!(body.kinetic_energy(), 25.0);
    }

    #[test]
    fn test_no_changes_after_completion() {
        let mut arena = single_ball_arena(2, DVec2::new(1.0, 0.0));
        arena.run().unwrap();
        assert!(matches!(
            arena.add_ball(DVec2::new(1.0, 1.0)),
            Err(SimError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_populate_random_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut arena = Arena::new(10, 0.01, DVec2::new(40.0, 20.0)).unwrap();
        arena.populate_random(25, &mut rng).unwrap();
        assert_eq!(arena.bodies().len(), 25);
        for (i, body) in arena.bodies().iter().enumerate() {
            assert_eq!(body.id, i);
            assert!(is_in_bounds(body.pos, arena.size()));
            assert_eq!(body.radius, BALL_RADIUS);
        }
    }

    #[test]
    fn test_push_random_ball_speed_matches_magnitude() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut arena = Arena::new(10, 0.01, SIZE).unwrap();
        arena.populate_random(3, &mut rng).unwrap();
        for i in 0..3 {
            arena.push_random_ball(42.0, i, &mut rng).unwrap();
        }
        for body in arena.bodies() {
            assert!((body.vel.length() - 42.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let build = || {
            let mut rng = Pcg32::seed_from_u64(2024);
            let mut arena = Arena::new(300, 0.01, SIZE).unwrap();
            arena.populate_random(4, &mut rng).unwrap();
            for i in 0..4 {
                arena.push_random_ball(80.0, i, &mut rng).unwrap();
            }
            let completion = arena.run().unwrap();
            (completion, arena)
        };
        let (c1, a1) = build();
        let (c2, a2) = build();
        assert_eq!(c1, c2);
        assert_eq!(a1.bodies(), a2.bodies());
        assert_eq!(a1.table(), a2.table());
    }
}
