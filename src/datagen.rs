//! Trial orchestration
//!
//! Produces valid trials one at a time: each attempt draws a step count, places
//! and launches the balls, and runs the arena. Attempts where a ball escapes
//! are discarded and retried without advancing the trial counter.

use rand::Rng;

use crate::error::DataGenError;
use crate::settings::Settings;
use crate::sim::{Arena, Completion, TrialTable};

/// One valid trial
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    /// 1-based trial number
    pub number: usize,
    /// Steps the arena ran for
    pub steps: u32,
    pub table: TrialTable,
}

/// Attempt counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Valid trials produced
    pub produced: usize,
    /// Arenas run, valid or not
    pub attempts: usize,
    /// Arenas discarded because a ball escaped
    pub discarded: usize,
}

/// Generates randomized trials from [`Settings`] and an explicit RNG
#[derive(Debug)]
pub struct TrialGenerator<R> {
    settings: Settings,
    rng: R,
    stats: GenerationStats,
}

impl<R: Rng> TrialGenerator<R> {
    /// Validate settings and take ownership of the RNG
    pub fn new(settings: Settings, rng: R) -> Result<Self, DataGenError> {
        settings.validate()?;
        Ok(Self {
            settings,
            rng,
            stats: GenerationStats::default(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> GenerationStats {
        self.stats
    }

    /// Valid trials still to produce
    pub fn remaining(&self) -> usize {
        self.settings.total_trials.saturating_sub(self.stats.produced)
    }

    /// Build one randomized, launched arena
    fn build_arena(&mut self) -> Result<Arena, DataGenError> {
        let s = &self.settings;
        let steps = self.rng.random_range(s.min_steps..s.max_steps);
        let mut arena = Arena::new(steps, s.time_delta, s.arena_size.as_vec())?;
        arena.populate_random_with(s.ball_count, s.ball_mass, s.ball_radius, &mut self.rng)?;
        for i in 0..s.ball_count {
            let magnitude = self.rng.random::<f64>() * s.max_impulse;
            arena.push_random_ball(magnitude, i, &mut self.rng)?;
        }
        Ok(arena)
    }

    /// Run arenas until one stays in bounds
    pub fn next_trial(&mut self) -> Result<Trial, DataGenError> {
        if self.remaining() == 0 {
            return Err(DataGenError::Exhausted(self.settings.total_trials));
        }
        let interval = self.settings.progress_interval;
        if interval > 0 && self.stats.produced % interval == 0 {
            log::info!("Performing trial {}", self.stats.produced);
        }

        loop {
            let mut arena = self.build_arena()?;
            self.stats.attempts += 1;
            let completion = arena.run()?;
            let steps = arena.step_limit();

            if let Completion::Invalid { checkpoint, body } = completion {
                self.stats.discarded += 1;
                log::debug!(
                    "Discarding {steps}-step attempt: ball {body} out of bounds at {checkpoint:?}"
                );
                continue;
            }

            if let Some(table) = arena.into_table() {
                self.stats.produced += 1;
                log::trace!("Trial {} valid after {steps} steps", self.stats.produced);
                return Ok(Trial {
                    number: self.stats.produced,
                    steps,
                    table,
                });
            }
        }
    }
}

impl<R: Rng> Iterator for TrialGenerator<R> {
    type Item = Result<Trial, DataGenError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == 0 {
            return None;
        }
        Some(self.next_trial())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::sim::is_in_bounds;
    use glam::DVec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn small_settings() -> Settings {
        Settings {
            total_trials: 12,
            min_steps: 1,
            max_steps: 60,
            ball_count: 3,
            ..Settings::default()
        }
    }

    #[test]
    fn test_generates_requested_trials() {
        let settings = small_settings();
        let generator = TrialGenerator::new(settings, Pcg32::seed_from_u64(1)).unwrap();
        let trials: Vec<Trial> = generator.map(Result::unwrap).collect();

        assert_eq!(trials.len(), 12);
        for (i, trial) in trials.iter().enumerate() {
            assert_eq!(trial.number, i + 1);
            assert!((1..60).contains(&trial.steps));
            assert_eq!(trial.table.step_limit, trial.steps);
            assert_eq!(trial.table.midpoint_step, trial.steps / 2);
            assert_eq!(trial.table.len(), 3);
            for row in &trial.table.rows {
                assert!(is_in_bounds(row.midpoint.pos, DVec2::new(100.0, 100.0)));
                assert!(is_in_bounds(row.label(), DVec2::new(100.0, 100.0)));
            }
        }
    }

    #[test]
    fn test_same_seed_same_trials() {
        let a: Vec<Trial> = TrialGenerator::new(small_settings(), Pcg32::seed_from_u64(77))
            .unwrap()
            .map(Result::unwrap)
            .collect();
        let b: Vec<Trial> = TrialGenerator::new(small_settings(), Pcg32::seed_from_u64(77))
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_escapes_are_retried() {
        // Impulses this large tunnel through the walls in a single step, so
        // most attempts are discarded
        let settings = Settings {
            total_trials: 3,
            min_steps: 2,
            max_steps: 40,
            max_impulse: 20_000.0,
            ..Settings::default()
        };
        let mut generator = TrialGenerator::new(settings, Pcg32::seed_from_u64(5)).unwrap();
        while generator.remaining() > 0 {
            generator.next_trial().unwrap();
        }
        let stats = generator.stats();
        assert_eq!(stats.produced, 3);
        assert_eq!(stats.attempts, stats.produced + stats.discarded);
        assert!(stats.discarded > 0);
    }

    #[test]
    fn test_exhausted_generator() {
        let settings = Settings {
            total_trials: 1,
            ..small_settings()
        };
        let mut generator = TrialGenerator::new(settings, Pcg32::seed_from_u64(3)).unwrap();
        generator.next_trial().unwrap();
        assert!(generator.next().is_none());
        assert!(matches!(generator.next_trial(), Err(DataGenError::Exhausted(1))));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings {
            max_steps: 1,
            ..Settings::default()
        };
        match TrialGenerator::new(settings, Pcg32::seed_from_u64(0)) {
            Err(DataGenError::Config(ConfigError::Invalid { field, .. })) => {
                assert_eq!(field, "max_steps")
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
