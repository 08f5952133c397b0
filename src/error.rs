//! Error types
//!
//! An invalid trial (a ball leaving the arena) is not an error: it is reported
//! as [`crate::sim::Completion::Invalid`]. Everything here is either a caller
//! bug or an environment failure.

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::RunPhase;

/// Arena lifecycle violations. These are programmer errors and should abort
/// the generator rather than be retried.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    /// Arena parameters out of range (zero steps, non-positive delta or size).
    #[error("invalid arena: {0}")]
    InvalidArena(String),

    /// Ball parameters out of range (non-positive mass or radius).
    #[error("invalid ball: {0}")]
    InvalidBall(String),

    /// Operation not permitted in the current lifecycle phase.
    #[error("cannot {operation} while arena is {phase:?}")]
    WrongPhase {
        /// Operation attempted.
        operation: &'static str,
        /// Phase the arena was in.
        phase: RunPhase,
    },

    /// `run()` was invoked on an arena that already ran.
    #[error("arena has already been run")]
    AlreadyRun,

    /// Body index does not name a body in this arena.
    #[error("no body with index {index} (arena holds {count})")]
    BodyOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of bodies present.
        count: usize,
    },

    /// A body received a second launch impulse.
    #[error("body {0} already received its impulse")]
    ImpulseAlreadyApplied(usize),

    /// A body was never launched before `run()`.
    #[error("body {0} has not received an impulse")]
    MissingImpulse(usize),
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A field holds a value outside its allowed range.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures writing trial tables.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode trial table: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write trial table: {0}")]
    Write(#[from] std::io::Error),
}

/// Failures surfaced by the trial orchestrator.
#[derive(Debug, Error)]
pub enum DataGenError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("simulation precondition violated: {0}")]
    Sim(#[from] SimError),

    /// Every requested trial has already been produced.
    #[error("all {0} trials have been generated")]
    Exhausted(usize),
}
