//! Error types
//!
//! A `Rejection` is never fatal: it reports why an input was ignored and
//! guarantees the game state is exactly as it was before the call.

use thiserror::Error;

use crate::impulse::ImpulseKind;

/// Reason an inbound driver request had no effect
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: i64, y: i64 },

    #[error("it is not the player's turn")]
    NotYourTurn,

    #[error("cell is not neutral or has no adjacent friendly cell")]
    IllegalCapture,

    #[error("an impulse selection is already in progress")]
    ImpulseActive,

    #[error("no impulse selection is in progress")]
    NoImpulseActive,

    #[error("{kind:?} impulse needs {needed} charges, have {available}")]
    InsufficientCharges {
        kind: ImpulseKind,
        needed: u32,
        available: u32,
    },

    #[error("cell is not a valid {0:?} impulse target")]
    InvalidTarget(ImpulseKind),

    #[error("cell is already selected")]
    DuplicateTarget,

    #[error("the game has already ended")]
    GameOver,

    #[error("no game session is being played")]
    NotPlaying,

    #[error("a game session is already being played")]
    AlreadyPlaying,

    #[error("unsupported grid size {0} (expected 7, 10 or 12)")]
    UnsupportedGridSize(usize),
}

/// Invalid engine configuration
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("impulse cost must be at least 1")]
    ZeroImpulseCost,

    #[error("AI delay must be a finite, non-negative number of seconds (got {0})")]
    InvalidAiDelay(f32),

    #[error("win percentage must be within 1..=100 (got {0})")]
    InvalidWinPercentage(u32),

    #[error("attack probability must be within 0..=1 (got {0})")]
    InvalidAttackProbability(f64),
}
