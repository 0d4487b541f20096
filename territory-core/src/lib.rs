//! TERRITORY Core - Game engine and AI
//!
//! This crate provides the core logic for the territory game:
//! - Square grid geometry with 4-connected adjacency
//! - Capture rules and the Attack/Speed impulses
//! - Session state and turn resolution
//! - Coin-flip AI driven by an injectable randomness source
//! - Menu/playing/game-over facade for frontends

pub mod grid;
pub mod error;
pub mod config;
pub mod random;
pub mod impulse;
pub mod ai;
pub mod session;
pub mod game;
pub mod snapshot;

// Re-exports for convenient access
pub use grid::{Cell, CellState, Grid, GridSize, Side, DIRECTIONS};
pub use error::{ConfigError, Rejection};
pub use config::{EngineConfig, AI_DELAY_SECS, ATTACK_PROBABILITY, IMPULSE_COST, WIN_PERCENTAGE};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use impulse::{ImpulseKind, ImpulseMode, ImpulseSelection};
pub use ai::{AiAction, CoinFlipAi};
pub use session::{evaluate_result, GameEvent, GameResult, Session};
pub use game::{Game, Phase};
pub use snapshot::{SideView, Snapshot};
