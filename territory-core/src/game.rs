//! Game facade: menu/playing/game-over state machine driven by a frontend
//!
//! The driver forwards discrete intents (clicks, impulse keys) and one
//! `tick(dt)` per frame. Events produced along the way are queued until
//! the driver calls [`Game::drain_events`].

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{ConfigError, Rejection};
use crate::grid::{Grid, GridSize};
use crate::impulse::ImpulseKind;
use crate::random::{RandomSource, SeededRandom};
use crate::session::{GameEvent, GameResult, Session};
use crate::snapshot::Snapshot;

/// Top-level screen state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Menu,
    Playing,
    GameOver,
}

/// Owns the current session, the shared RNG and the pending event queue
#[derive(Debug)]
pub struct Game<R: RandomSource = SeededRandom> {
    config: EngineConfig,
    phase: Phase,
    session: Option<Session>,
    rng: R,
    events: Vec<GameEvent>,
}

impl<R: RandomSource> Game<R> {
    /// New game sitting at the menu. Fails if `config` does not validate.
    pub fn new(config: EngineConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: Phase::Menu,
            session: None,
            rng,
            events: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current or just-finished session; `None` at the menu
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Final result once the game is over
    pub fn result(&self) -> GameResult {
        self.session
            .as_ref()
            .map_or(GameResult::Ongoing, Session::result)
    }

    // ========================================================================
    // SESSION LIFECYCLE
    // ========================================================================

    /// Start a fresh session with a grid side of 7, 10 or 12
    pub fn start_session(&mut self, grid_side: usize) -> Result<(), Rejection> {
        if self.phase == Phase::Playing {
            return Err(Rejection::AlreadyPlaying);
        }
        let size = GridSize::try_from(grid_side)?;

        self.session = Some(Session::from_grid(Grid::starting(size), self.config.clone()));
        self.phase = Phase::Playing;
        self.events.clear();
        tracing::info!(grid = grid_side, "session started");
        Ok(())
    }

    /// Start with the configured default grid
    pub fn start_default_session(&mut self) -> Result<(), Rejection> {
        self.start_session(self.config.default_grid.side())
    }

    /// Leave the game-over screen, discarding the finished session
    pub fn return_to_menu(&mut self) -> Result<(), Rejection> {
        if self.phase != Phase::GameOver {
            return Err(Rejection::NotPlaying);
        }
        self.session = None;
        self.phase = Phase::Menu;
        self.events.clear();
        Ok(())
    }

    // ========================================================================
    // INBOUND INTENTS
    // ========================================================================

    pub fn attempt_player_capture(&mut self, x: i64, y: i64) -> Result<GameEvent, Rejection> {
        let event = self.playing_session()?.attempt_player_capture(x, y)?;
        Ok(self.record(event))
    }

    pub fn enter_impulse_mode(&mut self, kind: ImpulseKind) -> Result<GameEvent, Rejection> {
        let event = self.playing_session()?.enter_impulse_mode(kind)?;
        Ok(self.record(event))
    }

    pub fn select_impulse_target(&mut self, x: i64, y: i64) -> Result<GameEvent, Rejection> {
        let event = self.playing_session()?.select_impulse_target(x, y)?;
        Ok(self.record(event))
    }

    pub fn cancel_impulse(&mut self) -> Result<GameEvent, Rejection> {
        let event = self.playing_session()?.cancel_impulse()?;
        Ok(self.record(event))
    }

    /// Per-frame update. Does nothing outside `Playing`.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let events = session.tick(dt, &mut self.rng);
        if session.result() != GameResult::Ongoing {
            self.phase = Phase::GameOver;
        }
        self.events.extend(events.iter().cloned());
        events
    }

    // ========================================================================
    // OUTBOUND STATE
    // ========================================================================

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Frame view of the session, `None` at the menu
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.session
            .as_ref()
            .map(|session| Snapshot::capture(session, self.phase))
    }

    fn playing_session(&mut self) -> Result<&mut Session, Rejection> {
        match self.phase {
            Phase::Playing => self.session.as_mut().ok_or(Rejection::NotPlaying),
            Phase::GameOver => Err(Rejection::GameOver),
            Phase::Menu => Err(Rejection::NotPlaying),
        }
    }

    fn record(&mut self, event: GameEvent) -> GameEvent {
        self.events.push(event.clone());
        event
    }
}
