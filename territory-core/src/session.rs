//! Session state and turn resolution
//!
//! A [`Session`] is everything that lives for one game: the grid, per-side
//! counters, whose turn it is, the player's in-progress impulse selection
//! and the AI delay timer. Every mutating operation either applies fully
//! or returns a [`Rejection`] and leaves the session untouched.

use serde::{Deserialize, Serialize};

use crate::ai::{AiAction, CoinFlipAi};
use crate::config::EngineConfig;
use crate::error::{ConfigError, Rejection};
use crate::grid::{Cell, CellState, Grid, GridSize, Side};
use crate::impulse::{ImpulseKind, ImpulseMode, ImpulseSelection};
use crate::random::RandomSource;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    PlayerWins,
    AiWins,
    Draw,
}

/// Signals for the driver to map onto sound and visual feedback
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Ordinary capture of a neutral cell
    Captured { side: Side, cell: Cell },
    /// Player entered impulse selection
    ImpulseStarted(ImpulseKind),
    /// Player picked an impulse target, more are needed
    TargetSelected {
        cell: Cell,
        selected: usize,
        needed: usize,
    },
    /// Impulse applied to the board
    ImpulseResolved {
        side: Side,
        kind: ImpulseKind,
        cells: Vec<Cell>,
    },
    /// Player left impulse selection without spending anything
    ImpulseCancelled(ImpulseKind),
    /// AI had nothing to do this turn
    AiPassed,
    GameEnded(GameResult),
}

// ============================================================================
// SESSION
// ============================================================================

/// One game from start position to result
#[derive(Clone, Debug)]
pub struct Session {
    config: EngineConfig,
    ai: CoinFlipAi,
    grid: Grid,

    player_cells: usize,
    ai_cells: usize,
    player_charges: u32,
    ai_charges: u32,

    turn: Side,
    result: GameResult,
    impulse: Option<ImpulseSelection>,

    /// Seconds accumulated since the AI turn began
    ai_timer: f32,
    /// Resolved actions (both sides, passes included)
    turns: u32,
}

impl Session {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Fresh session from the starting layout
    pub fn new(size: GridSize, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_grid(Grid::starting(size), config))
    }

    /// Session over an arbitrary grid, counts derived from its cells.
    /// `config` must already be validated.
    pub(crate) fn from_grid(grid: Grid, config: EngineConfig) -> Self {
        let session = Self {
            ai: CoinFlipAi::new(config.attack_probability),
            player_cells: grid.count(CellState::Player),
            ai_cells: grid.count(CellState::Ai),
            grid,
            config,
            player_charges: 0,
            ai_charges: 0,
            turn: Side::Player,
            result: GameResult::Ongoing,
            impulse: None,
            ai_timer: 0.0,
            turns: 0,
        };
        session.check_invariants();
        session
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cells(&self, side: Side) -> usize {
        match side {
            Side::Player => self.player_cells,
            Side::Ai => self.ai_cells,
        }
    }

    pub fn charges(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_charges,
            Side::Ai => self.ai_charges,
        }
    }

    pub fn neutral_cells(&self) -> usize {
        self.grid.size().total_cells() - self.player_cells - self.ai_cells
    }

    /// Side to move
    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn is_player_turn(&self) -> bool {
        self.turn == Side::Player
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn impulse_mode(&self) -> ImpulseMode {
        self.impulse
            .as_ref()
            .map_or(ImpulseMode::None, |sel| sel.kind().into())
    }

    /// Targets picked so far in the active impulse
    pub fn selection(&self) -> &[Cell] {
        match &self.impulse {
            Some(sel) => sel.cells(),
            None => &[],
        }
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn target_cells(&self) -> usize {
        self.config.target_cells(self.grid.size())
    }

    pub fn can_afford_impulse(&self, side: Side) -> bool {
        self.charges(side) >= self.config.impulse_cost
    }

    // ========================================================================
    // MOVE RULES
    // ========================================================================

    /// A neutral cell bordering at least one cell of `side`
    pub fn is_valid_move(&self, cell: Cell, side: Side) -> bool {
        self.grid.get(cell) == Some(CellState::Neutral) && self.grid.borders(cell, side)
    }

    /// Every legal ordinary capture for `side`, row-major
    pub fn legal_captures(&self, side: Side) -> Vec<Cell> {
        ImpulseKind::Speed.valid_targets(&self.grid, side)
    }

    /// False once the player is boxed in: no legal capture and no affordable
    /// impulse with enough targets to resolve.
    pub fn player_has_move(&self) -> bool {
        if !self.legal_captures(Side::Player).is_empty() {
            return true;
        }
        // Speed targets are exactly the legal captures, so only Attack remains
        let attack = ImpulseKind::Attack;
        self.can_afford_impulse(Side::Player)
            && attack.valid_targets(&self.grid, Side::Player).len() >= attack.target_count()
    }

    // ========================================================================
    // PLAYER ACTIONS
    // ========================================================================

    /// Ordinary capture at driver coordinates
    pub fn attempt_player_capture(&mut self, x: i64, y: i64) -> Result<GameEvent, Rejection> {
        self.ensure_player_can_act()?;
        if self.impulse.is_some() {
            return Err(Rejection::ImpulseActive);
        }
        let cell = self.grid.cell_at(x, y)?;
        if !self.is_valid_move(cell, Side::Player) {
            return Err(Rejection::IllegalCapture);
        }

        self.capture(cell, Side::Player);
        tracing::debug!(x = cell.x, y = cell.y, "player captured cell");
        self.pass_turn();
        Ok(GameEvent::Captured {
            side: Side::Player,
            cell,
        })
    }

    /// Begin picking targets for an impulse
    pub fn enter_impulse_mode(&mut self, kind: ImpulseKind) -> Result<GameEvent, Rejection> {
        self.ensure_player_can_act()?;
        if self.impulse.is_some() {
            return Err(Rejection::ImpulseActive);
        }
        if !self.can_afford_impulse(Side::Player) {
            return Err(Rejection::InsufficientCharges {
                kind,
                needed: self.config.impulse_cost,
                available: self.player_charges,
            });
        }

        self.impulse = Some(ImpulseSelection::new(kind));
        tracing::debug!(?kind, "player entered impulse mode");
        Ok(GameEvent::ImpulseStarted(kind))
    }

    /// Add one target; the impulse resolves once enough are picked
    pub fn select_impulse_target(&mut self, x: i64, y: i64) -> Result<GameEvent, Rejection> {
        self.ensure_player_can_act()?;
        let cell = self.grid.cell_at(x, y)?;
        let selection = self.impulse.as_mut().ok_or(Rejection::NoImpulseActive)?;

        let selected = selection.select(&self.grid, cell, Side::Player)?;
        if !selection.is_complete() {
            return Ok(GameEvent::TargetSelected {
                cell,
                selected,
                needed: selection.kind().target_count(),
            });
        }

        let Some(selection) = self.impulse.take() else {
            return Err(Rejection::NoImpulseActive);
        };
        let kind = selection.kind();
        let cells = selection.into_cells();
        self.apply_impulse(Side::Player, kind, &cells);
        self.pass_turn();
        Ok(GameEvent::ImpulseResolved {
            side: Side::Player,
            kind,
            cells,
        })
    }

    /// Abandon the active impulse; nothing is spent and the turn stays
    pub fn cancel_impulse(&mut self) -> Result<GameEvent, Rejection> {
        self.ensure_player_can_act()?;
        let selection = self.impulse.take().ok_or(Rejection::NoImpulseActive)?;
        tracing::debug!(kind = ?selection.kind(), "player cancelled impulse");
        Ok(GameEvent::ImpulseCancelled(selection.kind()))
    }

    fn ensure_player_can_act(&self) -> Result<(), Rejection> {
        if self.result != GameResult::Ongoing {
            return Err(Rejection::GameOver);
        }
        if self.turn != Side::Player {
            return Err(Rejection::NotYourTurn);
        }
        Ok(())
    }

    // ========================================================================
    // AI TURN
    // ========================================================================

    /// Advance the AI delay timer by `dt` seconds, acting once it expires.
    ///
    /// Returns the events produced this frame (empty while waiting).
    pub fn tick<R: RandomSource + ?Sized>(&mut self, dt: f32, rng: &mut R) -> Vec<GameEvent> {
        if self.result != GameResult::Ongoing || self.turn != Side::Ai {
            return Vec::new();
        }

        if dt.is_finite() && dt > 0.0 {
            self.ai_timer += dt;
        }
        if self.ai_timer < self.config.ai_delay_secs {
            return Vec::new();
        }

        let mut events = vec![self.play_ai_turn(rng)];
        self.pass_turn();
        if let Some(result) = self.check_win_condition() {
            events.push(GameEvent::GameEnded(result));
        }
        events
    }

    fn play_ai_turn<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> GameEvent {
        let action = self
            .ai
            .decide(&self.grid, self.ai_charges, self.config.impulse_cost, rng);

        match action {
            AiAction::Capture(cell) => {
                self.capture(cell, Side::Ai);
                tracing::debug!(x = cell.x, y = cell.y, "AI captured cell");
                GameEvent::Captured {
                    side: Side::Ai,
                    cell,
                }
            }
            AiAction::Impulse { kind, cells } => {
                self.apply_impulse(Side::Ai, kind, &cells);
                GameEvent::ImpulseResolved {
                    side: Side::Ai,
                    kind,
                    cells,
                }
            }
            AiAction::Pass => {
                tracing::debug!("AI passed");
                GameEvent::AiPassed
            }
        }
    }

    // ========================================================================
    // STATE MUTATION
    // ========================================================================

    /// Ordinary capture: one cell plus one charge
    fn capture(&mut self, cell: Cell, side: Side) {
        self.claim(cell, side);
        *self.charges_mut(side) += 1;
        self.check_invariants();
    }

    /// Claim every cell and debit the impulse cost; no charges are earned
    fn apply_impulse(&mut self, side: Side, kind: ImpulseKind, cells: &[Cell]) {
        for &cell in cells {
            self.claim(cell, side);
        }
        let cost = self.config.impulse_cost;
        let charges = self.charges_mut(side);
        *charges = charges.saturating_sub(cost);

        tracing::debug!(?side, ?kind, claimed = cells.len(), "impulse resolved");
        self.check_invariants();
    }

    /// Set ownership and keep both cell counters in step
    fn claim(&mut self, cell: Cell, side: Side) {
        let Some(previous) = self.grid.get(cell) else {
            return;
        };
        match previous.owner() {
            Some(owner) if owner == side => return,
            Some(owner) => *self.cells_mut(owner) -= 1,
            None => {}
        }
        *self.cells_mut(side) += 1;
        self.grid.set(cell, side.cell_state());
    }

    fn pass_turn(&mut self) {
        self.turn = self.turn.opponent();
        self.turns += 1;
        if self.turn == Side::Ai {
            self.ai_timer = 0.0;
        }
    }

    fn cells_mut(&mut self, side: Side) -> &mut usize {
        match side {
            Side::Player => &mut self.player_cells,
            Side::Ai => &mut self.ai_cells,
        }
    }

    fn charges_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Player => &mut self.player_charges,
            Side::Ai => &mut self.ai_charges,
        }
    }

    // ========================================================================
    // WIN CONDITION
    // ========================================================================

    /// Compare both sides against the target. Sets the result once; a result
    /// already in place is never overwritten.
    fn check_win_condition(&mut self) -> Option<GameResult> {
        if self.result != GameResult::Ongoing {
            return None;
        }

        let result = evaluate_result(self.player_cells, self.ai_cells, self.target_cells());
        if result == GameResult::Ongoing {
            return None;
        }

        tracing::info!(
            ?result,
            player_cells = self.player_cells,
            ai_cells = self.ai_cells,
            turns = self.turns,
            "game ended"
        );
        self.result = result;
        Some(result)
    }

    /// Cell counters agree with the grid
    pub fn counts_consistent(&self) -> bool {
        self.player_cells == self.grid.count(CellState::Player)
            && self.ai_cells == self.grid.count(CellState::Ai)
    }

    fn check_invariants(&self) {
        debug_assert!(self.counts_consistent(), "cell counters out of sync with grid");
    }
}

/// Result for the given counts against `target`
pub fn evaluate_result(player_cells: usize, ai_cells: usize, target: usize) -> GameResult {
    match (player_cells >= target, ai_cells >= target) {
        (true, true) => GameResult::Draw,
        (true, false) => GameResult::PlayerWins,
        (false, true) => GameResult::AiWins,
        (false, false) => GameResult::Ongoing,
    }
}

// ============================================================================
// TESTS
// ============================================================================
