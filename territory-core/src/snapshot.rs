//! Read-only frame view for renderers

use serde::Serialize;

use crate::game::Phase;
use crate::grid::{Cell, CellState, Side};
use crate::impulse::ImpulseMode;
use crate::session::{GameResult, Session};

/// Per-side counters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SideView {
    pub cells: usize,
    pub charges: u32,
}

/// Everything a frontend needs to draw one frame
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub grid_size: usize,
    /// Cell states, top row first
    pub rows: Vec<Vec<CellState>>,
    pub player: SideView,
    pub ai: SideView,
    pub target_cells: usize,
    pub turn: Side,
    pub impulse_mode: ImpulseMode,
    pub selection: Vec<Cell>,
    /// Whether the player may start an impulse right now
    pub impulse_ready: bool,
    /// Cells to highlight as ordinary captures
    pub legal_captures: Vec<Cell>,
    /// False when the player is boxed in and can never act again
    pub player_has_move: bool,
    pub result: GameResult,
    pub turns: u32,
}

impl Snapshot {
    pub fn capture(session: &Session, phase: Phase) -> Self {
        let player_to_move = session.is_player_turn()
            && session.result() == GameResult::Ongoing
            && session.impulse_mode() == ImpulseMode::None;

        Self {
            phase,
            grid_size: session.grid().side(),
            rows: session.grid().rows().map(<[CellState]>::to_vec).collect(),
            player: SideView {
                cells: session.cells(Side::Player),
                charges: session.charges(Side::Player),
            },
            ai: SideView {
                cells: session.cells(Side::Ai),
                charges: session.charges(Side::Ai),
            },
            target_cells: session.target_cells(),
            turn: session.turn(),
            impulse_mode: session.impulse_mode(),
            selection: session.selection().to_vec(),
            impulse_ready: player_to_move && session.can_afford_impulse(Side::Player),
            legal_captures: if player_to_move {
                session.legal_captures(Side::Player)
            } else {
                Vec::new()
            },
            player_has_move: session.player_has_move(),
            result: session.result(),
            turns: session.turns(),
        }
    }

    pub fn cell(&self, cell: Cell) -> Option<CellState> {
        self.rows.get(cell.y).and_then(|row| row.get(cell.x)).copied()
    }
}
