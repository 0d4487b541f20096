//! Impulse special moves: target rules and the player's selection state

use serde::{Deserialize, Serialize};

use crate::error::Rejection;
use crate::grid::{Cell, CellState, Grid, Side};

/// Impulse variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpulseKind {
    /// Take enemy cells on the border
    Attack,
    /// Claim several neutral cells at once
    Speed,
}

impl ImpulseKind {
    /// Cells claimed by one impulse
    pub fn target_count(self) -> usize {
        match self {
            ImpulseKind::Attack => 2,
            ImpulseKind::Speed => 3,
        }
    }

    /// Whether `cell` can be claimed by `side` with this impulse.
    ///
    /// Attack: enemy cell bordering one of ours. Speed: neutral cell
    /// bordering one of ours (an ordinary legal capture).
    pub fn is_valid_target(self, grid: &Grid, cell: Cell, side: Side) -> bool {
        let wanted = match self {
            ImpulseKind::Attack => side.opponent().cell_state(),
            ImpulseKind::Speed => CellState::Neutral,
        };
        grid.get(cell) == Some(wanted) && grid.borders(cell, side)
    }

    /// Every valid target for `side`, row-major
    pub fn valid_targets(self, grid: &Grid, side: Side) -> Vec<Cell> {
        grid.iter()
            .map(|(cell, _)| cell)
            .filter(|&cell| self.is_valid_target(grid, cell, side))
            .collect()
    }
}

/// Active impulse mode as seen by drivers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpulseMode {
    #[default]
    None,
    Attack,
    Speed,
}

impl From<ImpulseKind> for ImpulseMode {
    fn from(kind: ImpulseKind) -> Self {
        match kind {
            ImpulseKind::Attack => ImpulseMode::Attack,
            ImpulseKind::Speed => ImpulseMode::Speed,
        }
    }
}

/// Targets picked so far during a player impulse
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpulseSelection {
    kind: ImpulseKind,
    cells: Vec<Cell>,
}

impl ImpulseSelection {
    pub fn new(kind: ImpulseKind) -> Self {
        Self {
            kind,
            cells: Vec::with_capacity(kind.target_count()),
        }
    }

    pub fn kind(&self) -> ImpulseKind {
        self.kind
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_complete(&self) -> bool {
        self.cells.len() >= self.kind.target_count()
    }

    /// Validate and record one target, returning the new selection size
    pub fn select(&mut self, grid: &Grid, cell: Cell, side: Side) -> Result<usize, Rejection> {
        if !self.kind.is_valid_target(grid, cell, side) {
            return Err(Rejection::InvalidTarget(self.kind));
        }
        if self.cells.contains(&cell) {
            return Err(Rejection::DuplicateTarget);
        }
        if !self.is_complete() {
            self.cells.push(cell);
        }
        Ok(self.cells.len())
    }

    /// Hand over the picked cells
    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}
