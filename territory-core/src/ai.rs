//! Scripted coin-flip AI

use serde::{Deserialize, Serialize};

use crate::config::ATTACK_PROBABILITY;
use crate::grid::{Cell, Grid, Side};
use crate::impulse::ImpulseKind;
use crate::random::RandomSource;

/// What the AI decided to do this turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiAction {
    /// Ordinary capture of one neutral cell
    Capture(Cell),
    /// Impulse claiming one or more cells
    Impulse { kind: ImpulseKind, cells: Vec<Cell> },
    /// Nothing to do; the turn still passes
    Pass,
}

/// AI player: spends charges on a random impulse whenever it can,
/// otherwise captures a random legal cell.
#[derive(Clone, Debug)]
pub struct CoinFlipAi {
    attack_probability: f64,
}

impl Default for CoinFlipAi {
    fn default() -> Self {
        Self {
            attack_probability: ATTACK_PROBABILITY,
        }
    }
}

impl CoinFlipAi {
    pub fn new(attack_probability: f64) -> Self {
        Self { attack_probability }
    }

    /// Pick this turn's action. The impulse coin is flipped at most once.
    pub fn decide<R: RandomSource + ?Sized>(
        &self,
        grid: &Grid,
        charges: u32,
        impulse_cost: u32,
        rng: &mut R,
    ) -> AiAction {
        if charges >= impulse_cost {
            let kind = self.pick_impulse(rng);
            let cells = impulse_targets(grid, kind, rng);
            if cells.is_empty() {
                return AiAction::Pass;
            }
            return AiAction::Impulse { kind, cells };
        }

        match capture_target(grid, rng) {
            Some(cell) => AiAction::Capture(cell),
            None => AiAction::Pass,
        }
    }

    fn pick_impulse<R: RandomSource + ?Sized>(&self, rng: &mut R) -> ImpulseKind {
        if rng.chance(self.attack_probability) {
            ImpulseKind::Attack
        } else {
            ImpulseKind::Speed
        }
    }
}

/// Uniformly random legal capture for the AI
pub fn capture_target<R: RandomSource + ?Sized>(grid: &Grid, rng: &mut R) -> Option<Cell> {
    let moves = ImpulseKind::Speed.valid_targets(grid, Side::Ai);
    if moves.is_empty() {
        return None;
    }
    Some(moves[rng.next_index(moves.len())])
}

/// Shuffled valid targets, truncated to what the impulse claims
pub fn impulse_targets<R: RandomSource + ?Sized>(
    grid: &Grid,
    kind: ImpulseKind,
    rng: &mut R,
) -> Vec<Cell> {
    let mut targets = kind.valid_targets(grid, Side::Ai);
    rng.shuffle(&mut targets);
    targets.truncate(kind.target_count());
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellState, GridSize};
    use crate::random::{ScriptedRandom, SeededRandom};

    #[test]
    fn test_capture_when_poor() {
        let grid = Grid::starting(GridSize::Small);
        // AI at (6,6): legal targets (6,5) then (5,6) in row-major order
        let mut rng = ScriptedRandom::new().with_indices([1]);
        let action = CoinFlipAi::default().decide(&grid, 2, 3, &mut rng);
        assert_eq!(action, AiAction::Capture(Cell::new(5, 6)));
        assert_eq!(rng.coin_flips(), 0);
    }

    #[test]
    fn test_pass_when_boxed_in() {
        let mut grid = Grid::starting(GridSize::Small);
        grid.set(Cell::new(6, 5), CellState::Player);
        grid.set(Cell::new(5, 6), CellState::Player);
        let mut rng = ScriptedRandom::new();
        let action = CoinFlipAi::default().decide(&grid, 0, 3, &mut rng);
        assert_eq!(action, AiAction::Pass);
    }

    #[test]
    fn test_single_coin_flip_per_decision() {
        let grid = Grid::starting(GridSize::Small);
        let mut rng = ScriptedRandom::new().with_coins([false]);
        let action = CoinFlipAi::default().decide(&grid, 3, 3, &mut rng);
        assert_eq!(rng.coin_flips(), 1);
        match action {
            AiAction::Impulse { kind, cells } => {
                assert_eq!(kind, ImpulseKind::Speed);
                assert_eq!(cells.len(), 2); // only two legal cells exist
            }
            other => panic!("expected speed impulse, got {other:?}"),
        }
    }

    #[test]
    fn test_attack_without_border_passes() {
        let grid = Grid::starting(GridSize::Small);
        let mut rng = ScriptedRandom::new().with_coins([true]);
        let action = CoinFlipAi::default().decide(&grid, 5, 3, &mut rng);
        assert_eq!(action, AiAction::Pass);
        assert_eq!(rng.coin_flips(), 1);
    }

    #[test]
    fn test_probability_picks_the_impulse() {
        let mut grid = Grid::starting(GridSize::Small);
        for x in 0..7 {
            grid.set(Cell::new(x, 3), CellState::Player);
            grid.set(Cell::new(x, 4), CellState::Ai);
        }
        let mut rng = SeededRandom::from_seed(3);
        for _ in 0..20 {
            let always_attack = CoinFlipAi::new(1.0).decide(&grid, 3, 3, &mut rng);
            assert!(matches!(
                always_attack,
                AiAction::Impulse { kind: ImpulseKind::Attack, .. }
            ));
            let never_attack = CoinFlipAi::new(0.0).decide(&grid, 3, 3, &mut rng);
            assert!(matches!(
                never_attack,
                AiAction::Impulse { kind: ImpulseKind::Speed, .. }
            ));
        }
    }

    #[test]
    fn test_attack_takes_at_most_two() {
        let mut grid = Grid::starting(GridSize::Small);
        for x in 0..7 {
            grid.set(Cell::new(x, 3), CellState::Player);
            grid.set(Cell::new(x, 4), CellState::Ai);
        }
        let mut rng = ScriptedRandom::new().with_coins([true]).reversing();
        let action = CoinFlipAi::default().decide(&grid, 3, 3, &mut rng);
        assert_eq!(
            action,
            AiAction::Impulse {
                kind: ImpulseKind::Attack,
                cells: vec![Cell::new(6, 3), Cell::new(5, 3)],
            }
        );
    }
}
