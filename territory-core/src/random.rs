//! Randomness source used by the AI
//!
//! All random decisions (uniform pick, shuffle, coin flip) go through
//! [`RandomSource`] so tests can substitute a scripted sequence.

use std::collections::VecDeque;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::grid::Cell;

/// Random decisions the engine needs
pub trait RandomSource {
    /// Uniform index in `0..upper`. `upper` is never zero.
    fn next_index(&mut self, upper: usize) -> usize;

    /// Shuffle cells in place
    fn shuffle(&mut self, cells: &mut [Cell]);

    /// Returns true with probability `p`
    fn chance(&mut self, p: f64) -> bool;
}

/// ChaCha-backed source, seeded once per game
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Seed if given, entropy otherwise
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::from_seed(s),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }

    fn shuffle(&mut self, cells: &mut [Cell]) {
        cells.shuffle(&mut self.rng);
    }

    fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }
}

/// Deterministic source replaying queued answers.
///
/// Shuffles leave the order untouched (or reverse it, see
/// [`ScriptedRandom::reversing`]). An exhausted queue yields 0 / false.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    indices: VecDeque<usize>,
    coins: VecDeque<bool>,
    reverse_shuffles: bool,
    coin_flips: usize,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indices(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.indices.extend(indices);
        self
    }

    pub fn with_coins(mut self, coins: impl IntoIterator<Item = bool>) -> Self {
        self.coins.extend(coins);
        self
    }

    /// Shuffles reverse the slice instead of keeping it as is
    pub fn reversing(mut self) -> Self {
        self.reverse_shuffles = true;
        self
    }

    /// Number of `chance` calls answered so far
    pub fn coin_flips(&self) -> usize {
        self.coin_flips
    }
}

impl RandomSource for ScriptedRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        self.indices.pop_front().unwrap_or(0).min(upper.saturating_sub(1))
    }

    fn shuffle(&mut self, cells: &mut [Cell]) {
        if self.reverse_shuffles {
            cells.reverse();
        }
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.coin_flips += 1;
        self.coins.pop_front().unwrap_or(false)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_index(&mut self, upper: usize) -> usize {
        (**self).next_index(upper)
    }

    fn shuffle(&mut self, cells: &mut [Cell]) {
        (**self).shuffle(cells)
    }

    fn chance(&mut self, p: f64) -> bool {
        (**self).chance(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_deterministic() {
        let mut a = SeededRandom::from_seed(42);
        let mut b = SeededRandom::from_seed(42);
        for _ in 0..16 {
            assert_eq!(a.next_index(100), b.next_index(100));
        }
    }

    #[test]
    fn test_seeded_index_in_range() {
        let mut rng = SeededRandom::from_seed(7);
        for upper in 1..50 {
            assert!(rng.next_index(upper) < upper);
        }
    }

    #[test]
    fn test_seeded_shuffle_is_permutation() {
        let mut rng = SeededRandom::from_seed(3);
        let original: Vec<Cell> = (0..10).map(|i| Cell::new(i, 0)).collect();
        let mut shuffled = original.clone();
        rng.shuffle(&mut shuffled);
        let mut sorted = shuffled.clone();
        sorted.sort_by_key(|c| c.x);
        assert_eq!(sorted, original);
    }

    #[test]
    fn test_scripted_replays_queue() {
        let mut rng = ScriptedRandom::new()
            .with_indices([2, 9])
            .with_coins([true]);
        assert_eq!(rng.next_index(5), 2);
        // clamped to the range
        assert_eq!(rng.next_index(5), 4);
        assert_eq!(rng.next_index(5), 0);
        assert!(rng.chance(0.5));
        assert!(!rng.chance(0.5));
        assert_eq!(rng.coin_flips(), 2);
    }

    #[test]
    fn test_scripted_reversing_shuffle() {
        let mut rng = ScriptedRandom::new().reversing();
        let mut cells = vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0)];
        rng.shuffle(&mut cells);
        assert_eq!(cells[0], Cell::new(2, 0));
    }
}
