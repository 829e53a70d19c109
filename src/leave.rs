//! Leave evaluation (spec.md §4.5, C6): two interchangeable strategies for
//! scoring the quality of a post-play rack residue.
//!
//! The formula strategy's default per-tile weights are the Quackle/
//! O'Laughlin table (`QUACKLE_TILE_VALUES` in
//! `examples/original_source/bots/bot_quackle_leave.py`), per
//! `SPEC_FULL.md` §2 — the calibration present in more than one bot
//! variant in the original source, unlike SuperLeaves which the source
//! itself flags as trained on a buggy engine.

use crate::config::BLANK;
use std::collections::HashMap;

/// A pure, thread-safe strategy for scoring a leave (spec.md §4.5: "the
/// evaluator is pure and thread-safe after construction").
pub trait LeaveEvaluator: Send + Sync {
    /// `leave` is the canonical sorted-letter string (see
    /// [`crate::mv::canonical_leave`]); `bag_count` is tiles remaining in
    /// the bag (not counting this rack), used by the decay factor.
    fn value(&self, leave: &str, bag_count: usize) -> f64;
}

/// Quackle/O'Laughlin-derived single-tile leave values, used by the
/// formula strategy and as a sane fallback for the trained table.
pub const QUACKLE_TILE_VALUES: [(char, f64); 27] = [
    ('A', 1.1), ('B', -0.3), ('C', 0.3), ('D', 0.1), ('E', 1.6), ('F', -0.6),
    ('G', -0.8), ('H', 0.2), ('I', 0.2), ('J', -1.9), ('K', -1.3), ('L', 0.2),
    ('M', 0.1), ('N', 0.3), ('O', -0.3), ('P', -0.9), ('Q', -4.8), ('R', 0.7),
    ('S', 3.4), ('T', 0.5), ('U', -2.1), ('V', -2.0), ('W', -1.6), ('X', 2.6),
    ('Y', -0.6), ('Z', 2.6), (BLANK, 7.5),
];

fn tile_leave_value(letter: char) -> f64 {
    QUACKLE_TILE_VALUES
        .iter()
        .find(|(c, _)| *c == letter.to_ascii_uppercase())
        .map(|(_, v)| *v)
        .unwrap_or(0.0)
}

/// The bag-decay factor, monotonically non-decreasing with bag size and
/// clamped to 0.1-1.0 (spec.md §4.5).
fn bag_decay(bag_count: usize) -> f64 {
    let full_bag = 100.0;
    (0.1 + 0.9 * (bag_count as f64 / full_bag)).clamp(0.1, 1.0)
}

/// Weighted-sum-of-tiles leave strategy with vowel/consonant balance and
/// Q-without-U penalties (spec.md §4.5).
pub struct FormulaLeaveEvaluator {
    tile_weights: HashMap<char, f64>,
    /// Letters not yet seen (on the board, in any known rack) — used by the
    /// Q-without-U penalty's "no U remains unseen" gate
    /// (`bot_quackle_leave.py::quackle_leave_value`, ported per
    /// `SPEC_FULL.md` §2).
    unseen: Option<HashMap<char, u32>>,
    apply_bag_decay: bool,
}

impl FormulaLeaveEvaluator {
    pub fn new() -> Self {
        let tile_weights = QUACKLE_TILE_VALUES.into_iter().collect();
        Self {
            tile_weights,
            unseen: None,
            apply_bag_decay: true,
        }
    }

    /// Supplies the unseen-tile pool so the Q-without-U penalty can check
    /// whether any `U` remains to be drawn.
    pub fn with_unseen_pool(mut self, unseen: HashMap<char, u32>) -> Self {
        self.unseen = Some(unseen);
        self
    }

    pub fn without_bag_decay(mut self) -> Self {
        self.apply_bag_decay = false;
        self
    }

    fn no_u_remains_unseen(&self) -> bool {
        match &self.unseen {
            Some(pool) => pool.get(&'U').copied().unwrap_or(0) == 0,
            None => false,
        }
    }
}

impl Default for FormulaLeaveEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaveEvaluator for FormulaLeaveEvaluator {
    fn value(&self, leave: &str, bag_count: usize) -> f64 {
        let letters: Vec<char> = leave.chars().collect();
        let mut value: f64 = letters
            .iter()
            .map(|&c| self.tile_weights.get(&c).copied().unwrap_or_else(|| tile_leave_value(c)))
            .sum();

        if letters.len() >= 2 {
            let vowels = letters
                .iter()
                .filter(|&&c| "AEIOU".contains(c))
                .count();
            let consonants = letters.len() - vowels;
            if vowels == 1 && consonants >= 1 {
                value += 0.5;
            } else if vowels == letters.len() {
                value -= 1.0 * letters.len() as f64;
            }
        }

        if letters.contains(&'Q') && !letters.contains(&'U') && self.no_u_remains_unseen() {
            value -= 8.0;
        }

        if self.apply_bag_decay {
            value *= bag_decay(bag_count);
        }
        value
    }
}

/// A mapping from canonical leave string to a trained scalar. Missing keys
/// fall back to `fallback` (spec.md §4.5: "missing keys fall back to the
/// formula strategy").
pub struct TrainedLeaveEvaluator<F: LeaveEvaluator> {
    table: HashMap<String, f64>,
    fallback: F,
}

impl<F: LeaveEvaluator> TrainedLeaveEvaluator<F> {
    pub fn new(table: HashMap<String, f64>, fallback: F) -> Self {
        Self { table, fallback }
    }
}

impl<F: LeaveEvaluator> LeaveEvaluator for TrainedLeaveEvaluator<F> {
    fn value(&self, leave: &str, bag_count: usize) -> f64 {
        match self.table.get(leave) {
            Some(&v) => v,
            None => self.fallback.value(leave, bag_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_valued_highest() {
        let eval = FormulaLeaveEvaluator::new().without_bag_decay();
        assert!(eval.value("?", 50) > eval.value("S", 50));
    }

    #[test]
    fn pure_vowel_leave_is_penalized() {
        let eval = FormulaLeaveEvaluator::new().without_bag_decay();
        assert!(eval.value("AEI", 50) < eval.value("AEF", 50));
    }

    #[test]
    fn q_without_u_penalized_only_when_no_u_remains_unseen() {
        let mut pool = HashMap::new();
        pool.insert('U', 0);
        let exhausted = FormulaLeaveEvaluator::new()
            .without_bag_decay()
            .with_unseen_pool(pool);
        let mut pool2 = HashMap::new();
        pool2.insert('U', 2);
        let available = FormulaLeaveEvaluator::new()
            .without_bag_decay()
            .with_unseen_pool(pool2);
        assert!(exhausted.value("QZ", 50) < available.value("QZ", 50));
    }

    #[test]
    fn bag_decay_is_monotonic_non_decreasing_with_bag_size() {
        let full = bag_decay(100);
        let empty = bag_decay(0);
        assert!(full >= empty);
        assert!((0.1..=1.0).contains(&full));
        assert!((0.1..=1.0).contains(&empty));
    }

    #[test]
    fn trained_table_falls_back_for_missing_leave() {
        let mut table = HashMap::new();
        table.insert("AEST".to_string(), 12.3);
        let trained = TrainedLeaveEvaluator::new(table, FormulaLeaveEvaluator::new());
        assert_eq!(trained.value("AEST", 50), 12.3);
        // Missing key falls back to the formula strategy's computed value.
        let fallback_value = FormulaLeaveEvaluator::new().value("ZZZ", 50);
        assert_eq!(trained.value("ZZZ", 50), fallback_value);
    }
}
