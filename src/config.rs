//! Process-wide constants: board geometry, tile distribution/values, the
//! premium-square table, and the tunable [`EngineConfig`].
//!
//! Tile distribution, tile values and the premium table are immutable for
//! the lifetime of the process (spec: "DO NOT EDIT" in the Python
//! `engine/config.py`). `EngineConfig` is the one piece of this module a
//! caller can load from TOML, covering the tunables flagged as open
//! questions in the source (MC tiers, positional-adjustment dampening, the
//! near-endgame parity table).

use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

pub const BOARD_SIZE: usize = 15;
pub const RACK_SIZE: usize = 7;
pub const BLANK: char = '?';

/// Bingo bonus for using the entire rack in one play. 40 in Crossplay (the
/// variant this engine targets); standard Scrabble uses 50 — parameterized
/// here rather than hardcoded so that swap is a one-line change.
pub const BINGO_BONUS: u32 = 40;

/// A premium (bonus) square kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Premium {
    DoubleLetter,
    TripleLetter,
    DoubleWord,
    TripleWord,
}

impl Premium {
    pub fn letter_multiplier(self) -> u32 {
        match self {
            Premium::DoubleLetter => 2,
            Premium::TripleLetter => 3,
            Premium::DoubleWord | Premium::TripleWord => 1,
        }
    }

    pub fn word_multiplier(self) -> u32 {
        match self {
            Premium::DoubleWord => 2,
            Premium::TripleWord => 3,
            Premium::DoubleLetter | Premium::TripleLetter => 1,
        }
    }
}

// Standard 15x15 Scrabble premium layout, rows 1-8 given explicitly and
// mirrored vertically for rows 9-15 (row 8 is the horizontal axis of
// symmetry, same as the teacher's `initialize_multipliers`).
const PREMIUM_ROWS: [&str; 8] = [
    "3..D...3...D..3",
    ".2...T...T...2.",
    "..2...D.D...2..",
    "D..2...D...2..D",
    "....2.....2....",
    ".T...T...T...T.",
    "..D...D.D...D..",
    "3..D...2...D..3",
];

fn premium_char(c: char) -> Option<Premium> {
    match c {
        '3' => Some(Premium::TripleWord),
        '2' => Some(Premium::DoubleWord),
        'T' => Some(Premium::TripleLetter),
        'D' => Some(Premium::DoubleLetter),
        _ => None,
    }
}

fn build_premium_table() -> HashMap<(usize, usize), Premium> {
    let mut table = HashMap::new();
    for row in 1..=BOARD_SIZE {
        let src_row = if row <= 8 { row } else { BOARD_SIZE + 1 - row };
        let line = PREMIUM_ROWS[src_row - 1];
        for (col0, ch) in line.chars().enumerate() {
            if let Some(p) = premium_char(ch) {
                table.insert((row, col0 + 1), p);
            }
        }
    }
    table
}

static PREMIUM_TABLE: OnceLock<HashMap<(usize, usize), Premium>> = OnceLock::new();

/// Premium at a 1-indexed `(row, col)`, or `None` for a plain square.
pub fn premium_at(row: usize, col: usize) -> Option<Premium> {
    PREMIUM_TABLE
        .get_or_init(build_premium_table)
        .get(&(row, col))
        .copied()
}

/// Letter point values, including the blank (worth 0).
pub const TILE_VALUES: [(char, u32); 27] = [
    ('A', 1), ('B', 3), ('C', 3), ('D', 2), ('E', 1), ('F', 4), ('G', 2),
    ('H', 4), ('I', 1), ('J', 8), ('K', 5), ('L', 1), ('M', 3), ('N', 1),
    ('O', 1), ('P', 3), ('Q', 10), ('R', 1), ('S', 1), ('T', 1), ('U', 1),
    ('V', 4), ('W', 4), ('X', 8), ('Y', 4), ('Z', 10), (BLANK, 0),
];

pub fn tile_value(letter: char) -> u32 {
    TILE_VALUES
        .iter()
        .find(|(c, _)| *c == letter.to_ascii_uppercase())
        .map(|(_, v)| *v)
        .unwrap_or(0)
}

/// Tile counts in the starting bag. 100 tiles total, including 3 blanks.
pub const TILE_DISTRIBUTION: [(char, u32); 27] = [
    ('A', 9), ('B', 2), ('C', 2), ('D', 4), ('E', 12), ('F', 2), ('G', 3),
    ('H', 2), ('I', 9), ('J', 1), ('K', 1), ('L', 4), ('M', 2), ('N', 6),
    ('O', 8), ('P', 2), ('Q', 1), ('R', 6), ('S', 4), ('T', 6), ('U', 4),
    ('V', 2), ('W', 2), ('X', 1), ('Y', 2), ('Z', 1), (BLANK, 3),
];

/// Parameters for one Monte-Carlo search tier (spec.md §4.6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tier {
    pub n_candidates: usize,
    pub k_sims: usize,
    pub es_min_sims: usize,
    pub es_se_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierName {
    Blitz,
    Fast,
    Standard,
    Deep,
}

pub fn tier_params(name: TierName) -> Tier {
    match name {
        TierName::Blitz => Tier { n_candidates: 7, k_sims: 150, es_min_sims: 20, es_se_threshold: 1.5 },
        TierName::Fast => Tier { n_candidates: 15, k_sims: 400, es_min_sims: 50, es_se_threshold: 1.2 },
        TierName::Standard => Tier { n_candidates: 30, k_sims: 1500, es_min_sims: 80, es_se_threshold: 0.8 },
        TierName::Deep => Tier { n_candidates: 35, k_sims: 2000, es_min_sims: 100, es_se_threshold: 0.5 },
    }
}

/// Fixed MC parameter: how often convergence is checked once `es_min_sims`
/// simulations have run.
pub const ES_CHECK_EVERY: usize = 10;

/// Near-endgame time budgets by tier, in seconds (spec.md §5).
pub fn near_endgame_budget_secs(name: TierName) -> f64 {
    match name {
        TierName::Blitz => 3.0,
        TierName::Fast => 5.0,
        TierName::Standard | TierName::Deep => 15.0,
    }
}

/// `P[bag_after]`: probability the opponent empties the bag, used by the
/// near-endgame parity adjustment (spec.md §4.7). Ported from the crossplay
/// engine's tabulated values.
pub const PARITY_P_OPP_EMPTIES: [(usize, f64); 7] = [
    (1, 0.97), (2, 0.94), (3, 0.88), (4, 0.78), (5, 0.62), (6, 0.40), (7, 0.18),
];

pub fn parity_probability(bag_after: usize) -> f64 {
    PARITY_P_OPP_EMPTIES
        .iter()
        .find(|(b, _)| *b == bag_after)
        .map(|(_, p)| *p)
        .unwrap_or(0.0)
}

/// Tunables that are genuinely configuration (as opposed to fixed game
/// rules) — loadable from a TOML file the way the teacher's `main.rs` loads
/// `scrabble_config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// CPU threads reserved for the OS / caller / opponent process; the
    /// worker pool uses `cpu_threads - reserve` workers.
    pub worker_reserve: usize,
    /// Per-task MC timeout, seconds.
    pub mc_task_timeout_secs: f64,
    /// Global endgame wall-clock budget, seconds.
    pub endgame_budget_secs: f64,
    /// Minimum per-task soft timeout during endgame, seconds.
    pub endgame_min_task_secs: f64,
    /// Structural-advantage constant used by the parity adjustment.
    pub parity_structural_advantage: f64,
    /// Dampening factor applied to the positional adjustment after MC
    /// equity (spec.md §4.7 / §9's `MC_POSITIONAL_DAMPEN`).
    pub positional_dampen: f64,
    /// Extra multiplier on the positional/defensive penalty when the bag
    /// holds fewer than `RACK_SIZE` tiles but is not yet empty (ported from
    /// `bot_endgame_expert.py`'s pre-endgame defensive doubling).
    pub pre_endgame_defense_multiplier: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_reserve: 3,
            mc_task_timeout_secs: 60.0,
            endgame_budget_secs: 180.0,
            endgame_min_task_secs: 2.0,
            parity_structural_advantage: 10.0,
            positional_dampen: 0.5,
            pre_endgame_defense_multiplier: 2.0,
        }
    }
}

impl EngineConfig {
    pub fn load_from_str(s: &str) -> crate::error::Result<Self> {
        toml::from_str(s).map_err(|e| crate::error::EngineError::WorkerStartupFailure(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premium_table_has_expected_corners_and_center() {
        assert_eq!(premium_at(1, 1), Some(Premium::TripleWord));
        assert_eq!(premium_at(15, 15), Some(Premium::TripleWord));
        assert_eq!(premium_at(8, 8), Some(Premium::DoubleWord));
        assert_eq!(premium_at(1, 2), None);
    }

    #[test]
    fn premium_table_is_vertically_symmetric() {
        for row in 1..=BOARD_SIZE {
            for col in 1..=BOARD_SIZE {
                assert_eq!(premium_at(row, col), premium_at(BOARD_SIZE + 1 - row, col));
            }
        }
    }

    #[test]
    fn tile_distribution_totals_100() {
        let total: u32 = TILE_DISTRIBUTION.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn blank_is_worth_zero() {
        assert_eq!(tile_value('?'), 0);
        assert_eq!(tile_value('A'), 1);
        assert_eq!(tile_value('Q'), 10);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = EngineConfig::default();
        let s = toml::to_string(&cfg).unwrap();
        let back = EngineConfig::load_from_str(&s).unwrap();
        assert_eq!(back.worker_reserve, cfg.worker_reserve);
    }
}
