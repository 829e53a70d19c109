//! The orchestration facade (spec.md §6, §9 "Global mutable caches... replace
//! with explicit context/engine structs constructed at startup and threaded
//! through call sites"): wires C1-C9 behind the single bot-to-runner
//! move-selection entry point, and implements the error-recovery policy of
//! spec.md §7.
//!
//! `Engine` owns the packed GADDAG, the dictionary, the worker pool and the
//! chosen leave evaluator for the lifetime of the process -- exactly the
//! singletons the Python source keeps as module-level globals (spec.md §9),
//! now scoped to one struct instead.

use crate::board::Board;
use crate::config::{tier_params, EngineConfig, TierName};
use crate::dictionary::Dictionary;
use crate::endgame::{EndgameSolver, NearEndgameSolver};
use crate::error::{EngineError, Result};
use crate::gaddag::Gaddag;
use crate::game_info::GameInfo;
use crate::leave::{FormulaLeaveEvaluator, LeaveEvaluator};
use crate::mc_search::{compute_unseen_pool, McSearch};
use crate::move_gen::MoveGenerator;
use crate::mv::Move;
use crate::worker_pool::WorkerPool;
use log::info;
use std::path::Path;

/// A ready-to-play engine instance: immutable GADDAG + dictionary, a
/// persistent worker pool, a chosen leave strategy, and the MC tier to run
/// at (spec.md §4.6's tier table). Construct once per process and reuse
/// across every move of every game (spec.md §4.8 "the pool is not shut down
/// at end of game").
pub struct Engine {
    gaddag: Gaddag,
    dictionary: Dictionary,
    config: EngineConfig,
    pool: WorkerPool,
    leave_eval: Box<dyn LeaveEvaluator>,
    tier: TierName,
}

impl Engine {
    /// Builds an engine from an already-constructed GADDAG and dictionary.
    /// `WorkerPool::new` degrades to sequential execution on its own if
    /// thread-pool construction fails (spec.md §7 `WorkerStartupFailure`),
    /// so this constructor never fails.
    pub fn new(gaddag: Gaddag, dictionary: Dictionary, config: EngineConfig, tier: TierName) -> Self {
        info!(
            "engine ready: gaddag {} words / {} bytes, tier {:?}",
            gaddag.word_count(),
            gaddag.byte_len(),
            tier
        );
        let pool = WorkerPool::new(&config);
        Self {
            gaddag,
            dictionary,
            config,
            pool,
            leave_eval: Box::new(FormulaLeaveEvaluator::new()),
            tier,
        }
    }

    /// Loads a packed GADDAG from `gaddag_path` if present, otherwise builds
    /// one from `words`/`two_letter_words`; the dictionary (C2) is always
    /// built from the word lists, since the packed buffer alone doesn't
    /// carry hooks/base-scores. Fails fatally with `DictionaryMissing`
    /// (spec.md §7) if neither a packed file nor a word list is available.
    pub fn load(
        gaddag_path: Option<&Path>,
        words: Option<&[String]>,
        two_letter_words: Option<&[String]>,
        config: EngineConfig,
        tier: TierName,
    ) -> Result<Self> {
        let (words, two_letter_words) = match (words, two_letter_words) {
            (Some(w), Some(t)) => (w, t),
            _ => return Err(EngineError::DictionaryMissing),
        };

        let gaddag = match gaddag_path {
            Some(path) if path.exists() => Gaddag::load(path)?,
            _ => Gaddag::build_from_dictionary(
                words.iter().map(String::as_str),
                two_letter_words.iter().map(String::as_str),
            ),
        };
        let dictionary =
            Dictionary::build(words.iter().cloned(), two_letter_words.iter().cloned()).with_indices();

        Ok(Self::new(gaddag, dictionary, config, tier))
    }

    pub fn with_leave_evaluator(mut self, eval: Box<dyn LeaveEvaluator>) -> Self {
        self.leave_eval = eval;
        self
    }

    pub fn gaddag(&self) -> &Gaddag {
        &self.gaddag
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// The bot-to-runner entry point (spec.md §6): given a board snapshot,
    /// rack, and game context, returns the chosen play or `None` for a pass
    /// (spec.md §7 `NoLegalMoves` -- a legitimate outcome, not an error).
    /// `seed` drives the MC search's per-candidate RNGs (spec.md §4.6,
    /// §8 property 8: reruns with the same seed are bit-reproducible).
    pub fn choose_move(&self, board: &Board, rack: &str, game_info: &GameInfo, seed: u64) -> Option<Move> {
        let generator = MoveGenerator::new(&self.gaddag, &self.dictionary);
        let candidates = generator.generate(board, rack);
        if candidates.is_empty() {
            return None;
        }

        if game_info.is_endgame() {
            let opponent_rack = self.known_opponent_rack(board, rack);
            let solver = EndgameSolver::new(&self.gaddag, &self.dictionary, &self.config);
            return solver
                .solve(board, rack, &opponent_rack, &self.pool)
                .or_else(|| candidates.into_iter().next());
        }

        if game_info.is_near_endgame() {
            let unseen = compute_unseen_pool(board, rack);
            let solver = NearEndgameSolver::new(&self.gaddag, &self.dictionary, &self.config);
            return solver
                .solve(board, rack, &unseen, self.leave_eval.as_ref(), self.tier)
                .or_else(|| candidates.into_iter().next());
        }

        let tier_params = tier_params(self.tier);
        let search = McSearch::new(&self.gaddag, &self.dictionary, self.config.positional_dampen);
        search
            .search(
                board,
                candidates.clone(),
                game_info.tiles_in_bag,
                rack.chars().count(),
                self.tier,
                tier_params,
                seed,
                self.leave_eval.as_ref(),
                &self.pool,
            )
            .or_else(|| candidates.into_iter().next())
    }

    /// The bag is empty (spec.md §4.7 endgame precondition), so the unseen
    /// pool the endgame solver needs *is* the opponent's rack exactly.
    fn known_opponent_rack(&self, board: &Board, rack: &str) -> String {
        compute_unseen_pool(board, rack).into_iter().collect()
    }
}
