//! The parallel Monte-Carlo mid-game search (spec.md §4.6, C7): per-candidate
//! opponent sampling with a running-variance early stop, dispatched across
//! the [`WorkerPool`].
//!
//! Grounded in the teacher's `rand` dependency for seeded sampling and in
//! `rayon` (already wired through [`WorkerPool`]) for the fan-out; the
//! per-task RNG seeding and running-variance early stop are this crate's own
//! translation of spec.md §4.6/§5's determinism and early-stopping
//! requirements — the teacher has no Monte-Carlo search of its own to
//! ground this on.

use crate::board::{Board, Pos};
use crate::config::{TierName, Tier, TILE_DISTRIBUTION, ES_CHECK_EVERY};
use crate::dictionary::Dictionary;
use crate::endgame::positional_adjustment;
use crate::gaddag::Gaddag;
use crate::leave::LeaveEvaluator;
use crate::move_gen::MoveGenerator;
use crate::mv::Move;
use crate::worker_pool::WorkerPool;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// The tile pool not on the board and not in our rack: the bag plus the
/// opponent's (unknown) rack (spec.md §3 "unseen pool").
pub fn compute_unseen_pool(board: &Board, our_rack: &str) -> Vec<char> {
    let mut counts: std::collections::HashMap<char, i32> = TILE_DISTRIBUTION
        .iter()
        .map(|&(c, n)| (c, n as i32))
        .collect();

    for (_, letter) in board.all_tiles() {
        if let Some(n) = counts.get_mut(&letter) {
            *n -= 1;
        }
    }
    // Every board-blank was drawn as a blank, not as the letter it displays;
    // undo the (wrong) decrement above and charge the blank count instead.
    for pos_row in 1..=crate::config::BOARD_SIZE {
        for pos_col in 1..=crate::config::BOARD_SIZE {
            let pos = Pos::new(pos_row, pos_col);
            if board.is_blank_at(pos) {
                if let Some(letter) = board.get(pos) {
                    if let Some(n) = counts.get_mut(&letter) {
                        *n += 1;
                    }
                    if let Some(n) = counts.get_mut(&crate::config::BLANK) {
                        *n -= 1;
                    }
                }
            }
        }
    }
    for c in our_rack.chars() {
        if let Some(n) = counts.get_mut(&c) {
            *n -= 1;
        }
    }

    let mut pool = Vec::new();
    for (letter, n) in counts {
        for _ in 0..n.max(0) {
            pool.push(letter);
        }
    }
    pool
}

/// Running sum/sum-of-squares accumulator used for the early-stop check
/// (spec.md §4.6 step 3c).
#[derive(Debug, Clone, Copy, Default)]
pub struct McTaskResult {
    pub avg_opp: f64,
    pub n_sims: usize,
    pub sum: f64,
    pub sum_sq: f64,
}

/// A single MC work unit (spec.md §6 "MC task payload"): everything a
/// worker needs to reconstruct the post-move board and simulate opponent
/// replies, by value.
pub struct McTask {
    pub board_after_candidate: Board,
    pub opponent_rack_size: usize,
    pub unseen_pool: Vec<char>,
    pub k_sims: usize,
    pub seed: u64,
    pub es_min_sims: usize,
    pub es_check_every: usize,
    pub es_se_threshold: f64,
}

/// Runs one MC task to completion: `K` samples of an opponent rack drawn
/// from `unseen_pool`, each scored by the single best reply C4+C5 can find,
/// with early stop once the standard error of the mean drops below
/// threshold (spec.md §4.6). Deterministic in `task.seed` (spec.md §8
/// property 8).
pub fn run_mc_task(gaddag: &Gaddag, dictionary: &Dictionary, task: &McTask) -> McTaskResult {
    let mut rng = StdRng::seed_from_u64(task.seed);
    let generator = MoveGenerator::new(gaddag, dictionary);
    let draw_size = task.opponent_rack_size.min(task.unseen_pool.len());

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut n = 0usize;

    for _ in 0..task.k_sims {
        let sample: Vec<char> = task
            .unseen_pool
            .choose_multiple(&mut rng, draw_size)
            .copied()
            .collect();
        let opponent_rack: String = sample.into_iter().collect();
        let replies = generator.generate(&task.board_after_candidate, &opponent_rack);
        let best = replies.first().map(|m| m.score).unwrap_or(0) as f64;

        sum += best;
        sum_sq += best * best;
        n += 1;

        if n >= task.es_min_sims && n % task.es_check_every == 0 {
            let mean = sum / n as f64;
            let variance = (sum_sq / n as f64 - mean * mean).max(0.0);
            let se = (variance / n as f64).sqrt();
            if se < task.es_se_threshold {
                break;
            }
        }
    }

    McTaskResult {
        avg_opp: if n == 0 { 0.0 } else { sum / n as f64 },
        n_sims: n,
        sum,
        sum_sq,
    }
}

/// The mid-game Monte-Carlo search orchestrator (spec.md §4.6).
pub struct McSearch<'a> {
    gaddag: &'a Gaddag,
    dictionary: &'a Dictionary,
    positional_dampen: f64,
}

impl<'a> McSearch<'a> {
    pub fn new(gaddag: &'a Gaddag, dictionary: &'a Dictionary, positional_dampen: f64) -> Self {
        Self {
            gaddag,
            dictionary,
            positional_dampen,
        }
    }

    /// Picks the best move out of `candidates` by simulating each of the
    /// top `tier.n_candidates` (ranked by 1-ply equity) against `k_sims`
    /// sampled opponent racks, dispatched via `pool`.
    #[allow(clippy::too_many_arguments)]
    pub fn search(
        &self,
        board: &Board,
        candidates: Vec<Move>,
        bag_count: usize,
        our_rack_size: usize,
        tier: TierName,
        tier_params: Tier,
        seed: u64,
        leave_eval: &dyn LeaveEvaluator,
        pool: &WorkerPool,
    ) -> Option<Move> {
        if candidates.is_empty() {
            return None;
        }

        let mut ranked = candidates;
        ranked.sort_by(|a, b| {
            let ea = a.score as f64 + leave_eval.value(&a.leave, bag_count);
            let eb = b.score as f64 + leave_eval.value(&b.leave, bag_count);
            eb.partial_cmp(&ea).unwrap()
        });
        ranked.truncate(tier_params.n_candidates);

        // The unseen pool is the bag plus the opponent's rack: the
        // distribution minus the post-placement board minus the tiles we're
        // still holding (our leave).
        let tasks: Vec<(Move, Board, Vec<char>)> = ranked
            .into_iter()
            .map(|candidate| {
                let mut board_copy = board.clone();
                board_copy.place_move(
                    &candidate.word,
                    candidate.start,
                    candidate.direction,
                    &candidate.blanks_used,
                );
                let unseen = compute_unseen_pool(&board_copy, &candidate.leave);
                (candidate, board_copy, unseen)
            })
            .collect();

        let es_check_every = ES_CHECK_EVERY;
        let results: Vec<(Move, f64, f64)> = pool.run(tasks, |(candidate, board_after, unseen)| {
            let task_seed = seed ^ hash_move(&candidate);
            let task = McTask {
                board_after_candidate: board_after,
                opponent_rack_size: our_rack_size,
                unseen_pool: unseen,
                k_sims: tier_params.k_sims,
                seed: task_seed,
                es_min_sims: tier_params.es_min_sims,
                es_check_every,
                es_se_threshold: tier_params.es_se_threshold,
            };
            let mc = run_mc_task(self.gaddag, self.dictionary, &task);
            let leave_value = leave_eval.value(&candidate.leave, bag_count);
            let positional = positional_adjustment(board, &candidate) * self.positional_dampen;
            let equity = candidate.score as f64 - mc.avg_opp + leave_value + positional;
            (candidate, equity, mc.avg_opp)
        });

        let _ = tier;
        results
            .into_iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .map(|(mv, _, _)| mv)
    }
}

/// A cheap, deterministic hash of a move used to vary the per-task RNG seed
/// across candidates while keeping the whole search reproducible from one
/// controller-supplied seed (spec.md §4.6 "Workers seed a per-task RNG
/// deterministic from a provided seed").
fn hash_move(mv: &Move) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    mv.word.hash(&mut hasher);
    mv.start.row.hash(&mut hasher);
    mv.start.col.hash(&mut hasher);
    hasher.finish()
}
