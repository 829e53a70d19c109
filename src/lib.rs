//! Crossplay engine core: packed GADDAG move generation, scoring, and the
//! parallel Monte-Carlo / endgame search that drives a strong Scrabble-
//! variant bot (spec.md §1-§2). This crate is the engine only -- the match
//! runner, tournament orchestration, and any interactive display are
//! external collaborators that consume [`Engine::choose_move`].

pub mod board;
pub mod config;
pub mod cross_set;
pub mod dictionary;
pub mod endgame;
pub mod engine;
pub mod error;
pub mod gaddag;
pub mod game_info;
pub mod leave;
pub mod mc_search;
pub mod move_gen;
pub mod mv;
pub mod scorer;
pub mod worker_pool;

pub use board::{Board, Orientation, Pos};
pub use config::EngineConfig;
pub use dictionary::Dictionary;
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use gaddag::Gaddag;
pub use game_info::GameInfo;
pub use leave::{FormulaLeaveEvaluator, LeaveEvaluator, TrainedLeaveEvaluator};
pub use mv::Move;
pub use worker_pool::WorkerPool;
