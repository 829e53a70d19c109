use crate::board::Pos;

/// The engine's error taxonomy.
///
/// `NoLegalMoves` is deliberately absent: a rack/board with no legal plays
/// is a legitimate pass, represented by an empty move list, not an error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid placement at {pos:?}: {reason}")]
    InvalidPlacement { pos: Pos, reason: String },

    #[error("malformed GADDAG: {0}")]
    MalformedGaddag(String),

    #[error("no dictionary or packed GADDAG found at startup")]
    DictionaryMissing,

    #[error("worker pool could not be started: {0}")]
    WorkerStartupFailure(String),

    #[error("worker task exceeded its deadline")]
    TaskTimeout,

    #[error("worker task failed: {0}")]
    WorkerException(String),
}

/// Errors that are fatal: the process should log and abort rather than try
/// to recover. `MalformedGaddag` and `DictionaryMissing` are always fatal;
/// everything else is recoverable by the orchestration layer (see
/// `engine.rs`).
impl EngineError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::MalformedGaddag(_) | EngineError::DictionaryMissing
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
