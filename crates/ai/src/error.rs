use thiserror::Error;

/// Errors surfaced by the AI crate
///
/// None of these cross the worker thread boundary: the worker logs them and
/// keeps running.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "rank table has {actual} entries, expected {expected} \
         (stack width {stack_width}, max jump {max_jump})"
    )]
    RankTableSize {
        stack_width: usize,
        max_jump: u8,
        expected: usize,
        actual: usize,
    },

    #[error("stack width {0} is out of range")]
    StackWidth(usize),

    #[error("max jump {0} is out of range")]
    MaxJump(u8),

    #[error("rank table for stack width {stack_width}, max jump {max_jump} is too large")]
    RankTableTooLarge { stack_width: usize, max_jump: u8 },

    #[error("think panicked: {0}")]
    Panicked(String),

    #[error("worker is not running")]
    NotRunning,
}
