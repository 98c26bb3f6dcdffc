/// Unified error types for the soundcred core
use thiserror::Error;

/// Main error type for core operations
///
/// Everything except `Database` is a recoverable denial that the calling
/// layer renders back to the user. `Database` means the ledger store is
/// unreachable and must propagate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Ledger store errors
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unknown song or user reference
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed link, review too short, out-of-order wizard step, etc.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Credit balance check failed
    #[error("insufficient credits: need {required}, have {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// Daily point cap, wallet cap, vote cap, or submission cooldown
    #[error("cap reached: {reason}")]
    CapReached {
        reason: String,
        /// When the caller may retry, epoch millis (cooldowns only)
        retry_at_ms: Option<i64>,
    },

    /// Duplicate review or vote beyond what is allowed
    #[error("already done: {0}")]
    AlreadyDone(String),

    /// Wizard or listen state missing (including after a process restart)
    #[error("session expired")]
    SessionExpired,

    /// User under a moderation hold
    #[error("suspended until {until_ms}: {reason}")]
    Suspended { until_ms: i64, reason: String },

    /// Non-moderator attempting an admin operation
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl CoreError {
    /// True for denials the caller can recover from by changing its request.
    /// Storage failures are the one process-level fault.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CoreError::Database(_))
    }

    /// Retry-after hint in epoch millis, where one applies
    pub fn retry_at_ms(&self) -> Option<i64> {
        match self {
            CoreError::CapReached { retry_at_ms, .. } => *retry_at_ms,
            CoreError::Suspended { until_ms, .. } => Some(*until_ms),
            _ => None,
        }
    }
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
