use thiserror::Error;

/// Contract violations caught before a session or timer is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("target ring needs at least {min} targets, got {count}")]
    InvalidTargetCount { count: usize, min: usize },

    #[error("only {max} targets can be bound to keys, got {count}")]
    TooManyTargets { count: usize, max: usize },

    #[error("timer duration must be positive, got {0}")]
    InvalidDuration(f64),
}

/// Failures of the durable high-score storage.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("high score database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to prepare storage directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("high score storage unavailable")]
    Unavailable,
}
