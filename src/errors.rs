use std::{error::Error, fmt, io};

/// Errors surfaced by pool construction and submission.
#[derive(Debug)]
pub enum PoolError {
    /// `submit` was called after `shutdown` began. Work that was already
    /// queued still drains, but new work is rejected instead of being
    /// silently dropped.
    ShuttingDown,
    /// The operating system refused to spawn a worker thread.
    Spawn(io::Error),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShuttingDown => write!(f, "thread pool is shutting down"),
            Self::Spawn(err) => write!(f, "failed to spawn worker thread: {err}"),
        }
    }
}

impl Error for PoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::ShuttingDown => None,
        }
    }
}
