//! Timing wrapper error types.

/// Errors raised while constructing a timing wrapper.
#[derive(Debug, thiserror::Error)]
pub enum TimingError {
    /// Wrappers schedule their timers on a tokio runtime and must be
    /// created from inside one.
    #[error("no tokio runtime is running on this thread")]
    NoRuntime,
}

/// Convenience alias used throughout the timing crate.
pub type Result<T> = std::result::Result<T, TimingError>;
