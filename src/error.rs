//! Error types for the timer and its collaborators

use thiserror::Error;

/// Errors raised by timer commands and the notification boundary
#[derive(Debug, Error)]
pub enum TimerError {
    #[error("duration must be between 1 and 999 minutes, got {0}")]
    InvalidDuration(i64),
    #[error("volume must be between 0.0 and 1.0, got {0}")]
    InvalidVolume(f64),
    #[error("notification playback failed: {0}")]
    Playback(String),
    #[error("failed to lock {0}")]
    LockPoisoned(String),
}

impl TimerError {
    /// Whether the error was caused by caller input rather than the server
    pub fn is_rejection(&self) -> bool {
        matches!(self, TimerError::InvalidDuration(_) | TimerError::InvalidVolume(_))
    }
}
