//! Read-only view of the timer for rendering

use serde::{Deserialize, Serialize};

use crate::utils::format_clock;

/// Everything a display needs to render one frame of the timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub minutes: u32,
    pub seconds: u32,
    pub is_running: bool,
    pub is_paused: bool,
    /// Elapsed share of the target duration, in `[0, 1]`
    pub progress_fraction: f64,
    pub remaining_seconds: u32,
    pub target_seconds: u32,
    /// `MM:SS` rendering of the remaining time
    pub display: String,
}

impl TimerSnapshot {
    /// Build a snapshot from raw engine fields
    pub fn new(remaining: u32, target: u32, is_running: bool, is_paused: bool) -> Self {
        let minutes = remaining / 60;
        let seconds = remaining % 60;
        Self {
            minutes,
            seconds,
            is_running,
            is_paused,
            progress_fraction: progress_fraction(remaining, target),
            remaining_seconds: remaining,
            target_seconds: target,
            display: format_clock(minutes, seconds),
        }
    }

    /// Short label for the current phase: `idle`, `running` or `paused`
    pub fn status_label(&self) -> &'static str {
        match (self.is_running, self.is_paused) {
            (false, _) => "idle",
            (true, false) => "running",
            (true, true) => "paused",
        }
    }
}

/// Fraction of `target` already elapsed; zero for an empty target
pub fn progress_fraction(remaining: u32, target: u32) -> f64 {
    if target == 0 {
        return 0.0;
    }
    let elapsed = target.saturating_sub(remaining);
    f64::from(elapsed) / f64::from(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_remaining_into_minutes_and_seconds() {
        let snapshot = TimerSnapshot::new(125, 300, true, false);
        assert_eq!(snapshot.minutes, 2);
        assert_eq!(snapshot.seconds, 5);
        assert_eq!(snapshot.display, "02:05");
        assert_eq!(snapshot.status_label(), "running");
    }

    #[test]
    fn progress_covers_both_ends() {
        assert_eq!(progress_fraction(300, 300), 0.0);
        assert_eq!(progress_fraction(0, 300), 1.0);
        assert_eq!(progress_fraction(150, 300), 0.5);
    }

    #[test]
    fn progress_of_empty_target_is_zero() {
        assert_eq!(progress_fraction(0, 0), 0.0);
    }

    #[test]
    fn dormant_pause_flag_reads_as_idle() {
        let snapshot = TimerSnapshot::new(60, 60, false, true);
        assert_eq!(snapshot.status_label(), "idle");
    }
}
