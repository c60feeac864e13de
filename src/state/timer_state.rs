//! Countdown state machine

use tracing::{debug, info};

use super::TimerSnapshot;
use crate::error::TimerError;

pub const MIN_DURATION_MINUTES: i64 = 1;
pub const MAX_DURATION_MINUTES: i64 = 999;
pub const DEFAULT_DURATION_MINUTES: u32 = 25;
pub const DEFAULT_VOLUME: f64 = 0.5;

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not running or paused; nothing changed
    Idle,
    /// Countdown moved one second closer to zero
    Advanced { remaining: u32 },
    /// Countdown was at zero: a notification is due at `volume`
    Expired { volume: f64, restarted: bool },
}

/// Countdown timer state
///
/// All mutation goes through the command methods and [`TimerEngine::tick`];
/// the engine knows nothing about wall-clock time or how ticks are scheduled.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    target_duration: u32,
    remaining: u32,
    is_running: bool,
    is_paused: bool,
    volume: f64,
    restart_on_expiry: bool,
}

impl TimerEngine {
    /// Create an idle timer with the default 25 minute duration
    pub fn new() -> Self {
        let target_duration = DEFAULT_DURATION_MINUTES * 60;
        Self {
            target_duration,
            remaining: target_duration,
            is_running: false,
            is_paused: false,
            volume: DEFAULT_VOLUME,
            restart_on_expiry: true,
        }
    }

    /// Create an idle timer with the given duration
    pub fn with_duration(minutes: i64) -> Result<Self, TimerError> {
        let mut engine = Self::new();
        engine.set_duration(minutes)?;
        Ok(engine)
    }

    /// Set the starting volume
    pub fn volume_preset(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Choose whether expiry restarts the countdown or returns to idle
    pub fn restart_on_expiry(mut self, restart: bool) -> Self {
        self.restart_on_expiry = restart;
        self
    }

    /// Set a new duration and return to idle
    ///
    /// Out of range values leave every field untouched.
    pub fn set_duration(&mut self, minutes: i64) -> Result<(), TimerError> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
            debug!("Rejected duration of {} minutes", minutes);
            return Err(TimerError::InvalidDuration(minutes));
        }

        // Bounded to 1..=999 above
        self.target_duration = minutes as u32 * 60;
        self.remaining = self.target_duration;
        self.is_running = false;
        self.is_paused = false;
        info!("Timer duration set to {} minutes", minutes);
        Ok(())
    }

    pub fn start(&mut self) {
        self.is_running = true;
        self.is_paused = false;
    }

    /// Flip the pause flag
    ///
    /// While idle this only flips a dormant bit: ticks are ignored either
    /// way and the next start clears it.
    pub fn toggle_pause(&mut self) {
        self.is_paused = !self.is_paused;
    }

    pub fn reset(&mut self) {
        self.remaining = self.target_duration;
        self.is_running = false;
        self.is_paused = false;
    }

    /// Store the notification volume as given
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    /// Advance the countdown by one unit
    ///
    /// At zero the expiry and the restart happen in the same tick, so there
    /// is no observable "finished" state unless restarting is disabled.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_active() {
            return TickOutcome::Idle;
        }

        if self.remaining > 0 {
            self.remaining -= 1;
            return TickOutcome::Advanced {
                remaining: self.remaining,
            };
        }

        self.remaining = self.target_duration;
        self.is_paused = false;
        self.is_running = self.restart_on_expiry;
        TickOutcome::Expired {
            volume: self.volume,
            restarted: self.restart_on_expiry,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::new(
            self.remaining,
            self.target_duration,
            self.is_running,
            self.is_paused,
        )
    }

    /// Whether ticks currently advance the countdown
    pub fn is_active(&self) -> bool {
        self.is_running && !self.is_paused
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn target_duration(&self) -> u32 {
        self.target_duration
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn restarts_on_expiry(&self) -> bool {
        self.restart_on_expiry
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(minutes: i64) -> TimerEngine {
        let mut engine = TimerEngine::with_duration(minutes).unwrap();
        engine.start();
        engine
    }

    fn run_to_zero(engine: &mut TimerEngine) {
        while engine.remaining() > 0 {
            engine.tick();
        }
    }

    #[test]
    fn starts_idle_at_twenty_five_minutes() {
        let engine = TimerEngine::new();
        assert_eq!(engine.target_duration(), 1500);
        assert_eq!(engine.remaining(), 1500);
        assert!(!engine.is_running());
        assert!(!engine.is_paused());
        assert_eq!(engine.volume(), 0.5);
        assert!(engine.restarts_on_expiry());
    }

    #[test]
    fn tick_decrements_by_exactly_one() {
        let mut engine = running(2);
        engine.set_volume(0.3);
        let before = engine.clone();

        assert_eq!(engine.tick(), TickOutcome::Advanced { remaining: 119 });
        assert_eq!(engine.remaining(), before.remaining() - 1);
        assert_eq!(engine.target_duration(), before.target_duration());
        assert_eq!(engine.is_running(), before.is_running());
        assert_eq!(engine.is_paused(), before.is_paused());
        assert_eq!(engine.volume(), before.volume());
    }

    #[test]
    fn tick_is_ignored_when_idle_or_paused() {
        let mut engine = TimerEngine::new();
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(engine.remaining(), 1500);

        engine.start();
        engine.toggle_pause();
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(engine.remaining(), 1500);
    }

    #[test]
    fn expiry_restarts_with_current_volume() {
        let mut engine = running(1);
        run_to_zero(&mut engine);
        engine.set_volume(0.8);

        let outcome = engine.tick();
        assert_eq!(
            outcome,
            TickOutcome::Expired {
                volume: 0.8,
                restarted: true
            }
        );
        assert_eq!(engine.remaining(), engine.target_duration());
        assert!(engine.is_running());
        assert!(!engine.is_paused());
    }

    #[test]
    fn expiry_without_restart_returns_to_idle() {
        let mut engine = TimerEngine::with_duration(1)
            .unwrap()
            .restart_on_expiry(false);
        engine.start();
        run_to_zero(&mut engine);

        let outcome = engine.tick();
        assert_eq!(
            outcome,
            TickOutcome::Expired {
                volume: 0.5,
                restarted: false
            }
        );
        assert_eq!(engine.remaining(), 60);
        assert!(!engine.is_running());
        assert_eq!(engine.tick(), TickOutcome::Idle);
    }

    #[test]
    fn start_is_idempotent() {
        let mut once = TimerEngine::new();
        once.start();
        let mut twice = TimerEngine::new();
        twice.start();
        twice.start();
        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn start_does_not_touch_remaining() {
        let mut engine = running(1);
        engine.tick();
        engine.start();
        assert_eq!(engine.remaining(), 59);
    }

    #[test]
    fn reset_clears_every_flag_combination() {
        for (run, pause) in [(false, false), (false, true), (true, false), (true, true)] {
            let mut engine = TimerEngine::with_duration(3).unwrap();
            if run {
                engine.start();
                engine.tick();
            }
            if pause {
                engine.toggle_pause();
            }

            engine.reset();
            assert!(!engine.is_running());
            assert!(!engine.is_paused());
            assert_eq!(engine.remaining(), 180);
        }
    }

    #[test]
    fn progress_runs_from_zero_to_one() {
        let mut engine = TimerEngine::new();
        engine.start();
        assert_eq!(engine.snapshot().progress_fraction, 0.0);

        let mut engine = running(1);
        for _ in 0..59 {
            engine.tick();
        }
        assert!(engine.snapshot().progress_fraction < 1.0);
        engine.tick();
        assert_eq!(engine.remaining(), 0);
        assert_eq!(engine.snapshot().progress_fraction, 1.0);
    }

    #[test]
    fn out_of_range_durations_change_nothing() {
        let mut engine = running(7);
        engine.tick();
        let before = engine.snapshot();

        for minutes in [0, 1000, -5] {
            assert!(matches!(
                engine.set_duration(minutes),
                Err(TimerError::InvalidDuration(m)) if m == minutes
            ));
            assert_eq!(engine.snapshot(), before);
        }
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        let mut engine = TimerEngine::new();
        engine.set_duration(1).unwrap();
        assert_eq!(engine.target_duration(), 60);
        engine.set_duration(999).unwrap();
        assert_eq!(engine.target_duration(), 999 * 60);
        assert_eq!(engine.snapshot().display, "999:00");
    }

    #[test]
    fn set_duration_returns_to_idle() {
        let mut engine = running(5);
        engine.tick();
        engine.toggle_pause();

        engine.set_duration(10).unwrap();
        assert_eq!(engine.remaining(), 600);
        assert!(!engine.is_running());
        assert!(!engine.is_paused());
    }

    #[test]
    fn volume_is_stored_unclamped() {
        let mut engine = TimerEngine::new();
        engine.set_volume(1.7);
        assert_eq!(engine.volume(), 1.7);
        engine.set_volume(-0.2);
        assert_eq!(engine.volume(), -0.2);
    }

    #[test]
    fn five_minute_countdown_rolls_over() {
        let mut engine = running(5);
        let mut expiries = 0;

        for _ in 0..300 {
            if let TickOutcome::Expired { .. } = engine.tick() {
                expiries += 1;
            }
        }
        let at_zero = engine.snapshot();
        assert_eq!((at_zero.minutes, at_zero.seconds), (0, 0));
        assert_eq!(expiries, 0);

        if let TickOutcome::Expired { .. } = engine.tick() {
            expiries += 1;
        }
        let rolled = engine.snapshot();
        assert_eq!((rolled.minutes, rolled.seconds), (5, 0));
        assert!(rolled.is_running);
        assert_eq!(expiries, 1);
    }

    #[test]
    fn paused_ticks_are_no_ops() {
        let mut engine = TimerEngine::new();
        engine.start();
        engine.tick();
        engine.toggle_pause();
        let paused = engine.snapshot();

        for _ in 0..10 {
            engine.tick();
        }
        assert_eq!(engine.snapshot(), paused);

        engine.toggle_pause();
        engine.tick();
        assert_eq!(engine.remaining(), paused.remaining_seconds - 1);
    }

    #[test]
    fn dormant_pause_is_cleared_by_start() {
        let mut engine = TimerEngine::new();
        engine.toggle_pause();
        assert!(engine.is_paused());
        assert_eq!(engine.tick(), TickOutcome::Idle);

        engine.start();
        assert!(!engine.is_paused());
        assert!(engine.is_active());
    }
}
