//! Shared application state: the timer, its tick driver and its notifier

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{TickOutcome, TimerEngine, TimerSnapshot};
use crate::{
    error::TimerError,
    services::Notifier,
    tasks::TickDriver,
    utils::format_uptime,
};

/// State shared between the HTTP handlers and the tick task
///
/// Lock order is always `driver` then `engine`, and neither lock is held
/// across an `.await`.
pub struct AppState {
    /// The countdown itself
    pub engine: Arc<Mutex<TimerEngine>>,
    /// Handle to the periodic tick task
    pub driver: Arc<Mutex<TickDriver>>,
    /// Audio collaborator called on expiry
    pub notifier: Arc<dyn Notifier>,
    pub tick_period: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for snapshot updates
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine", &self.engine)
            .field("notifier", &self.notifier.name())
            .field("tick_period", &self.tick_period)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        engine: TimerEngine,
        notifier: Arc<dyn Notifier>,
        tick_period: Duration,
    ) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

        Self {
            engine: Arc::new(Mutex::new(engine)),
            driver: Arc::new(Mutex::new(TickDriver::new())),
            notifier,
            tick_period,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, TimerEngine>, TimerError> {
        self.engine
            .lock()
            .map_err(|e| TimerError::LockPoisoned(format!("timer engine: {}", e)))
    }

    fn lock_driver(&self) -> Result<MutexGuard<'_, TickDriver>, TimerError> {
        self.driver
            .lock()
            .map_err(|e| TimerError::LockPoisoned(format!("tick driver: {}", e)))
    }

    /// Apply a command to the engine, then bring the tick driver in line
    /// with whether the countdown should be advancing
    fn apply<F>(self: &Arc<Self>, action: &str, command: F) -> Result<TimerSnapshot, TimerError>
    where
        F: FnOnce(&mut TimerEngine) -> Result<(), TimerError>,
    {
        let mut driver = self.lock_driver()?;
        let mut engine = self.lock_engine()?;

        command(&mut engine)?;
        let active = engine.is_active();
        let snapshot = engine.snapshot();
        drop(engine);

        if active {
            driver.start(Arc::clone(self), self.tick_period);
        } else {
            driver.stop();
        }

        // Publish while still holding the driver lock so subscribers see
        // snapshots in the order the commands were applied
        self.record_action(action);
        self.publish(snapshot.clone());
        drop(driver);
        Ok(snapshot)
    }

    /// Set a new countdown duration in minutes; returns to idle
    pub fn set_duration(self: &Arc<Self>, minutes: i64) -> Result<TimerSnapshot, TimerError> {
        self.apply("set-duration", |engine| engine.set_duration(minutes))
    }

    pub fn start(self: &Arc<Self>) -> Result<TimerSnapshot, TimerError> {
        info!("Starting timer");
        self.apply("start", |engine| {
            engine.start();
            Ok(())
        })
    }

    pub fn toggle_pause(self: &Arc<Self>) -> Result<TimerSnapshot, TimerError> {
        let snapshot = self.apply("toggle-pause", |engine| {
            engine.toggle_pause();
            Ok(())
        })?;
        info!("Timer is now {}", snapshot.status_label());
        Ok(snapshot)
    }

    pub fn reset(self: &Arc<Self>) -> Result<TimerSnapshot, TimerError> {
        info!("Resetting timer");
        self.apply("reset", |engine| {
            engine.reset();
            Ok(())
        })
    }

    /// Store the volume used by the next expiry notification
    pub fn set_volume(self: &Arc<Self>, volume: f64) -> Result<TimerSnapshot, TimerError> {
        info!("Setting volume to {}", volume);
        self.apply("set-volume", |engine| {
            engine.set_volume(volume);
            Ok(())
        })
    }

    /// Advance the countdown on behalf of the tick task
    ///
    /// Returns whether the task should keep ticking. Ticks from a stale
    /// generation are dropped without touching the engine.
    pub fn tick(&self, generation: u64) -> Result<bool, TimerError> {
        let mut driver = self.lock_driver()?;
        if driver.generation() != generation {
            debug!("Dropping stale tick from generation {}", generation);
            return Ok(false);
        }

        let mut engine = self.lock_engine()?;
        let outcome = engine.tick();
        let snapshot = engine.snapshot();
        drop(engine);

        let keep_ticking = match outcome {
            TickOutcome::Idle => false,
            TickOutcome::Advanced { remaining } => {
                debug!("Tick: {} seconds remaining", remaining);
                true
            }
            TickOutcome::Expired { volume, restarted } => {
                if restarted {
                    info!("Timer expired, restarting from {}", snapshot.display);
                } else {
                    info!("Timer expired, returning to idle");
                }
                self.dispatch_notification(volume);
                restarted
            }
        };

        if !keep_ticking {
            driver.release();
        }

        if outcome != TickOutcome::Idle {
            self.publish(snapshot);
        }
        drop(driver);
        Ok(keep_ticking)
    }

    /// Fire and forget: playback failures are logged, never propagated
    fn dispatch_notification(&self, volume: f64) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            match notifier.play_notification(volume).await {
                Ok(()) => debug!("Notification played via {}", notifier.name()),
                Err(e) => warn!("{} notifier failed: {}", notifier.name(), e),
            }
        });
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to send snapshot update: {}", e);
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Current display state
    pub fn snapshot(&self) -> Result<TimerSnapshot, TimerError> {
        Ok(self.lock_engine()?.snapshot())
    }

    pub fn volume(&self) -> Result<f64, TimerError> {
        Ok(self.lock_engine()?.volume())
    }

    pub fn restarts_on_expiry(&self) -> Result<bool, TimerError> {
        Ok(self.lock_engine()?.restarts_on_expiry())
    }

    /// Receiver that sees every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Whether a tick task is currently scheduled
    pub fn is_ticking(&self) -> Result<bool, TimerError> {
        Ok(self.lock_driver()?.is_active())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Stop ticking ahead of process exit
    pub fn shutdown(&self) -> Result<(), TimerError> {
        self.lock_driver()?.stop();
        info!("Tick driver stopped");
        Ok(())
    }
}
