//! Periodic tick source for the countdown

use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, error};

use crate::state::AppState;

/// Owned handle to the running tick task
///
/// Every start or stop bumps the generation; a tick carrying an older
/// generation is discarded, so a task that woke up just before being
/// cancelled can never advance the countdown a second time.
#[derive(Debug, Default)]
pub struct TickDriver {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl TickDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the tick task unless one is already running
    pub fn start(&mut self, state: Arc<AppState>, period: Duration) {
        if self.is_active() {
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        debug!("Starting tick driver (generation {})", generation);
        self.handle = Some(tokio::spawn(tick_task(state, generation, period)));
    }

    /// Cancel the tick task, if any
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Stopping tick driver (generation {})", self.generation);
            handle.abort();
            self.generation += 1;
        }
    }

    /// Forget the running task without aborting it; it is about to exit on its own
    pub fn release(&mut self) {
        if self.handle.take().is_some() {
            self.generation += 1;
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Calls [`AppState::tick`] once per `period` until the state says to stop
///
/// The first tick fires one full period after the task starts.
pub async fn tick_task(state: Arc<AppState>, generation: u64, period: Duration) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match state.tick(generation) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                error!("Failed to advance timer: {}", e);
                break;
            }
        }
    }

    debug!("Tick task for generation {} finished", generation);
}
