//! State management module
//!
//! The countdown state machine, its read-only snapshot, and the shared
//! application state that hosts both.

pub mod app_state;
pub mod snapshot;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use snapshot::TimerSnapshot;
pub use timer_state::{TickOutcome, TimerEngine};
