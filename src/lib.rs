//! Timer Boss - a countdown timer server
//!
//! This library provides a countdown timer that can be started, paused,
//! reset and resized, reports its progress, and plays a notification when
//! it reaches zero before starting over.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use state::{AppState, TimerEngine, TimerSnapshot};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
