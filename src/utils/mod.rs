//! Utility functions module
//!
//! Signal handling for shutdown and time formatting helpers.

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::{format_clock, format_uptime};
pub use signals::shutdown_signal;
