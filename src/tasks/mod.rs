//! Background tasks module
//!
//! The tick source that drives the countdown while it is active.

pub mod tick_driver;

// Re-export main types
pub use tick_driver::{tick_task, TickDriver};
