//! External collaborators
//!
//! The audio side of the timer: the notifier capability and its backends.

pub mod notifier;

// Re-export main types
pub use notifier::{
    check_player_available, BellNotifier, CommandNotifier, LogNotifier, Notifier, Player,
};
