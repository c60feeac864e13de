//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::services::Player;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "timer-boss")]
#[command(about = "A countdown timer server with pause, reset, progress and an expiry sound")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial countdown duration in minutes (1-999)
    #[arg(short, long, default_value = "25", value_parser = clap::value_parser!(i64).range(1..=999))]
    pub minutes: i64,

    /// Initial notification volume (0.0-1.0)
    #[arg(long, default_value = "0.5")]
    pub volume: f64,

    /// Sound file played when the countdown reaches zero
    #[arg(short, long, default_value = "notification.wav")]
    pub sound: PathBuf,

    /// Audio player used for the notification sound
    #[arg(long, value_enum, default_value = "paplay")]
    pub player: Player,

    /// Ring the terminal bell instead of playing a sound file
    #[arg(long, conflicts_with = "silent")]
    pub bell: bool,

    /// Log expiries instead of making any sound
    #[arg(long)]
    pub silent: bool,

    /// Return to idle on expiry instead of restarting the countdown
    #[arg(long)]
    pub no_repeat: bool,

    /// Length of one tick in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_pomodoro() {
        let config = Config::try_parse_from(["timer-boss"]).unwrap();
        assert_eq!(config.minutes, 25);
        assert_eq!(config.volume, 0.5);
        assert_eq!(config.player, Player::Paplay);
        assert!(!config.no_repeat);
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn rejects_out_of_range_minutes() {
        assert!(Config::try_parse_from(["timer-boss", "--minutes", "0"]).is_err());
        assert!(Config::try_parse_from(["timer-boss", "--minutes", "1000"]).is_err());
        assert!(Config::try_parse_from(["timer-boss", "--minutes", "999"]).is_ok());
    }

    #[test]
    fn parses_player_and_flags() {
        let config = Config::try_parse_from([
            "timer-boss",
            "--player",
            "ffplay",
            "--no-repeat",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.player, Player::Ffplay);
        assert!(config.no_repeat);
        assert_eq!(config.log_level(), "debug");
    }
}
