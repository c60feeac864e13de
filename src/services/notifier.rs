//! Expiry notification backends

use std::path::PathBuf;

use async_trait::async_trait;
use clap::ValueEnum;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, info};

use crate::error::TimerError;

/// Something that can announce the end of a countdown
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Play the expiry notification at `volume` (nominally 0.0 to 1.0)
    async fn play_notification(&self, volume: f64) -> Result<(), TimerError>;

    fn name(&self) -> &str;
}

/// External audio players the command notifier knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Player {
    /// PulseAudio / PipeWire
    Paplay,
    /// macOS
    Afplay,
    /// FFmpeg's player
    Ffplay,
    /// ALSA, no volume control
    Aplay,
}

impl Player {
    pub fn program(&self) -> &'static str {
        match self {
            Player::Paplay => "paplay",
            Player::Afplay => "afplay",
            Player::Ffplay => "ffplay",
            Player::Aplay => "aplay",
        }
    }

    /// Arguments for playing `sound` at `volume`, translated to the player's scale
    pub fn args(&self, sound: &str, volume: f64) -> Vec<String> {
        let volume = volume.clamp(0.0, 1.0);
        match self {
            Player::Paplay => vec![
                format!("--volume={}", (volume * 65536.0).round() as u32),
                sound.to_string(),
            ],
            Player::Afplay => vec!["-v".to_string(), format!("{:.2}", volume), sound.to_string()],
            Player::Ffplay => vec![
                "-nodisp".to_string(),
                "-autoexit".to_string(),
                "-loglevel".to_string(),
                "quiet".to_string(),
                "-volume".to_string(),
                ((volume * 100.0).round() as u32).to_string(),
                sound.to_string(),
            ],
            Player::Aplay => vec!["-q".to_string(), sound.to_string()],
        }
    }
}

/// Plays a sound file through an external player process
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    player: Player,
    sound: PathBuf,
}

impl CommandNotifier {
    pub fn new(player: Player, sound: impl Into<PathBuf>) -> Self {
        Self {
            player,
            sound: sound.into(),
        }
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn play_notification(&self, volume: f64) -> Result<(), TimerError> {
        let sound = self.sound.to_string_lossy();
        debug!("Playing {} with {} at volume {}", sound, self.player.program(), volume);

        let output = Command::new(self.player.program())
            .args(self.player.args(&sound, volume))
            .output()
            .await
            .map_err(|e| {
                TimerError::Playback(format!("failed to run {}: {}", self.player.program(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TimerError::Playback(format!(
                "{} exited with {}: {}",
                self.player.program(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        self.player.program()
    }
}

/// Rings the terminal bell
#[derive(Debug, Clone, Default)]
pub struct BellNotifier;

#[async_trait]
impl Notifier for BellNotifier {
    async fn play_notification(&self, volume: f64) -> Result<(), TimerError> {
        if volume <= 0.0 {
            debug!("Volume is zero, skipping bell");
            return Ok(());
        }
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(b"\x07")
            .await
            .map_err(|e| TimerError::Playback(format!("failed to ring bell: {}", e)))?;
        stdout
            .flush()
            .await
            .map_err(|e| TimerError::Playback(format!("failed to flush bell: {}", e)))
    }

    fn name(&self) -> &str {
        "bell"
    }
}

/// Only logs the expiry; used when no audio output is wanted or available
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn play_notification(&self, volume: f64) -> Result<(), TimerError> {
        info!("Timer expired (notification volume {:.1})", volume);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Check that the player binary can be launched
pub async fn check_player_available(player: Player) -> Result<(), TimerError> {
    let probe = match player {
        Player::Afplay => "-h",
        _ => "--version",
    };

    Command::new(player.program())
        .arg(probe)
        .output()
        .await
        .map_err(|_| TimerError::Playback(format!("{} is not available", player.program())))?;

    info!("{} is available", player.program());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paplay_volume_uses_pulse_scale() {
        let args = Player::Paplay.args("ding.wav", 0.5);
        assert_eq!(args, vec!["--volume=32768".to_string(), "ding.wav".to_string()]);
    }

    #[test]
    fn ffplay_volume_is_a_percentage() {
        let args = Player::Ffplay.args("ding.wav", 0.3);
        assert!(args.contains(&"30".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("ding.wav"));
    }

    #[test]
    fn player_volume_is_clamped_at_the_process_boundary() {
        assert_eq!(Player::Afplay.args("a.wav", 3.0)[1], "1.00");
        assert_eq!(Player::Paplay.args("a.wav", -1.0)[0], "--volume=0");
    }

    #[tokio::test]
    async fn missing_player_binary_is_a_playback_error() {
        let notifier = CommandNotifier::new(Player::Aplay, "/nonexistent/ding.wav");
        // Either aplay is absent or it fails on the missing file
        let result = notifier.play_notification(0.5).await;
        assert!(matches!(result, Err(TimerError::Playback(_))));
    }

    #[tokio::test]
    async fn bell_rings_without_blocking_the_runtime() {
        assert!(BellNotifier.play_notification(0.5).await.is_ok());
        assert!(BellNotifier.play_notification(0.0).await.is_ok());
        assert_eq!(BellNotifier.name(), "bell");
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        assert!(LogNotifier.play_notification(0.0).await.is_ok());
        assert_eq!(LogNotifier.name(), "log");
    }
}
