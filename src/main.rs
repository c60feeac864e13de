//! Timer Boss - a countdown timer server
//!
//! This is the main entry point for the timer-boss application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use timer_boss::{
    api::create_router,
    config::Config,
    services::{check_player_available, BellNotifier, CommandNotifier, LogNotifier, Notifier},
    state::{AppState, TimerEngine},
    utils::shutdown_signal,
};

/// Pick the notification backend, falling back to logging when the player is missing
async fn build_notifier(config: &Config) -> Arc<dyn Notifier> {
    if config.silent {
        return Arc::new(LogNotifier);
    }
    if config.bell {
        return Arc::new(BellNotifier);
    }

    match check_player_available(config.player).await {
        Ok(()) => {
            if !config.sound.exists() {
                warn!("Sound file {} not found, playback will fail", config.sound.display());
            }
            Arc::new(CommandNotifier::new(config.player, config.sound.clone()))
        }
        Err(e) => {
            warn!("{}, expiries will only be logged", e);
            Arc::new(LogNotifier)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timer_boss={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timer-boss server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, duration={}min, volume={}, repeat={}",
          config.host, config.port, config.minutes, config.volume, !config.no_repeat);

    if !(0.0..=1.0).contains(&config.volume) {
        warn!("Volume {} is outside 0.0-1.0, players will clamp it", config.volume);
    }

    let engine = TimerEngine::with_duration(config.minutes)?
        .volume_preset(config.volume)
        .restart_on_expiry(!config.no_repeat);
    let notifier = build_notifier(&config).await;
    info!("Using {} notifier", notifier.name());

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        engine,
        notifier,
        config.tick_period(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start            - Start the countdown");
    info!("  POST /pause            - Pause or resume");
    info!("  POST /reset            - Reset to the full duration");
    info!("  POST /duration         - Set duration ({{\"minutes\": n}})");
    info!("  POST /preset/:minutes  - Apply a preset (5, 10, 20, 30)");
    info!("  GET  /presets          - List presets");
    info!("  POST /volume           - Set volume ({{\"volume\": v}})");
    info!("  GET  /status           - Current timer state");
    info!("  GET  /events           - Server-sent snapshot stream");
    info!("  GET  /health           - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown()?;
    info!("Server shutdown complete");
    Ok(())
}
