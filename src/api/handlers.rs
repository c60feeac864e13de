//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc, time::Duration};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{error, info, warn};

use crate::{error::TimerError, state::{AppState, TimerSnapshot}};
use super::responses::{
    ApiResponse, DurationRequest, HealthResponse, PresetsResponse, StatusResponse, VolumeRequest,
};

/// Durations offered as one-tap presets, in minutes
pub const PRESET_MINUTES: [i64; 4] = [5, 10, 20, 30];

type CommandResult = Result<(StatusCode, Json<ApiResponse>), StatusCode>;

/// Turn a command result into a response
///
/// Rejected input answers 422 with the unchanged timer state; anything else
/// that failed is a server error.
fn command_response(
    state: &AppState,
    result: Result<TimerSnapshot, TimerError>,
    message: &str,
) -> CommandResult {
    match result {
        Ok(snapshot) => Ok((
            StatusCode::OK,
            Json(ApiResponse::from_snapshot(message.to_string(), snapshot)),
        )),
        Err(e) if e.is_rejection() => {
            warn!("Rejected command: {}", e);
            let snapshot = state.snapshot().map_err(|e| {
                error!("Failed to read timer state: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::rejected(e.to_string(), snapshot)),
            ))
        }
        Err(e) => {
            error!("Timer command failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    let result = state.start();
    command_response(&state, result, "Timer started")
}

/// Handle POST /pause - pause or resume
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    let result = state.toggle_pause();
    let message = match &result {
        Ok(snapshot) if snapshot.is_running && snapshot.is_paused => "Timer paused",
        Ok(snapshot) if snapshot.is_running => "Timer resumed",
        _ => "Timer is not running",
    };
    command_response(&state, result, message)
}

/// Handle POST /reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> CommandResult {
    let result = state.reset();
    command_response(&state, result, "Timer reset")
}

/// Handle POST /duration
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationRequest>,
) -> CommandResult {
    let result = state.set_duration(request.minutes);
    let message = format!("Duration set to {} minutes", request.minutes);
    command_response(&state, result, &message)
}

/// Handle POST /preset/:minutes
pub async fn preset_handler(
    State(state): State<Arc<AppState>>,
    Path(minutes): Path<i64>,
) -> CommandResult {
    if !PRESET_MINUTES.contains(&minutes) {
        info!("Unknown preset requested: {} minutes", minutes);
        return Err(StatusCode::NOT_FOUND);
    }
    let result = state.set_duration(minutes);
    let message = format!("Preset {} minutes applied", minutes);
    command_response(&state, result, &message)
}

/// Handle GET /presets
pub async fn presets_handler() -> Json<PresetsResponse> {
    Json(PresetsResponse {
        presets: PRESET_MINUTES.to_vec(),
    })
}

/// Handle POST /volume
///
/// The engine keeps whatever it is given; the 0.0-1.0 range is enforced here.
pub async fn volume_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VolumeRequest>,
) -> CommandResult {
    let result = if (0.0..=1.0).contains(&request.volume) {
        state.set_volume(request.volume)
    } else {
        Err(TimerError::InvalidVolume(request.volume))
    };
    let message = format!("Volume set to {}%", (request.volume * 100.0).round());
    command_response(&state, result, &message)
}

/// Handle GET /status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let read = || -> Result<(TimerSnapshot, f64, bool), TimerError> {
        Ok((state.snapshot()?, state.volume()?, state.restarts_on_expiry()?))
    };
    let (timer, volume, restart_on_expiry) = read().map_err(|e| {
        error!("Failed to read timer state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        volume,
        restart_on_expiry,
        notifier: state.notifier.name().to_string(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - stream a snapshot on every change, starting with the current one
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    let stream = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        let event = Event::default()
            .event("snapshot")
            .json_data(&snapshot)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));
        Some((Ok::<_, Infallible>(event), (rx, false)))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// Handle GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
