//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::{error, info, warn};

use crate::state::{AppState, Command, ResetConfirmation, Settings};
use super::responses::{
    ApiResponse, ErrorResponse, HealthResponse, HistoryEntry, IdentityRemarkRequest,
    RemarkRequest, ResetStatsRequest, StatsResponse, StatusResponse,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal(e: String) -> ApiError {
    error!("{}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e)))
}

fn run_command(state: &AppState, command: Command, message: &str) -> Result<Json<ApiResponse>, StatusCode> {
    match state.dispatch(command) {
        Ok(timer) => {
            info!("{} endpoint called", message);
            Ok(Json(ApiResponse::new(message.to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to dispatch {:?}: {}", command, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, Command::Start, "Start")
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, Command::Pause, "Pause")
}

/// Handle POST /timer/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, Command::Reset, "Reset")
}

/// Handle POST /timer/next - finish the running phase early
pub async fn next_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    run_command(&state, Command::ForceAdvance, "Next")
}

/// Handle GET /status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_snapshot() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
        last_message: state.get_last_message(),
    }))
}

/// Handle GET /settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Result<Json<Settings>, ApiError> {
    state
        .with_machine(|machine| machine.settings().clone())
        .map(Json)
        .map_err(internal)
}

/// Handle PUT /settings
pub async fn put_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    let result = state
        .with_machine(|machine| machine.update_settings(settings).map(|_| machine.settings().clone()))
        .map_err(internal)?;

    match result {
        Ok(saved) => Ok(Json(saved)),
        Err(e) => {
            warn!("Rejected settings update: {}", e);
            Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string()))))
        }
    }
}

/// Handle GET /stats
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    state
        .with_machine(|machine| StatsResponse::from(machine.statistics()))
        .map(Json)
        .map_err(internal)
}

/// Handle POST /stats/reset - requires `{"confirm": true}`
pub async fn reset_stats_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetStatsRequest>,
) -> Result<Json<StatsResponse>, ApiError> {
    let Some(confirmation) = ResetConfirmation::from_user(request.confirm) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("statistics reset requires confirm: true")),
        ));
    };

    state
        .with_machine(|machine| {
            machine.reset_statistics(confirmation);
            StatsResponse::from(machine.statistics())
        })
        .map(Json)
        .map_err(internal)
}

/// Handle GET /history - newest first, times in the configured clock format
pub async fn history_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    state
        .with_machine(|machine| {
            let use_24h = machine.settings().use_24h_format;
            machine
                .history()
                .iter()
                .map(|record| HistoryEntry::project(record, use_24h))
                .collect()
        })
        .map(Json)
        .map_err(internal)
}

/// Handle PUT /history/:id/remark
pub async fn remark_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<RemarkRequest>,
) -> Result<StatusCode, ApiError> {
    let updated = state
        .with_machine(|machine| machine.set_remark_by_id(id, &request.remark))
        .map_err(internal)?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("no history record with id {}", id))),
        ))
    }
}

/// Handle PUT /history/remark - record addressed by date, times and minutes.
/// Times are accepted as shown by GET /history in either clock format.
pub async fn identity_remark_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IdentityRemarkRequest>,
) -> Result<StatusCode, ApiError> {
    let updated = state
        .with_machine(|machine| machine.set_remark(&request.identity, &request.remark))
        .map_err(internal)?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("no history record matches")),
        ))
    }
}

/// Handle GET /export - plain text rows, or 204 when there is no history
pub async fn export_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let text = state
        .with_machine(|machine| machine.export().into_text())
        .map_err(internal)?;

    Ok(match text {
        Some(text) => ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
