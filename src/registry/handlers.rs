use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument, warn};

use super::models::SlotSummary;
use crate::shared::{AppError, AppState};

/// HTTP handler for listing every game slot
///
/// GET /games
#[instrument(name = "list_games", skip(state))]
pub async fn list_games(State(state): State<AppState>) -> Json<Vec<SlotSummary>> {
    let games = state.registry.list();
    info!(slot_count = games.len(), "Game slots listed");
    Json(games)
}

/// HTTP handler for a single game slot
///
/// GET /games/:idx
#[instrument(name = "get_game", skip(state))]
pub async fn get_game(
    State(state): State<AppState>,
    Path(idx): Path<usize>,
) -> Result<Json<SlotSummary>, AppError> {
    let summary = state.registry.summary(idx).ok_or_else(|| {
        warn!(slot = idx, "Unknown game slot requested");
        AppError::NotFound(format!("No game slot {}", idx))
    })?;
    Ok(Json(summary))
}
