// Library crate for the memory game server
// This file exposes the public API for the binary and integration tests

pub mod bot;
pub mod config;
pub mod game;
pub mod registry;
pub mod shared;
pub mod websockets;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types for easier access in tests
pub use bot::{BotActor, BotDifficulty, BotMemory, BotProfile, BotStrategy, MemoryStrategy};
pub use config::ServerConfig;
pub use game::{
    Board, GameError, GameSession, Move, Notification, PlayerId, PlayerSpec, SessionConfig,
    SessionEnd, SessionOutcome, SessionStats,
};
pub use registry::{SessionRegistry, SlotStatus, SlotSummary};
pub use shared::{AppError, AppState};
pub use websockets::{websocket_handler, Connection, SocketError, SocketWrapper};

/// Builds the HTTP router: the slot listing and the player WebSocket.
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/games", get(registry::list_games))
        .route("/games/:idx", get(registry::get_game))
        .route("/game", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
