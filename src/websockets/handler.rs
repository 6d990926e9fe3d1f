use axum::{
    extract::{ws::WebSocket, State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::registry::SessionRegistry;
use crate::shared::AppState;

use super::connection::Connection;

/// WebSocket endpoint for players
/// GET /game
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    info!("WebSocket connection requested");
    let registry = Arc::clone(&app_state.registry);
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, registry))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: WebSocket, registry: Arc<SessionRegistry>) {
    info!("WebSocket connection established");

    let connection = Connection::new(Box::new(socket), registry);
    match connection.run().await {
        Ok(()) => info!("WebSocket connection closed cleanly"),
        Err(e) => warn!(error = %e, "WebSocket connection error"),
    }
}
