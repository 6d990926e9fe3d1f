use async_trait::async_trait;
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket};
use futures::stream::StreamExt;

/// The few socket operations a player connection uses. Tests swap in an
/// in-memory socket.
#[async_trait]
pub trait SocketWrapper: Send {
    /// Writes one JSON text frame to the player.
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Next text frame from the player, or None once the player has gone.
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Transport failures; a player leaving normally is `Ok(None)`, not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SocketError {
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
}

/// Player sockets accepted by the `/game` upgrade.
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, json: String) -> Result<(), SocketError> {
        if let Err(e) = self.send(Message::Text(json)).await {
            return Err(SocketError::SendFailed(e.to_string()));
        }
        Ok(())
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // Binary, ping and pong frames carry nothing for us
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        let frame = CloseFrame {
            code: close_code::NORMAL,
            reason: "game over".into(),
        };
        self.send(Message::Close(Some(frame)))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}
