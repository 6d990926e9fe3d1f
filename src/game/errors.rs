/// Errors raised by the game core before or while a session runs.
///
/// Benign races (flipping a tile that is no longer face-down, a `NoMove`
/// while tiles remain) are not errors and never produce one of these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),
    #[error("Game session has ended")]
    SessionClosed,
}

impl GameError {
    pub fn configuration(message: impl Into<String>) -> Self {
        GameError::Configuration(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        GameError::ProtocolViolation(message.into())
    }
}
