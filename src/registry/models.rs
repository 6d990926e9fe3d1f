use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{GameError, HumanHandle, PlayerId, SessionStats};

/// Lifecycle of a session slot: `Empty -> Waiting -> Running`, then back to
/// `Empty` once the session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotStatus {
    #[default]
    Empty,
    Waiting,
    Running,
}

/// What the lobby shows about one slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SlotSummary {
    pub idx: usize,
    pub status: SlotStatus,
    pub tiles: usize,
    pub player1: Option<String>,
    pub player2: Option<String>,
    pub player2_is_bot: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub stats: SessionStats,
}

/// Request to open a slot as player one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameRequest {
    pub tiles: i64,
    /// 0 waits for a human opponent, 1.. picks a bot difficulty.
    pub opp_bot: u8,
    pub name: String,
}

/// Handed to the transport of a human who started or joined a game.
#[derive(Debug)]
pub struct SeatTicket {
    pub slot: usize,
    pub session_id: Uuid,
    pub player: PlayerId,
    pub tile_count: usize,
    pub handle: HumanHandle,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("No game slot {0}")]
    NoSuchSlot(usize),
    #[error("Game slot {0} is already in use")]
    SlotTaken(usize),
    #[error("Game slot {0} has no game waiting for a player")]
    NotWaiting(usize),
    #[error("Player name cannot be empty")]
    EmptyName,
    #[error("Unknown bot selector {0}")]
    UnknownBot(u8),
    #[error(transparent)]
    Game(#[from] GameError),
}
