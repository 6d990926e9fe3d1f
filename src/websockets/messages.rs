use serde::{Deserialize, Serialize};

use crate::game::{Notification, PairId};
use crate::registry::SlotSummary;

/// Client -> Server messages, tagged by a `Type` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type", rename_all_fields = "PascalCase")]
pub enum ClientMessage {
    NewGame {
        idx: usize,
        tmax: i64,
        #[serde(default)]
        opp_bot: u8,
        name: String,
    },
    JoinGame {
        idx: usize,
        name: String,
    },
    Flip {
        tile: i64,
    },
    End,
}

/// Server -> Client messages, tagged by a `Type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type", rename_all_fields = "PascalCase")]
pub enum ServerMessage {
    GamesInProgress {
        games: Vec<SlotSummary>,
    },
    Seated {
        idx: usize,
        player: u8,
        tmax: usize,
    },
    Flipped {
        tile: usize,
        my_tile: bool,
        value: PairId,
    },
    Hidden {
        tile1: usize,
        tile2: usize,
    },
    Removed {
        tile1: usize,
        tile2: usize,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Serializes the message; these enums always encode.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"Type":"Error","Message":"encoding failed: {}"}}"#, e)
        })
    }
}

impl From<Notification> for ServerMessage {
    fn from(notification: Notification) -> Self {
        match notification {
            Notification::Flip { tile, value } => ServerMessage::Flipped {
                tile,
                my_tile: true,
                value,
            },
            Notification::OpponentFlip { tile, value } => ServerMessage::Flipped {
                tile,
                my_tile: false,
                value,
            },
            Notification::Hide { first, second } => ServerMessage::Hidden {
                tile1: first,
                tile2: second,
            },
            Notification::Remove { first, second } => ServerMessage::Removed {
                tile1: first,
                tile2: second,
            },
        }
    }
}
