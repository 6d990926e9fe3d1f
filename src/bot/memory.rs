use rand::{Rng, RngCore};
use std::fmt;
use tracing::debug;

use crate::game::{Notification, PairId};

/// What a bot believes about one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall {
    FaceDown,
    Removed,
    FaceUpMe,
    FaceUpOpponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RememberedTile {
    pub recall: Recall,
    pub value: Option<PairId>,
}

/// A bot's private picture of the board, built only from the notifications it
/// has received. Values of hidden tiles can be forgotten, so this picture may
/// be less complete than the real board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotMemory {
    tiles: Vec<RememberedTile>,
}

impl BotMemory {
    pub fn new(tile_count: usize) -> Self {
        Self {
            tiles: vec![
                RememberedTile {
                    recall: Recall::FaceDown,
                    value: None,
                };
                tile_count
            ],
        }
    }

    pub fn tiles(&self) -> &[RememberedTile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn face_down(&self) -> impl Iterator<Item = (usize, &RememberedTile)> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.recall == Recall::FaceDown)
    }

    pub fn face_down_count(&self) -> usize {
        self.face_down().count()
    }

    /// Folds one notification into memory. On a hide, both values are
    /// forgotten together with probability `100 - memory_percent` percent.
    pub fn apply(&mut self, notification: &Notification, memory_percent: u8, rng: &mut dyn RngCore) {
        match *notification {
            Notification::Flip { tile, value } => self.reveal(tile, value, Recall::FaceUpMe),
            Notification::OpponentFlip { tile, value } => {
                self.reveal(tile, value, Recall::FaceUpOpponent)
            }
            Notification::Hide { first, second } => {
                let forget = rng.random_range(0..100u8) >= memory_percent;
                for idx in [first, second] {
                    if let Some(tile) = self.tiles.get_mut(idx) {
                        tile.recall = Recall::FaceDown;
                        if forget {
                            tile.value = None;
                        }
                    }
                }
                if forget {
                    debug!(first, second, "Bot forgot hidden tiles");
                }
            }
            Notification::Remove { first, second } => {
                for idx in [first, second] {
                    if let Some(tile) = self.tiles.get_mut(idx) {
                        tile.recall = Recall::Removed;
                    }
                }
            }
        }
    }

    fn reveal(&mut self, idx: usize, value: PairId, recall: Recall) {
        if let Some(tile) = self.tiles.get_mut(idx) {
            tile.recall = recall;
            tile.value = Some(value);
        }
    }
}

/// Two-row dump: remembered values, then what the bot thinks each tile shows.
impl fmt::Display for BotMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tile in &self.tiles {
            match tile.value {
                Some(value) => write!(f, "|{:02}", value)?,
                None => write!(f, "|--")?,
            }
        }
        writeln!(f, "|")?;
        for tile in &self.tiles {
            let code = match tile.recall {
                Recall::FaceDown => "--",
                Recall::Removed => "  ",
                Recall::FaceUpMe => "Me",
                Recall::FaceUpOpponent => "Op",
            };
            write!(f, "|{}", code)?;
        }
        write!(f, "|")
    }
}
