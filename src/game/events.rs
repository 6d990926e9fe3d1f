use std::{fmt, str::FromStr};

use super::{
    board::{PairId, MAX_WIRE_TILES},
    errors::GameError,
    player::PlayerId,
};

/// A request sent by a player to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Turn the tile at this index face-up.
    Flip(usize),
    /// The player has nothing left to flip; asks the session to check for the end of the round.
    NoMove,
}

/// A fact about the board sent by the session to one player.
///
/// `Flip` and `OpponentFlip` describe the same change from the two players'
/// points of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Flip { tile: usize, value: PairId },
    OpponentFlip { tile: usize, value: PairId },
    Hide { first: usize, second: usize },
    Remove { first: usize, second: usize },
}

/// A notification addressed to one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: PlayerId,
    pub notification: Notification,
}

impl Delivery {
    pub fn to(recipient: PlayerId, notification: Notification) -> Self {
        Self {
            recipient,
            notification,
        }
    }
}

// Compact op-code encoding used by legacy clients: one letter followed by
// zero-padded three digit fields.

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Flip(tile) => write!(f, "F{:03}", tile),
            Move::NoMove => write!(f, "N"),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Flip { tile, value } => write!(f, "F{:03}{:03}", tile, value),
            Notification::OpponentFlip { tile, value } => write!(f, "O{:03}{:03}", tile, value),
            Notification::Hide { first, second } => write!(f, "H{:03}{:03}", first, second),
            Notification::Remove { first, second } => write!(f, "R{:03}{:03}", first, second),
        }
    }
}

fn field(raw: &str, text: &str) -> Result<usize, GameError> {
    if raw.len() != 3 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GameError::protocol(format!(
            "malformed field {:?} in {:?}",
            raw, text
        )));
    }
    raw.parse::<usize>()
        .map_err(|e| GameError::protocol(format!("malformed field in {:?}: {}", text, e)))
}

fn check_bounds(tile: usize, tiles: usize, text: &str) -> Result<usize, GameError> {
    if tile >= tiles {
        return Err(GameError::protocol(format!(
            "tile {} out of range for {} tiles in {:?}",
            tile, tiles, text
        )));
    }
    Ok(tile)
}

impl Move {
    /// Parses a move and checks its tile index against the board size.
    pub fn parse_bounded(text: &str, tiles: usize) -> Result<Self, GameError> {
        let mv: Move = text.parse()?;
        if let Move::Flip(tile) = mv {
            check_bounds(tile, tiles, text)?;
        }
        Ok(mv)
    }

    /// Builds a flip from an index supplied by a client, rejecting anything
    /// that does not name a tile on a board of `tiles` tiles.
    pub fn flip_checked(tile: i64, tiles: usize) -> Result<Self, GameError> {
        let tile = usize::try_from(tile)
            .map_err(|_| GameError::protocol(format!("negative tile index {}", tile)))?;
        check_bounds(tile, tiles, "Flip")?;
        Ok(Move::Flip(tile))
    }
}

impl FromStr for Move {
    type Err = GameError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if !text.is_ascii() {
            return Err(GameError::protocol(format!("non-ascii move {:?}", text)));
        }
        match text.split_at_checked(1) {
            Some(("N", "")) => Ok(Move::NoMove),
            Some(("F", rest)) => Ok(Move::Flip(field(rest, text)?)),
            _ => Err(GameError::protocol(format!("unknown move {:?}", text))),
        }
    }
}

impl Notification {
    /// Tile indices this notification refers to.
    pub fn tiles(&self) -> (usize, Option<usize>) {
        match *self {
            Notification::Flip { tile, .. } | Notification::OpponentFlip { tile, .. } => {
                (tile, None)
            }
            Notification::Hide { first, second } | Notification::Remove { first, second } => {
                (first, Some(second))
            }
        }
    }

    /// Parses a notification and checks every index against the board size.
    pub fn parse_bounded(text: &str, tiles: usize) -> Result<Self, GameError> {
        let notification: Notification = text.parse()?;
        let (first, second) = notification.tiles();
        check_bounds(first, tiles, text)?;
        if let Some(second) = second {
            check_bounds(second, tiles, text)?;
        }
        Ok(notification)
    }
}

impl FromStr for Notification {
    type Err = GameError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if !text.is_ascii() || text.len() != 7 {
            return Err(GameError::protocol(format!(
                "notification {:?} is not 7 ascii characters",
                text
            )));
        }
        let a = field(&text[1..4], text)?;
        let b = field(&text[4..7], text)?;
        let value = || {
            PairId::try_from(b)
                .ok()
                .filter(|v| (*v as usize) <= MAX_WIRE_TILES / 2)
                .ok_or_else(|| GameError::protocol(format!("pair id {} out of range", b)))
        };
        match &text[0..1] {
            "F" => Ok(Notification::Flip {
                tile: a,
                value: value()?,
            }),
            "O" => Ok(Notification::OpponentFlip {
                tile: a,
                value: value()?,
            }),
            "H" => Ok(Notification::Hide {
                first: a,
                second: b,
            }),
            "R" => Ok(Notification::Remove {
                first: a,
                second: b,
            }),
            op => Err(GameError::protocol(format!("unknown notification op {:?}", op))),
        }
    }
}
