use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{errors::GameError, player::PlayerId};

/// Identifier shared by the two tiles of a pair. Pairs are numbered from 1.
pub type PairId = u16;

/// Wire indices are three decimal digits, which bounds the board size.
pub const MAX_WIRE_TILES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceState {
    FaceDown,
    FaceUp(PlayerId),
    WonBy(PlayerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub face: FaceState,
    pub value: PairId,
}

impl Tile {
    pub fn is_face_down(&self) -> bool {
        self.face == FaceState::FaceDown
    }
}

/// Checks a requested tile count before anything is built from it.
pub fn validate_tile_count(tiles: i64, max_tiles: usize) -> Result<usize, GameError> {
    if tiles <= 0 {
        return Err(GameError::configuration(format!(
            "tile count must be positive, got {}",
            tiles
        )));
    }
    if tiles % 2 != 0 {
        return Err(GameError::configuration(format!(
            "tile count must be even, got {}",
            tiles
        )));
    }
    let limit = max_tiles.min(MAX_WIRE_TILES);
    let tiles = usize::try_from(tiles)
        .ok()
        .filter(|t| *t <= limit)
        .ok_or_else(|| {
            GameError::configuration(format!("tile count {} exceeds limit {}", tiles, limit))
        })?;
    Ok(tiles)
}

/// The single authoritative board of a round.
///
/// Only the session task that owns a `Board` ever mutates it; everyone else
/// learns about it through notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    tiles: Vec<Tile>,
}

impl Board {
    /// Deals `tile_count / 2` pairs onto an empty board. Each tile of a pair
    /// lands on a random slot, probing forward (with wrap-around) past
    /// occupied slots.
    pub fn deal<R: Rng + ?Sized>(tile_count: usize, rng: &mut R) -> Result<Self, GameError> {
        if tile_count == 0 || tile_count % 2 != 0 || tile_count > MAX_WIRE_TILES {
            return Err(GameError::configuration(format!(
                "cannot deal a board of {} tiles",
                tile_count
            )));
        }

        let mut slots: Vec<Option<PairId>> = vec![None; tile_count];
        for value in 1..=(tile_count / 2) as PairId {
            for _ in 0..2 {
                let mut idx = rng.random_range(0..tile_count);
                while slots[idx].is_some() {
                    idx = (idx + 1) % tile_count;
                }
                slots[idx] = Some(value);
            }
        }

        let tiles = slots
            .into_iter()
            .map(|slot| Tile {
                face: FaceState::FaceDown,
                value: slot.unwrap_or_default(),
            })
            .collect();
        Ok(Self { tiles })
    }

    /// Builds a face-down board from a fixed layout. Every value must occur
    /// exactly twice and the values must be `1..=len/2`.
    pub fn from_values(values: &[PairId]) -> Result<Self, GameError> {
        if values.is_empty() || values.len() % 2 != 0 || values.len() > MAX_WIRE_TILES {
            return Err(GameError::configuration(format!(
                "layout of {} tiles is not a valid board size",
                values.len()
            )));
        }

        let pairs = values.len() / 2;
        let mut counts = vec![0usize; pairs + 1];
        for &value in values {
            let slot = counts.get_mut(value as usize).filter(|_| value != 0).ok_or_else(|| {
                GameError::configuration(format!("pair id {} out of range 1..={}", value, pairs))
            })?;
            *slot += 1;
        }
        if let Some(value) = counts.iter().skip(1).position(|c| *c != 2) {
            return Err(GameError::configuration(format!(
                "pair id {} must appear exactly twice",
                value + 1
            )));
        }

        Ok(Self {
            tiles: values
                .iter()
                .map(|&value| Tile {
                    face: FaceState::FaceDown,
                    value,
                })
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, idx: usize) -> Option<&Tile> {
        self.tiles.get(idx)
    }

    pub(crate) fn set_face(&mut self, idx: usize, face: FaceState) {
        if let Some(tile) = self.tiles.get_mut(idx) {
            tile.face = face;
        }
    }

    pub fn face_down_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_face_down()).count()
    }

    /// A round is over once no face-down tile remains.
    pub fn is_finished(&self) -> bool {
        self.face_down_count() == 0
    }

    pub fn won_by(&self, player: PlayerId) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.face == FaceState::WonBy(player))
            .count()
    }

    /// Whoever holds more won tiles; `None` on a tie.
    pub fn winner(&self) -> Option<PlayerId> {
        let one = self.won_by(PlayerId::One);
        let two = self.won_by(PlayerId::Two);
        match one.cmp(&two) {
            std::cmp::Ordering::Greater => Some(PlayerId::One),
            std::cmp::Ordering::Less => Some(PlayerId::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Three-row dump of the board: tile index, pair value and face state.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  +")?;
        for idx in 0..self.tiles.len() {
            write!(f, "{:02}+", idx)?;
        }
        write!(f, "\n  |")?;
        for tile in &self.tiles {
            write!(f, "{:02}|", tile.value)?;
        }
        write!(f, "\n  |")?;
        for tile in &self.tiles {
            let code = match tile.face {
                FaceState::FaceDown => "--".to_string(),
                FaceState::FaceUp(p) => format!("U{}", p),
                FaceState::WonBy(p) => format!("W{}", p),
            };
            write!(f, "{}|", code)?;
        }
        Ok(())
    }
}

/// Maps an optional winner onto the 0 (tie) / 1 / 2 code shown to clients.
pub fn winner_code(winner: Option<PlayerId>) -> u8 {
    winner.map(PlayerId::number).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    #[rstest]
    #[case(2)]
    #[case(4)]
    #[case(16)]
    #[case(20)]
    #[case(998)]
    fn test_deal_places_every_pair_twice(#[case] tile_count: usize) {
        let mut rng = StdRng::seed_from_u64(tile_count as u64);
        let board = Board::deal(tile_count, &mut rng).unwrap();

        assert_eq!(board.len(), tile_count);
        let mut counts = std::collections::HashMap::new();
        for tile in board.tiles() {
            assert_eq!(tile.face, FaceState::FaceDown);
            *counts.entry(tile.value).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), tile_count / 2);
        assert!(counts.values().all(|c| *c == 2));
        assert!(counts.keys().all(|v| *v >= 1 && *v as usize <= tile_count / 2));
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(1002)]
    fn test_deal_rejects_bad_sizes(#[case] tile_count: usize) {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            Board::deal(tile_count, &mut rng),
            Err(GameError::Configuration(_))
        ));
    }

    #[rstest]
    #[case(-4, 100, false)]
    #[case(0, 100, false)]
    #[case(7, 100, false)]
    #[case(102, 100, false)]
    #[case(2000, 5000, false)]
    #[case(16, 100, true)]
    #[case(1000, 5000, true)]
    fn test_validate_tile_count(#[case] tiles: i64, #[case] max: usize, #[case] ok: bool) {
        let result = validate_tile_count(tiles, max);
        assert_eq!(result.is_ok(), ok, "{:?}", result);
        if let Err(e) = result {
            assert!(matches!(e, GameError::Configuration(_)));
        }
    }

    #[test]
    fn test_from_values_checks_pairs() {
        assert!(Board::from_values(&[1, 2, 1, 2]).is_ok());
        assert!(Board::from_values(&[1, 1, 1, 2]).is_err());
        assert!(Board::from_values(&[1, 2, 3, 3]).is_err());
        assert!(Board::from_values(&[0, 0]).is_err());
        assert!(Board::from_values(&[1, 1, 2]).is_err());
        assert!(Board::from_values(&[]).is_err());
    }

    #[test]
    fn test_winner_follows_won_tile_counts() {
        let mut board = Board::from_values(&[1, 2, 1, 2, 3, 3]).unwrap();
        assert_eq!(board.winner(), None);

        board.set_face(0, FaceState::WonBy(PlayerId::One));
        board.set_face(2, FaceState::WonBy(PlayerId::One));
        assert_eq!(board.winner(), Some(PlayerId::One));

        board.set_face(1, FaceState::WonBy(PlayerId::Two));
        board.set_face(3, FaceState::WonBy(PlayerId::Two));
        assert_eq!(board.winner(), None);
        assert_eq!(winner_code(board.winner()), 0);

        board.set_face(4, FaceState::WonBy(PlayerId::Two));
        board.set_face(5, FaceState::WonBy(PlayerId::Two));
        assert_eq!(board.winner(), Some(PlayerId::Two));
        assert_eq!(winner_code(board.winner()), 2);
        assert!(board.is_finished());
    }

    #[test]
    fn test_display_has_three_rows() {
        let board = Board::from_values(&[1, 1]).unwrap();
        let dump = board.to_string();
        assert_eq!(dump.lines().count(), 3);
        assert!(dump.contains("01|01|"));
    }
}
