use rand::{Rng, RngCore};
use std::collections::HashMap;
use tracing::trace;

use crate::game::PairId;

use super::{
    memory::{BotMemory, Recall},
    types::BotStrategy,
};

/// Plays from memory: completes known pairs, tries to guzump when it knows
/// where the opponent's open tile's partner lies, and otherwise guesses.
///
/// The decision depends on nothing but the memory passed in.
pub struct MemoryStrategy;

impl MemoryStrategy {
    pub fn new() -> Self {
        Self
    }

    fn random_face_down(memory: &BotMemory, rng: &mut dyn RngCore) -> Option<usize> {
        let count = memory.face_down_count();
        if count == 0 {
            return None;
        }
        let pick = rng.random_range(0..count);
        memory.face_down().nth(pick).map(|(idx, _)| idx)
    }

    fn remembered_face_down(memory: &BotMemory, value: PairId) -> Option<usize> {
        memory
            .face_down()
            .find(|(_, tile)| tile.value == Some(value))
            .map(|(idx, _)| idx)
    }

    /// First value (in board order) seen on two face-down tiles.
    fn known_pair(memory: &BotMemory) -> Option<(usize, usize)> {
        let mut first_seen: HashMap<PairId, usize> = HashMap::new();
        for (idx, tile) in memory.face_down() {
            let Some(value) = tile.value else { continue };
            if let Some(&other) = first_seen.get(&value) {
                return Some((other, idx));
            }
            first_seen.insert(value, idx);
        }
        None
    }
}

impl Default for MemoryStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl BotStrategy for MemoryStrategy {
    fn decide_move(&self, memory: &BotMemory, rng: &mut dyn RngCore) -> Option<usize> {
        let mut mine = Vec::new();
        let mut theirs = Vec::new();
        for tile in memory.tiles() {
            match tile.recall {
                Recall::FaceUpMe => mine.push(tile.value),
                Recall::FaceUpOpponent => theirs.push(tile.value),
                _ => {}
            }
        }

        if memory.face_down_count() == 0 {
            return None;
        }

        // Second tile of a pair
        if let [own] = mine.as_slice() {
            if let Some(idx) = own.and_then(|v| Self::remembered_face_down(memory, v)) {
                trace!(tile = idx, "Choosing known match");
                return Some(idx);
            }
            return Self::random_face_down(memory, rng);
        }

        // Guzump attempt; the opponent will often get there first
        if let ([], [opp]) = (mine.as_slice(), theirs.as_slice()) {
            if let Some(idx) = opp.and_then(|v| Self::remembered_face_down(memory, v)) {
                trace!(tile = idx, "Trying guzump");
                return Some(idx);
            }
        }

        // Opening a pair
        if let Some((first, second)) = Self::known_pair(memory) {
            let choice = if rng.random_bool(0.5) { first } else { second };
            trace!(tile = choice, "Opening a known pair");
            return Some(choice);
        }

        Self::random_face_down(memory, rng)
    }

    fn strategy_name(&self) -> &'static str {
        "MemoryStrategy"
    }
}
