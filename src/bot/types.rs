use rand::RngCore;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use super::memory::BotMemory;

pub const DEFAULT_PERCENT: u8 = 100;
pub const SLOW_PERCENT_RANGE: std::ops::RangeInclusive<u8> = 10..=100;
pub const MEMORY_PERCENT_RANGE: std::ops::RangeInclusive<u8> = 20..=100;

/// Tuning of a bot player. Percentages are kept in range by the
/// constructors, so the fields are read through getters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotProfile {
    name: String,
    /// Scales the think-time between moves: 10 is quick, 100 is slow.
    slow_percent: u8,
    /// Chance of still knowing a tile's value after it is hidden again.
    memory_percent: u8,
}

impl BotProfile {
    /// Percentages outside their range are clamped to the nearest bound.
    pub fn new(name: String, slow_percent: u8, memory_percent: u8) -> Self {
        Self {
            name,
            slow_percent: slow_percent
                .clamp(*SLOW_PERCENT_RANGE.start(), *SLOW_PERCENT_RANGE.end()),
            memory_percent: memory_percent
                .clamp(*MEMORY_PERCENT_RANGE.start(), *MEMORY_PERCENT_RANGE.end()),
        }
    }

    /// A slow bot with perfect memory, used when no percentages are given.
    pub fn with_defaults(name: String) -> Self {
        Self::new(name, DEFAULT_PERCENT, DEFAULT_PERCENT)
    }

    /// Profile for a difficulty preset, with a generated display name
    pub fn for_difficulty(difficulty: BotDifficulty) -> Self {
        let petname = petname::Petnames::default().generate_one(2, "-");
        let (slow, memory) = difficulty.percents();
        Self::new(format!("{} Bot", petname), slow, memory)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slow_percent(&self) -> u8 {
        self.slow_percent
    }

    pub fn memory_percent(&self) -> u8 {
        self.memory_percent
    }

    /// Base think-time in milliseconds; the actual pause adds up to the same again.
    pub fn base_delay_ms(&self) -> u64 {
        10 * self.slow_percent as u64
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display,
)]
pub enum BotDifficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl BotDifficulty {
    /// (slow percent, memory percent) of the preset.
    pub fn percents(self) -> (u8, u8) {
        match self {
            BotDifficulty::Easy => (100, 30),
            BotDifficulty::Medium => (70, 60),
            BotDifficulty::Hard => (50, 99),
            BotDifficulty::Expert => (20, 100),
        }
    }

    /// Maps the lobby's numeric bot selector (1 = easiest) to a preset.
    pub fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            1 => Some(BotDifficulty::Easy),
            2 => Some(BotDifficulty::Medium),
            3 => Some(BotDifficulty::Hard),
            4 => Some(BotDifficulty::Expert),
            _ => None,
        }
    }
}

/// Trait for bot decision-making strategies
pub trait BotStrategy: Send + Sync {
    /// Pick the next tile to flip from what the bot remembers of the board.
    /// Returns None when no face-down tile is left.
    fn decide_move(&self, memory: &BotMemory, rng: &mut dyn RngCore) -> Option<usize>;

    /// Get the name of this strategy
    fn strategy_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case(50, 60, 50, 60)]
    #[case(10, 20, 10, 20)]
    #[case(9, 60, 10, 60)]
    #[case(50, 19, 50, 20)]
    #[case(50, 5, 50, 20)]
    #[case(0, 0, 10, 20)]
    #[case(101, 200, 100, 100)]
    fn test_profile_percent_ranges(
        #[case] slow: u8,
        #[case] memory: u8,
        #[case] expected_slow: u8,
        #[case] expected_memory: u8,
    ) {
        let profile = BotProfile::new("bot".to_string(), slow, memory);
        assert_eq!(profile.slow_percent(), expected_slow);
        assert_eq!(profile.memory_percent(), expected_memory);
        assert!(profile.base_delay_ms() >= 100);
    }

    #[test]
    fn test_profile_defaults() {
        let profile = BotProfile::with_defaults("bot".to_string());
        assert_eq!(profile.slow_percent(), 100);
        assert_eq!(profile.memory_percent(), 100);
        assert_eq!(profile.name(), "bot");
    }

    #[test]
    fn test_presets_are_in_range() {
        for difficulty in BotDifficulty::iter() {
            let profile = BotProfile::for_difficulty(difficulty);
            assert_eq!(
                (profile.slow_percent(), profile.memory_percent()),
                difficulty.percents()
            );
            assert!(profile.name().ends_with(" Bot"));
        }
    }

    #[test]
    fn test_selector_mapping() {
        assert_eq!(BotDifficulty::from_selector(0), None);
        assert_eq!(BotDifficulty::from_selector(1), Some(BotDifficulty::Easy));
        assert_eq!(BotDifficulty::from_selector(4), Some(BotDifficulty::Expert));
        assert_eq!(BotDifficulty::from_selector(5), None);
    }

    #[test]
    fn test_base_delay() {
        let profile = BotProfile::new("bot".to_string(), 10, 100);
        assert_eq!(profile.base_delay_ms(), 100);
        assert_eq!(BotProfile::new("bot".to_string(), 100, 100).base_delay_ms(), 1000);
    }
}
