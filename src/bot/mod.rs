// Public API
pub use actor::{BotActor, BotExit, BotReport};
pub use memory::{BotMemory, Recall, RememberedTile};
pub use memory_strategy::MemoryStrategy;
pub use types::{BotDifficulty, BotProfile, BotStrategy};

// Internal modules
mod actor;
mod memory;
mod memory_strategy;
mod types;
