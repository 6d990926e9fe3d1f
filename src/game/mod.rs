// Public API
pub use board::{validate_tile_count, winner_code, Board, FaceState, PairId, Tile, MAX_WIRE_TILES};
pub use errors::GameError;
pub use events::{Delivery, Move, Notification};
pub use player::PlayerId;
pub use resolver::resolve_flip;
pub use session::{
    GameSession, HumanHandle, PlayerSpec, SessionConfig, SessionEnd, SessionOutcome,
    SessionStats, CHANNEL_CAPACITY,
};

// Internal modules
mod board;
mod errors;
mod events;
mod player;
mod resolver;
mod session;
