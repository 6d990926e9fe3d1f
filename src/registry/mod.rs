// Public API
pub use handlers::{get_game, list_games};
pub use models::{NewGameRequest, RegistryError, SeatTicket, SlotStatus, SlotSummary};
pub use service::SessionRegistry;

// Internal modules
mod handlers;
pub mod models;
mod service;
