// Public API
pub use connection::Connection;
pub use handler::websocket_handler;
pub use messages::{ClientMessage, ServerMessage};
pub use socket::{SocketError, SocketWrapper};

// Internal modules
mod connection;
mod handler;
mod messages;
mod socket;
