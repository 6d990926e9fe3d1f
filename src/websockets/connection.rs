use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::game::{GameError, HumanHandle, Move, Notification, PlayerId};
use crate::registry::{NewGameRequest, SeatTicket, SessionRegistry, SlotStatus};

use super::messages::{ClientMessage, ServerMessage};
use super::socket::{SocketError, SocketWrapper};

/// One client's connection: a lobby phase until the client holds a seat,
/// then a bridge between the socket and the seat's channels.
pub struct Connection {
    socket: Box<dyn SocketWrapper>,
    registry: Arc<SessionRegistry>,
}

impl Connection {
    pub fn new(socket: Box<dyn SocketWrapper>, registry: Arc<SessionRegistry>) -> Self {
        Self { socket, registry }
    }

    async fn send(&mut self, message: &ServerMessage) -> Result<(), SocketError> {
        self.socket.send_message(message.to_json()).await
    }

    /// Run the connection until the client leaves or its session ends
    pub async fn run(mut self) -> Result<(), SocketError> {
        let result = match self.lobby().await {
            Ok(Some(ticket)) => self.play(ticket).await,
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };

        let _ = self.socket.close().await;
        result
    }

    /// Shows the slot listing and handles start/join requests until one succeeds.
    async fn lobby(&mut self) -> Result<Option<SeatTicket>, SocketError> {
        let games = self.registry.list();
        self.send(&ServerMessage::GamesInProgress { games }).await?;

        loop {
            let Some(text) = self.socket.receive_message().await? else {
                debug!("Client left the lobby");
                return Ok(None);
            };

            let attempt = match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::NewGame {
                    idx,
                    tmax,
                    opp_bot,
                    name,
                }) => self.registry.start_game(
                    idx,
                    NewGameRequest {
                        tiles: tmax,
                        opp_bot,
                        name,
                    },
                ),
                Ok(ClientMessage::JoinGame { idx, name }) => self.registry.join_game(idx, &name),
                Ok(other) => {
                    debug!(message = ?other, "Play message before joining a game");
                    self.send(&ServerMessage::error("Start or join a game first"))
                        .await?;
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "Unparseable lobby message");
                    self.send(&ServerMessage::error(format!("Invalid request: {}", e)))
                        .await?;
                    continue;
                }
            };

            match attempt {
                Ok(ticket) => {
                    info!(slot = ticket.slot, player = %ticket.player, "Client seated");
                    self.send(&ServerMessage::Seated {
                        idx: ticket.slot,
                        player: ticket.player.number(),
                        tmax: ticket.tile_count,
                    })
                    .await?;
                    return Ok(Some(ticket));
                }
                Err(e) => {
                    warn!(error = %e, "Lobby request rejected");
                    self.send(&ServerMessage::error(e.to_string())).await?;
                }
            }
        }
    }

    /// Bridges the seat to the socket. A writer task drains the session's
    /// notifications into an unbounded queue while this loop feeds client
    /// moves to the session, so a blocked move send never stops the drain.
    async fn play(&mut self, ticket: SeatTicket) -> Result<(), SocketError> {
        let SeatTicket {
            slot,
            session_id,
            player,
            tile_count,
            handle: HumanHandle {
                moves,
                notifications,
            },
        } = ticket;
        let seat = Seat {
            slot,
            session_id,
            player,
            tile_count,
        };
        let registry = Arc::clone(&self.registry);

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(forward_notifications(player, notifications, outbound_tx));

        let result = loop {
            tokio::select! {
                outgoing = outbound_rx.recv() => {
                    match outgoing {
                        Some(message) => {
                            if let Err(e) = self.send(&message).await {
                                leave(&registry, seat, &moves).await;
                                break Err(e);
                            }
                        }
                        None => {
                            info!(slot, player = %player, "Session ended");
                            break Ok(());
                        }
                    }
                }

                incoming = self.socket.receive_message() => {
                    let text = match incoming {
                        Ok(Some(text)) => text,
                        Ok(None) => {
                            leave(&registry, seat, &moves).await;
                            break Ok(());
                        }
                        Err(e) => {
                            leave(&registry, seat, &moves).await;
                            break Err(e);
                        }
                    };

                    match parse_move(&registry, &text, seat) {
                        Ok(mv) => {
                            debug!(player = %player, mv = %mv, "Client move");
                            if moves.send(mv).await.is_err() {
                                let closed = GameError::SessionClosed;
                                info!(slot, "{}", closed);
                                break self.send(&ServerMessage::error(closed.to_string())).await;
                            }
                        }
                        Err(e) => {
                            warn!(player = %player, error = %e, "Client message dropped");
                            if let Err(e) = self.send(&ServerMessage::error(e.to_string())).await {
                                leave(&registry, seat, &moves).await;
                                break Err(e);
                            }
                        }
                    }
                }
            }
        };

        writer.abort();
        result
    }
}

/// Where a seated client sits.
#[derive(Debug, Clone, Copy)]
struct Seat {
    slot: usize,
    session_id: Uuid,
    player: PlayerId,
    tile_count: usize,
}

/// Turns a client message into a move for the session.
fn parse_move(registry: &SessionRegistry, text: &str, seat: Seat) -> Result<Move, GameError> {
    let mv = match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Flip { tile }) => Move::flip_checked(tile, seat.tile_count)?,
        Ok(ClientMessage::End) => Move::NoMove,
        Ok(_) => return Err(GameError::protocol("Already seated in a game")),
        // Compact op-codes (`F007`, `N`) are accepted as well
        Err(_) => Move::parse_bounded(text.trim(), seat.tile_count)?,
    };

    // Nothing reads the parked move channel until an opponent joins
    if registry.status(seat.slot) == Some(SlotStatus::Waiting) {
        return Err(GameError::protocol("Waiting for an opponent"));
    }
    Ok(mv)
}

/// Moves notifications off the session's bounded channel as soon as they
/// arrive. Stops when the session closes the channel or the connection
/// drops the queue.
async fn forward_notifications(
    player: PlayerId,
    mut notifications: mpsc::Receiver<Notification>,
    outbound: mpsc::UnboundedSender<ServerMessage>,
) {
    while let Some(notification) = notifications.recv().await {
        trace!(player = %player, notification = %notification, "Forwarding notification");
        if outbound.send(ServerMessage::from(notification)).is_err() {
            break;
        }
    }
}

/// The client went away: free a slot nobody joined yet, or tell a running
/// session this seat is done.
async fn leave(registry: &SessionRegistry, seat: Seat, moves: &mpsc::Sender<Move>) {
    if registry.cancel_waiting(seat.slot, seat.session_id) {
        info!(slot = seat.slot, "Host left before an opponent joined");
        return;
    }
    info!(slot = seat.slot, player = %seat.player, "Client disconnected");
    let _ = moves.send(Move::NoMove).await;
}
