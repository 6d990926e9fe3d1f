use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

use crate::bot::{BotActor, BotProfile, BotReport, BotStrategy, MemoryStrategy};

use super::{
    board::{validate_tile_count, winner_code, Board, PairId},
    errors::GameError,
    events::{Delivery, Move, Notification},
    player::PlayerId,
    resolver::resolve_flip,
};

/// Capacity of every move and notification channel.
pub const CHANNEL_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub tile_count: usize,
    /// Dump the board after every move at debug level.
    pub verbose: bool,
    /// Stop after this many rounds; `None` plays forever.
    pub max_rounds: Option<u64>,
    /// Deal this layout every round instead of a random one.
    pub layout: Option<Vec<PairId>>,
}

impl SessionConfig {
    pub fn new(tiles: i64, max_tiles: usize) -> Result<Self, GameError> {
        Ok(Self {
            tile_count: validate_tile_count(tiles, max_tiles)?,
            verbose: false,
            max_rounds: None,
            layout: None,
        })
    }

    pub fn with_layout(mut self, layout: Vec<PairId>) -> Result<Self, GameError> {
        Board::from_values(&layout)?;
        if layout.len() != self.tile_count {
            return Err(GameError::configuration(format!(
                "layout has {} tiles, session expects {}",
                layout.len(),
                self.tile_count
            )));
        }
        self.layout = Some(layout);
        Ok(self)
    }

    pub fn with_max_rounds(mut self, rounds: u64) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Counters published to whoever displays the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionStats {
    pub game_counter: u64,
    pub move_counter: u64,
    pub wins_p1: u64,
    pub wins_p2: u64,
    /// Winner of the last finished round: 0 for a tie (or no round yet), else 1 or 2.
    pub last_winner: u8,
}

/// The session's end of a human player's channels is inside `PlayerSpec`;
/// this is the other end, held by the transport.
#[derive(Debug)]
pub struct HumanHandle {
    pub moves: mpsc::Sender<Move>,
    pub notifications: mpsc::Receiver<Notification>,
}

/// Who sits in a seat.
pub enum PlayerSpec {
    Human {
        name: String,
        moves: mpsc::Receiver<Move>,
        notifications: mpsc::Sender<Notification>,
    },
    Bot {
        profile: BotProfile,
        strategy: Arc<dyn BotStrategy>,
    },
}

impl PlayerSpec {
    pub fn human(name: String) -> (Self, HumanHandle) {
        let (move_tx, move_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (notify_tx, notify_rx) = mpsc::channel(CHANNEL_CAPACITY);
        (
            PlayerSpec::Human {
                name,
                moves: move_rx,
                notifications: notify_tx,
            },
            HumanHandle {
                moves: move_tx,
                notifications: notify_rx,
            },
        )
    }

    pub fn bot(profile: BotProfile) -> Self {
        Self::bot_with_strategy(profile, Arc::new(MemoryStrategy::new()))
    }

    pub fn bot_with_strategy(profile: BotProfile, strategy: Arc<dyn BotStrategy>) -> Self {
        PlayerSpec::Bot { profile, strategy }
    }

    pub fn name(&self) -> &str {
        match self {
            PlayerSpec::Human { name, .. } => name,
            PlayerSpec::Bot { profile, .. } => profile.name(),
        }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self, PlayerSpec::Bot { .. })
    }
}

struct BotSeat {
    profile: BotProfile,
    strategy: Arc<dyn BotStrategy>,
}

struct Seat {
    id: PlayerId,
    name: String,
    bot: Option<BotSeat>,
    moves: mpsc::Receiver<Move>,
    notifications: mpsc::Sender<Notification>,
    listening: bool,
}

impl Seat {
    fn new(id: PlayerId, spec: PlayerSpec) -> Self {
        match spec {
            PlayerSpec::Human {
                name,
                moves,
                notifications,
            } => Self {
                id,
                name,
                bot: None,
                moves,
                notifications,
                listening: true,
            },
            PlayerSpec::Bot { profile, strategy } => {
                // Bots get fresh channels every round.
                let (_, moves) = mpsc::channel(1);
                let (notifications, _) = mpsc::channel(1);
                Self {
                    id,
                    name: profile.name().to_string(),
                    bot: Some(BotSeat { profile, strategy }),
                    moves,
                    notifications,
                    listening: false,
                }
            }
        }
    }
}

/// How a single round stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEnd {
    Finished,
    Disconnected(PlayerId),
}

/// Why a whole session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    RoundLimit,
    Disconnected(PlayerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub stats: SessionStats,
    pub end: SessionEnd,
}

/// Runs a repeating series of memory games between two players.
///
/// The session task is the only owner of the board. Moves from both players
/// arrive on their own channels and are applied one at a time, whichever
/// channel is ready first; there is no turn order.
pub struct GameSession {
    config: SessionConfig,
    board: Board,
    seats: [Seat; 2],
    stats: SessionStats,
    stats_tx: watch::Sender<SessionStats>,
    rng: StdRng,
}

impl GameSession {
    pub fn new(
        config: SessionConfig,
        player_one: PlayerSpec,
        player_two: PlayerSpec,
    ) -> Result<(Self, watch::Receiver<SessionStats>), GameError> {
        let mut rng = StdRng::from_rng(&mut rand::rng());
        let board = Self::build_board(&config, &mut rng)?;
        let (stats_tx, stats_rx) = watch::channel(SessionStats::default());

        let session = Self {
            config,
            board,
            seats: [
                Seat::new(PlayerId::One, player_one),
                Seat::new(PlayerId::Two, player_two),
            ],
            stats: SessionStats::default(),
            stats_tx,
            rng,
        };
        Ok((session, stats_rx))
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn build_board(config: &SessionConfig, rng: &mut StdRng) -> Result<Board, GameError> {
        match &config.layout {
            Some(layout) => Board::from_values(layout),
            None => Board::deal(config.tile_count, rng),
        }
    }

    fn seat(&self, player: PlayerId) -> &Seat {
        match player {
            PlayerId::One => &self.seats[0],
            PlayerId::Two => &self.seats[1],
        }
    }

    fn seat_mut(&mut self, player: PlayerId) -> &mut Seat {
        match player {
            PlayerId::One => &mut self.seats[0],
            PlayerId::Two => &mut self.seats[1],
        }
    }

    fn publish(&self) {
        self.stats_tx.send_replace(self.stats);
    }

    /// Plays rounds until a human player disconnects or the round limit is
    /// reached.
    #[instrument(
        name = "game_session",
        skip(self),
        fields(player_one = %self.seats[0].name, player_two = %self.seats[1].name)
    )]
    pub async fn run(mut self) -> Result<SessionOutcome, GameError> {
        info!(tiles = self.config.tile_count, "Session started");

        loop {
            if let Some(max) = self.config.max_rounds {
                if self.stats.game_counter >= max {
                    info!(rounds = max, "Round limit reached");
                    return Ok(SessionOutcome {
                        stats: self.stats,
                        end: SessionEnd::RoundLimit,
                    });
                }
            }

            self.stats.game_counter += 1;
            self.stats.move_counter = 0;
            self.board = Self::build_board(&self.config, &mut self.rng)?;
            self.publish();
            info!(game = self.stats.game_counter, "Round started");
            if self.config.verbose {
                debug!("Board dealt\n{}", self.board);
            }

            let bots = self.spawn_bots();
            let end = self.arbitrate().await;
            self.close_bot_channels();

            if let RoundEnd::Disconnected(player) = end {
                self.await_bots(bots).await;
                info!(player = %player, "Player disconnected, session over");
                self.publish();
                return Ok(SessionOutcome {
                    stats: self.stats,
                    end: SessionEnd::Disconnected(player),
                });
            }

            debug!("Waiting for bots to finish");
            self.await_bots(bots).await;

            let winner = self.board.winner();
            match winner {
                Some(PlayerId::One) => self.stats.wins_p1 += 1,
                Some(PlayerId::Two) => self.stats.wins_p2 += 1,
                None => {}
            }
            self.stats.last_winner = winner_code(winner);
            self.publish();

            info!(
                game = self.stats.game_counter,
                winner = self.stats.last_winner,
                wins_p1 = self.stats.wins_p1,
                wins_p2 = self.stats.wins_p2,
                moves = self.stats.move_counter,
                "Round finished"
            );
        }
    }

    /// Starts an actor for each bot seat, wired to fresh channels.
    fn spawn_bots(&mut self) -> Vec<JoinHandle<BotReport>> {
        let tile_count = self.board.len();
        let mut handles = Vec::new();

        for seat in self.seats.iter_mut() {
            seat.listening = true;
            let Some(bot) = &seat.bot else { continue };

            let (move_tx, move_rx) = mpsc::channel(CHANNEL_CAPACITY);
            let (notify_tx, notify_rx) = mpsc::channel(CHANNEL_CAPACITY);
            let actor = BotActor::new(
                seat.id,
                bot.profile.clone(),
                Arc::clone(&bot.strategy),
                tile_count,
                move_tx,
                notify_rx,
            );
            seat.moves = move_rx;
            seat.notifications = notify_tx;
            handles.push(tokio::spawn(actor.run()));
        }

        handles
    }

    /// Stops accepting bot moves; a bot still sending sees the session closed.
    fn close_bot_channels(&mut self) {
        for seat in self.seats.iter_mut().filter(|s| s.bot.is_some()) {
            seat.moves.close();
        }
    }

    /// Blocks until every bot of the round has stopped, so none of them can
    /// act on the next round's board.
    async fn await_bots(&self, handles: Vec<JoinHandle<BotReport>>) {
        for handle in handles {
            match handle.await {
                Ok(report) => debug!(
                    player = %report.player,
                    flips = report.flips,
                    exit = ?report.exit,
                    "Bot finished"
                ),
                Err(e) => warn!(error = %e, "Bot task failed"),
            }
        }
    }

    /// Applies moves until a `NoMove` arrives while no face-down tile remains.
    async fn arbitrate(&mut self) -> RoundEnd {
        loop {
            let [one, two] = &mut self.seats;
            let (player, received) = tokio::select! {
                received = one.moves.recv(), if one.listening => (PlayerId::One, received),
                received = two.moves.recv(), if two.listening => (PlayerId::Two, received),
                else => {
                    warn!("No player can move any more, ending round");
                    return RoundEnd::Finished;
                }
            };

            let Some(mv) = received else {
                let seat = self.seat_mut(player);
                seat.listening = false;
                if seat.bot.is_some() {
                    debug!(player = %player, "Bot channel closed");
                    continue;
                }
                return RoundEnd::Disconnected(player);
            };

            self.stats.move_counter += 1;
            match mv {
                Move::Flip(tile) => self.flip(player, tile).await,
                Move::NoMove => {
                    if self.board.is_finished() {
                        debug!(player = %player, "No face-down tiles left, round over");
                        return RoundEnd::Finished;
                    }
                    debug!(player = %player, "NoMove while face-down tiles remain, ignored");
                }
            }

            self.publish();
            if self.config.verbose {
                debug!("Board after move {}\n{}", self.stats.move_counter, self.board);
            }
        }
    }

    async fn flip(&mut self, player: PlayerId, tile: usize) {
        match resolve_flip(&mut self.board, player, tile) {
            Ok(deliveries) => self.deliver(deliveries).await,
            Err(e) => warn!(player = %player, tile, error = %e, "Flip rejected"),
        }
    }

    /// Sends notifications one recipient at a time, in order.
    async fn deliver(&self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            let seat = self.seat(delivery.recipient);
            if seat.notifications.send(delivery.notification).await.is_err() {
                debug!(
                    player = %delivery.recipient,
                    notification = %delivery.notification,
                    "Player no longer receiving notifications"
                );
            }
        }
    }
}
