use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::Arc;
use tokio::{
    sync::mpsc::{self, error::TryRecvError},
    time::{sleep, Duration},
};
use tracing::{debug, info, trace};

use crate::game::{Move, Notification, PlayerId};

use super::{memory::BotMemory, types::{BotProfile, BotStrategy}};

/// Why a bot actor stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotExit {
    /// Nothing left to flip; the bot sent `NoMove`.
    NoMoveLeft,
    /// The session stopped listening.
    SessionClosed,
}

/// Summary handed back to the session when the actor finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotReport {
    pub player: PlayerId,
    pub flips: usize,
    pub exit: BotExit,
}

/// A bot playing one round. It keeps its own memory of the board, fed only
/// by the notifications it receives, and plays concurrently with its
/// opponent.
pub struct BotActor {
    player: PlayerId,
    profile: BotProfile,
    strategy: Arc<dyn BotStrategy>,
    memory: BotMemory,
    moves: mpsc::Sender<Move>,
    notifications: mpsc::Receiver<Notification>,
    rng: StdRng,
}

impl BotActor {
    pub fn new(
        player: PlayerId,
        profile: BotProfile,
        strategy: Arc<dyn BotStrategy>,
        tile_count: usize,
        moves: mpsc::Sender<Move>,
        notifications: mpsc::Receiver<Notification>,
    ) -> Self {
        Self {
            player,
            profile,
            strategy,
            memory: BotMemory::new(tile_count),
            moves,
            notifications,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Takes in whatever notifications are queued without waiting for more.
    fn drain_notifications(&mut self) {
        loop {
            match self.notifications.try_recv() {
                Ok(notification) => {
                    trace!(player = %self.player, notification = %notification, "Bot notified");
                    self.memory
                        .apply(&notification, self.profile.memory_percent(), &mut self.rng);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn think_time(&mut self) -> Duration {
        let base = self.profile.base_delay_ms().max(1);
        Duration::from_millis(base + self.rng.random_range(0..base))
    }

    /// Plays until no face-down tile is left in memory or the session goes away.
    pub async fn run(mut self) -> BotReport {
        info!(
            player = %self.player,
            bot_name = %self.profile.name(),
            strategy = self.strategy.strategy_name(),
            slow_percent = self.profile.slow_percent(),
            memory_percent = self.profile.memory_percent(),
            "Bot started"
        );

        let mut flips = 0;
        loop {
            self.drain_notifications();
            trace!(player = %self.player, "Bot memory\n{}", self.memory);

            let choice = self.strategy.decide_move(&self.memory, &mut self.rng);
            let Some(tile) = choice else {
                let exit = match self.moves.send(Move::NoMove).await {
                    Ok(()) => BotExit::NoMoveLeft,
                    Err(_) => BotExit::SessionClosed,
                };
                info!(player = %self.player, flips, "Bot has no move left, stopping");
                return BotReport {
                    player: self.player,
                    flips,
                    exit,
                };
            };

            debug!(player = %self.player, tile, "Bot flips tile");
            if self.moves.send(Move::Flip(tile)).await.is_err() {
                debug!(player = %self.player, "Session closed, bot stopping");
                return BotReport {
                    player: self.player,
                    flips,
                    exit: BotExit::SessionClosed,
                };
            }
            flips += 1;

            let pause = self.think_time();
            sleep(pause).await;
        }
    }
}
