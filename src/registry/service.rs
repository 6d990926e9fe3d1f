use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::bot::{BotDifficulty, BotProfile};
use crate::game::{GameSession, PlayerId, PlayerSpec, SessionConfig, SessionStats};

use super::models::{NewGameRequest, RegistryError, SeatTicket, SlotStatus, SlotSummary};

#[derive(Default)]
struct Slot {
    status: SlotStatus,
    session_id: Option<Uuid>,
    config: Option<SessionConfig>,
    player1: Option<String>,
    player2: Option<String>,
    player2_is_bot: bool,
    started_at: Option<DateTime<Utc>>,
    /// Player one's seat, parked until an opponent joins.
    waiting: Option<PlayerSpec>,
    stats: Option<watch::Receiver<SessionStats>>,
}

impl Slot {
    fn summary(&self, idx: usize) -> SlotSummary {
        SlotSummary {
            idx,
            status: self.status,
            tiles: self.config.as_ref().map(|c| c.tile_count).unwrap_or(0),
            player1: self.player1.clone(),
            player2: self.player2.clone(),
            player2_is_bot: self.player2_is_bot,
            started_at: self.started_at,
            stats: self
                .stats
                .as_ref()
                .map(|rx| *rx.borrow())
                .unwrap_or_default(),
        }
    }
}

/// Fixed table of game slots shared by every connection.
///
/// Passed around explicitly (inside `AppState`) rather than living in a
/// global.
pub struct SessionRegistry {
    slots: Mutex<Vec<Slot>>,
    max_tiles: usize,
    verbose: bool,
}

impl SessionRegistry {
    pub fn new(slot_count: usize, max_tiles: usize, verbose: bool) -> Self {
        Self {
            slots: Mutex::new((0..slot_count).map(|_| Slot::default()).collect()),
            max_tiles,
            verbose,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn max_tiles(&self) -> usize {
        self.max_tiles
    }

    /// Lists every slot, empty ones included.
    pub fn list(&self) -> Vec<SlotSummary> {
        self.lock()
            .iter()
            .enumerate()
            .map(|(idx, slot)| slot.summary(idx))
            .collect()
    }

    pub fn summary(&self, idx: usize) -> Option<SlotSummary> {
        self.lock().get(idx).map(|slot| slot.summary(idx))
    }

    pub fn status(&self, idx: usize) -> Option<SlotStatus> {
        self.lock().get(idx).map(|slot| slot.status)
    }

    /// Opens an empty slot with the caller as player one. Against a bot the
    /// session starts at once; otherwise the slot waits for `join_game`.
    #[instrument(skip(self, request), fields(name = %request.name, tiles = request.tiles))]
    pub fn start_game(
        self: &Arc<Self>,
        idx: usize,
        request: NewGameRequest,
    ) -> Result<SeatTicket, RegistryError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let config =
            SessionConfig::new(request.tiles, self.max_tiles)?.with_verbose(self.verbose);
        let bot = match request.opp_bot {
            0 => None,
            selector => Some(
                BotDifficulty::from_selector(selector)
                    .ok_or(RegistryError::UnknownBot(selector))?,
            ),
        };

        let mut slots = self.lock();
        let slot = slots.get_mut(idx).ok_or(RegistryError::NoSuchSlot(idx))?;
        if slot.status != SlotStatus::Empty {
            warn!(slot = idx, status = ?slot.status, "Slot already in use");
            return Err(RegistryError::SlotTaken(idx));
        }

        let session_id = Uuid::new_v4();
        let (spec, handle) = PlayerSpec::human(name.clone());
        let ticket = SeatTicket {
            slot: idx,
            session_id,
            player: PlayerId::One,
            tile_count: config.tile_count,
            handle,
        };

        *slot = Slot {
            session_id: Some(session_id),
            player1: Some(name),
            started_at: Some(Utc::now()),
            ..Slot::default()
        };

        match bot {
            Some(difficulty) => {
                let profile = BotProfile::for_difficulty(difficulty);
                info!(slot = idx, bot_name = %profile.name(), difficulty = %difficulty, "Starting game against bot");
                slot.player2 = Some(profile.name().to_string());
                slot.player2_is_bot = true;
                if let Err(e) = self.launch(slot, idx, config, spec, PlayerSpec::bot(profile)) {
                    *slot = Slot::default();
                    return Err(e);
                }
            }
            None => {
                info!(slot = idx, "Game waiting for an opponent");
                slot.status = SlotStatus::Waiting;
                slot.config = Some(config);
                slot.waiting = Some(spec);
            }
        }

        Ok(ticket)
    }

    /// Seats the caller as player two in a waiting slot and starts the session.
    #[instrument(skip(self))]
    pub fn join_game(self: &Arc<Self>, idx: usize, name: &str) -> Result<SeatTicket, RegistryError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let mut slots = self.lock();
        let slot = slots.get_mut(idx).ok_or(RegistryError::NoSuchSlot(idx))?;
        if slot.status != SlotStatus::Waiting {
            return Err(RegistryError::NotWaiting(idx));
        }
        let (Some(config), Some(player_one), Some(session_id)) =
            (slot.config.clone(), slot.waiting.take(), slot.session_id)
        else {
            return Err(RegistryError::NotWaiting(idx));
        };

        let (spec, handle) = PlayerSpec::human(name.clone());
        let ticket = SeatTicket {
            slot: idx,
            session_id,
            player: PlayerId::Two,
            tile_count: config.tile_count,
            handle,
        };
        slot.player2 = Some(name);
        info!(slot = idx, "Opponent joined, starting game");
        if let Err(e) = self.launch(slot, idx, config, player_one, spec) {
            *slot = Slot::default();
            return Err(e);
        }

        Ok(ticket)
    }

    /// Spawns the session task. The slot is recycled when the task ends.
    fn launch(
        self: &Arc<Self>,
        slot: &mut Slot,
        idx: usize,
        config: SessionConfig,
        player_one: PlayerSpec,
        player_two: PlayerSpec,
    ) -> Result<(), RegistryError> {
        let session_id = slot.session_id.unwrap_or_else(Uuid::new_v4);
        let (session, stats) = GameSession::new(config.clone(), player_one, player_two)?;

        slot.status = SlotStatus::Running;
        slot.config = Some(config);
        slot.session_id = Some(session_id);
        slot.stats = Some(stats);

        let registry = Arc::clone(self);
        tokio::spawn(async move {
            match session.run().await {
                Ok(outcome) => info!(
                    slot = idx,
                    end = ?outcome.end,
                    games = outcome.stats.game_counter,
                    wins_p1 = outcome.stats.wins_p1,
                    wins_p2 = outcome.stats.wins_p2,
                    "Session ended"
                ),
                Err(e) => error!(slot = idx, error = %e, "Session failed"),
            }
            registry.release(idx, session_id);
        });
        Ok(())
    }

    /// Recycles a slot to `Empty`, provided it still belongs to `session_id`.
    pub fn release(&self, idx: usize, session_id: Uuid) -> bool {
        let mut slots = self.lock();
        match slots.get_mut(idx) {
            Some(slot) if slot.session_id == Some(session_id) => {
                debug!(slot = idx, "Slot released");
                *slot = Slot::default();
                true
            }
            _ => false,
        }
    }

    /// Releases a slot whose host left before anyone joined.
    pub fn cancel_waiting(&self, idx: usize, session_id: Uuid) -> bool {
        let mut slots = self.lock();
        match slots.get_mut(idx) {
            Some(slot)
                if slot.status == SlotStatus::Waiting && slot.session_id == Some(session_id) =>
            {
                debug!(slot = idx, "Waiting game cancelled");
                *slot = Slot::default();
                true
            }
            _ => false,
        }
    }
}
