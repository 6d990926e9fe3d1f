use tokio::{sync::watch, task::JoinHandle};

use memgame::{
    game::{HumanHandle, PairId},
    BotProfile, GameError, GameSession, PlayerSpec, SessionConfig, SessionOutcome, SessionStats,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSession {
    pub one: Option<HumanHandle>,
    pub two: Option<HumanHandle>,
    pub stats: watch::Receiver<SessionStats>,
    pub task: JoinHandle<Result<SessionOutcome, GameError>>,
}

impl TestSession {
    pub fn one(&mut self) -> &mut HumanHandle {
        self.one.as_mut().expect("player one is not human")
    }

    pub fn two(&mut self) -> &mut HumanHandle {
        self.two.as_mut().expect("player two is not human")
    }
}

pub struct TestSessionBuilder {
    tiles: i64,
    layout: Option<Vec<PairId>>,
    max_rounds: Option<u64>,
    bot_one: Option<BotProfile>,
    bot_two: Option<BotProfile>,
}

impl TestSessionBuilder {
    pub fn new(tiles: i64) -> Self {
        Self {
            tiles,
            layout: None,
            max_rounds: None,
            bot_one: None,
            bot_two: None,
        }
    }

    /// Deal a fixed board every round; `layout[i]` is the value of tile `i`.
    pub fn with_layout(mut self, layout: Vec<PairId>) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_max_rounds(mut self, rounds: u64) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    pub fn with_bot_one(mut self, profile: BotProfile) -> Self {
        self.bot_one = Some(profile);
        self
    }

    pub fn with_bot_two(mut self, profile: BotProfile) -> Self {
        self.bot_two = Some(profile);
        self
    }

    fn seat(name: &str, bot: Option<BotProfile>) -> (PlayerSpec, Option<HumanHandle>) {
        match bot {
            Some(profile) => (PlayerSpec::bot(profile), None),
            None => {
                let (spec, handle) = PlayerSpec::human(name.to_string());
                (spec, Some(handle))
            }
        }
    }

    pub fn build(self) -> TestSession {
        let mut config = SessionConfig::new(self.tiles, 100).unwrap();
        if let Some(layout) = self.layout {
            config = config.with_layout(layout).unwrap();
        }
        if let Some(rounds) = self.max_rounds {
            config = config.with_max_rounds(rounds);
        }

        let (spec_one, one) = Self::seat("alice", self.bot_one);
        let (spec_two, two) = Self::seat("bob", self.bot_two);
        let (session, stats) = GameSession::new(config, spec_one, spec_two).unwrap();

        TestSession {
            one,
            two,
            stats,
            task: tokio::spawn(session.run()),
        }
    }
}
