use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use memgame::{
    router, AppState, BotProfile, Notification, PlayerId, ServerConfig, SessionEnd,
    SessionRegistry,
};
use tower::ServiceExt; // for `oneshot`

mod utils;

use utils::*;

#[tokio::test]
async fn test_each_player_claims_own_pair_for_a_tie() {
    let mut session = TestSessionBuilder::new(4)
        .with_layout(vec![1, 2, 1, 2])
        .with_max_rounds(1)
        .build();

    flip(session.one(), 0).await;
    assert_eq!(
        next_notification(session.one()).await,
        Notification::Flip { tile: 0, value: 1 }
    );
    assert_eq!(
        next_notification(session.two()).await,
        Notification::OpponentFlip { tile: 0, value: 1 }
    );

    flip(session.one(), 2).await;
    assert_eq!(
        next_notification(session.one()).await,
        Notification::Flip { tile: 2, value: 1 }
    );
    assert_eq!(
        next_notification(session.one()).await,
        Notification::Remove { first: 2, second: 0 }
    );
    assert_eq!(
        next_notification(session.two()).await,
        Notification::OpponentFlip { tile: 2, value: 1 }
    );
    assert_eq!(
        next_notification(session.two()).await,
        Notification::Remove { first: 2, second: 0 }
    );

    flip(session.two(), 1).await;
    assert_eq!(
        next_notification(session.two()).await,
        Notification::Flip { tile: 1, value: 2 }
    );
    flip(session.two(), 3).await;
    assert_eq!(
        next_notification(session.two()).await,
        Notification::Flip { tile: 3, value: 2 }
    );
    assert_eq!(
        next_notification(session.two()).await,
        Notification::Remove { first: 3, second: 1 }
    );

    end_round(session.one()).await;
    let outcome = session.task.await.unwrap().unwrap();

    assert_eq!(outcome.end, SessionEnd::RoundLimit);
    assert_eq!(outcome.stats.game_counter, 1);
    assert_eq!(outcome.stats.move_counter, 5);
    assert_eq!(outcome.stats.wins_p1, 0);
    assert_eq!(outcome.stats.wins_p2, 0);
    assert_eq!(outcome.stats.last_winner, 0);
    assert_stats_consistent(&outcome.stats);
}

#[tokio::test]
async fn test_guzump_wins_the_round_for_player_two() {
    let mut session = TestSessionBuilder::new(6)
        .with_layout(vec![5, 5, 1, 1, 2, 2])
        .with_max_rounds(1)
        .build();

    flip(session.one(), 0).await;
    next_notification(session.one()).await;
    assert_eq!(
        next_notification(session.two()).await,
        Notification::OpponentFlip { tile: 0, value: 5 }
    );

    // Player two matches player one's pending tile before player one can
    flip(session.two(), 1).await;
    assert_eq!(
        next_notification(session.two()).await,
        Notification::Flip { tile: 1, value: 5 }
    );
    assert_eq!(
        next_notification(session.two()).await,
        Notification::Remove { first: 1, second: 0 }
    );
    assert_eq!(
        next_notification(session.one()).await,
        Notification::OpponentFlip { tile: 1, value: 5 }
    );
    assert_eq!(
        next_notification(session.one()).await,
        Notification::Remove { first: 1, second: 0 }
    );

    for tile in [2, 3] {
        flip(session.two(), tile).await;
        next_notification(session.two()).await;
    }
    assert_eq!(
        next_notification(session.two()).await,
        Notification::Remove { first: 3, second: 2 }
    );
    for tile in [4, 5] {
        flip(session.one(), tile).await;
        next_notification(session.one()).await;
    }

    end_round(session.two()).await;
    let outcome = session.task.await.unwrap().unwrap();

    assert_eq!(outcome.stats.wins_p1, 0);
    assert_eq!(outcome.stats.wins_p2, 1);
    assert_eq!(outcome.stats.last_winner, 2);
    assert_eq!(*session.stats.borrow(), outcome.stats);
    assert_stats_consistent(&outcome.stats);
}

#[tokio::test]
async fn test_third_flip_hides_pending_tiles_first() {
    let mut session = TestSessionBuilder::new(6)
        .with_layout(vec![1, 2, 3, 1, 2, 3])
        .build();

    for tile in [0, 1, 2] {
        flip(session.one(), tile).await;
    }
    let seen = [
        next_notification(session.one()).await,
        next_notification(session.one()).await,
        next_notification(session.one()).await,
        next_notification(session.one()).await,
    ];
    assert_eq!(
        seen,
        [
            Notification::Flip { tile: 0, value: 1 },
            Notification::Flip { tile: 1, value: 2 },
            Notification::Hide { first: 0, second: 1 },
            Notification::Flip { tile: 2, value: 3 },
        ]
    );

    // The opponent sees the same sequence from the other side
    let mut opponent_saw = Vec::new();
    for _ in 0..4 {
        opponent_saw.push(next_notification(session.two()).await);
    }
    assert_eq!(opponent_saw[2], Notification::Hide { first: 0, second: 1 });

    // Flipping a tile that is already face-up is silently discarded
    flip(session.two(), 2).await;
    assert_no_notification(session.two()).await;
    assert_no_notification(session.one()).await;

    drop(session.one.take());
    let outcome = session.task.await.unwrap().unwrap();
    assert_eq!(outcome.end, SessionEnd::Disconnected(PlayerId::One));
}

#[tokio::test]
async fn test_human_disconnect_ends_the_session() {
    let mut session = TestSessionBuilder::new(8).build();
    let mut one = session.one.take().unwrap();

    drop(session.two.take());
    let outcome = session.task.await.unwrap().unwrap();

    assert_eq!(outcome.end, SessionEnd::Disconnected(PlayerId::Two));
    assert_eq!(outcome.stats.game_counter, 1);
    // The remaining player's channel is closed with the session
    assert_eq!(one.notifications.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_human_leaving_stops_the_bot_too() {
    let mut session = TestSessionBuilder::new(8)
        .with_bot_two(BotProfile::new("robo".to_string(), 10, 100))
        .build();

    // Let the bot get a few flips in
    let first = next_notification(session.one()).await;
    assert!(matches!(first, Notification::OpponentFlip { .. }));

    drop(session.one.take());
    let outcome = session.task.await.unwrap().unwrap();
    assert_eq!(outcome.end, SessionEnd::Disconnected(PlayerId::One));
}

#[tokio::test(start_paused = true)]
async fn test_bots_play_until_round_limit() {
    let mut session = TestSessionBuilder::new(8)
        .with_bot_one(BotProfile::new("ada".to_string(), 10, 100))
        .with_bot_two(BotProfile::new("grace".to_string(), 30, 50))
        .with_max_rounds(3)
        .build();

    let outcome = session.task.await.unwrap().unwrap();

    assert_eq!(outcome.end, SessionEnd::RoundLimit);
    assert_eq!(outcome.stats.game_counter, 3);
    assert!(outcome.stats.move_counter > 0);
    assert_stats_consistent(&outcome.stats);
    assert_eq!(*session.stats.borrow_and_update(), outcome.stats);
}

#[tokio::test]
async fn test_router_lists_game_slots() {
    let config = ServerConfig {
        slots: 4,
        ..ServerConfig::default()
    };
    let registry = Arc::new(SessionRegistry::new(config.slots, config.max_tiles, false));
    let app = router(AppState::new(registry));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/games")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let games: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let games = games.as_array().unwrap();
    assert_eq!(games.len(), 4);
    assert!(games.iter().all(|g| g["Status"] == "Empty"));
}
