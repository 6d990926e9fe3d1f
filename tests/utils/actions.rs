use tokio::time::{timeout, Duration};

use memgame::{game::HumanHandle, Move, Notification};

/// Asks the session to flip `tile`.
pub async fn flip(player: &HumanHandle, tile: usize) {
    player.moves.send(Move::Flip(tile)).await.unwrap();
}

/// Tells the session this player has nothing left to flip.
pub async fn end_round(player: &HumanHandle) {
    player.moves.send(Move::NoMove).await.unwrap();
}

pub async fn next_notification(player: &mut HumanHandle) -> Notification {
    timeout(Duration::from_secs(2), player.notifications.recv())
        .await
        .expect("timed out waiting for a notification")
        .expect("session closed the notification channel")
}
