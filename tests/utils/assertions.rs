use tokio::time::{timeout, Duration};

use memgame::{game::HumanHandle, SessionStats};

pub async fn assert_no_notification(player: &mut HumanHandle) {
    let pending = timeout(Duration::from_millis(50), player.notifications.recv()).await;
    assert!(pending.is_err(), "unexpected notification {:?}", pending);
}

/// Every finished round has at most one winner, and `last_winner` names one
/// of the two players or a tie.
pub fn assert_stats_consistent(stats: &SessionStats) {
    assert!(stats.wins_p1 + stats.wins_p2 <= stats.game_counter);
    assert!(stats.last_winner <= 2);
}
