use tracing::debug;

use super::{
    board::{Board, FaceState},
    errors::GameError,
    events::{Delivery, Notification},
    player::PlayerId,
};

/// Face-up tiles found by one scan of the board, from the acting player's side.
#[derive(Debug, Default)]
struct FaceUpScan {
    mine: Vec<usize>,
    theirs: Vec<usize>,
}

impl FaceUpScan {
    fn of(board: &Board, player: PlayerId) -> Self {
        let mut scan = FaceUpScan::default();
        for (idx, tile) in board.tiles().iter().enumerate() {
            match tile.face {
                FaceState::FaceUp(owner) if owner == player => scan.mine.push(idx),
                FaceState::FaceUp(_) => scan.theirs.push(idx),
                _ => {}
            }
        }
        scan
    }
}

/// Applies one flip request to the board and returns the notifications it
/// produces, in the order they must be delivered.
///
/// A flip of a tile that is not face-down changes nothing and produces no
/// notifications: two players racing for the same tile is normal play.
///
/// Match precedence: the acting player's own pending tile is checked first,
/// then a single pending tile of the opponent (a guzump). The guzump is tried
/// whenever the own match fails, even if the acting player holds one
/// non-matching tile of their own; it does not require the acting player to
/// have no face-up tile.
pub fn resolve_flip(
    board: &mut Board,
    player: PlayerId,
    target: usize,
) -> Result<Vec<Delivery>, GameError> {
    let tile = board.tile(target).copied().ok_or_else(|| {
        GameError::protocol(format!(
            "player {} flipped tile {} on a board of {} tiles",
            player,
            target,
            board.len()
        ))
    })?;

    if !tile.is_face_down() {
        debug!(player = %player, tile = target, "Flip of a tile that is not face-down ignored");
        return Ok(Vec::new());
    }

    let opponent = player.opponent();
    let mut scan = FaceUpScan::of(board, player);
    let mut deliveries = Vec::with_capacity(5);

    if scan.mine.len() >= 2 {
        let (first, second) = (scan.mine[0], scan.mine[1]);
        board.set_face(first, FaceState::FaceDown);
        board.set_face(second, FaceState::FaceDown);
        let hide = Notification::Hide { first, second };
        deliveries.push(Delivery::to(PlayerId::One, hide));
        deliveries.push(Delivery::to(PlayerId::Two, hide));
        scan.mine.clear();
    }

    let value = tile.value;
    board.set_face(target, FaceState::FaceUp(player));
    deliveries.push(Delivery::to(
        player,
        Notification::Flip {
            tile: target,
            value,
        },
    ));
    deliveries.push(Delivery::to(
        opponent,
        Notification::OpponentFlip {
            tile: target,
            value,
        },
    ));

    let pending_value = |idx: usize| board.tile(idx).map(|t| t.value);
    let matched = match (scan.mine.as_slice(), scan.theirs.as_slice()) {
        ([own], _) if pending_value(*own) == Some(value) => Some(*own),
        (_, [theirs]) if pending_value(*theirs) == Some(value) => {
            debug!(player = %player, tile = target, matched = *theirs, "Guzump");
            Some(*theirs)
        }
        _ => None,
    };

    if let Some(matched) = matched {
        board.set_face(matched, FaceState::WonBy(player));
        board.set_face(target, FaceState::WonBy(player));
        let remove = Notification::Remove {
            first: target,
            second: matched,
        };
        deliveries.push(Delivery::to(PlayerId::One, remove));
        deliveries.push(Delivery::to(PlayerId::Two, remove));
    }

    Ok(deliveries)
}
