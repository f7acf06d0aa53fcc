//! Tests for replicating a game between two peers.

use dragon_face::{
    Action, Board, Coord, Game, GameSession, Move, Piece, PieceKind, Player, ProtocolError,
    RemoteOutcome, ReplicationError, Role, Seat, TurnError, TurnOutcome, WireMessage,
};

fn at(row: u8, col: u8) -> Coord {
    Coord::new(row, col).unwrap()
}

fn peers() -> (GameSession, GameSession) {
    let id = "127.0.0.1:7878".to_string();
    (
        GameSession::networked(id.clone(), Role::Host),
        GameSession::networked(id, Role::Joiner),
    )
}

fn click_move(session: &mut GameSession, from: Coord, to: Coord) -> WireMessage {
    assert_eq!(session.handle_local_click(from), None);
    session
        .handle_local_click(to)
        .expect("Move should be committed")
}

#[test]
fn test_peers_stay_in_lockstep() {
    let (mut host, mut joiner) = peers();

    let message = click_move(&mut host, at(8, 4), at(6, 4));
    let outcome = joiner.apply_remote(message).unwrap();
    assert_eq!(
        outcome,
        RemoteOutcome::Applied(TurnOutcome::TurnPassed { next: Player::Two })
    );
    assert_eq!(host.game(), joiner.game());

    let message = click_move(&mut joiner, at(2, 3), at(4, 3));
    host.apply_remote(message).unwrap();
    assert_eq!(host.game(), joiner.game());
    assert_eq!(host.game().current_player(), Player::One);
}

#[test]
fn test_clicks_ignored_on_remote_turn() {
    let (_, mut joiner) = peers();
    assert_eq!(joiner.handle_local_click(at(2, 4)), None);
    assert_eq!(joiner.game().selected(), None);
    assert!(!joiner.is_local_turn());
}

#[test]
fn test_remote_action_out_of_turn_rejected() {
    let (mut host, _) = peers();
    let message = WireMessage::from_action(&Action::Move {
        from: at(2, 4),
        mv: Move::Step { to: at(3, 4) },
    });

    let result = host.apply_remote(message);
    assert_eq!(
        result,
        Err(ReplicationError::OutOfTurn {
            current: Player::One,
        })
    );
    assert_eq!(host.game(), &Game::new());
}

#[test]
fn test_desynchronised_move_leaves_state_untouched() {
    let (_, mut joiner) = peers();
    let before = joiner.game().clone();

    let message = WireMessage::from_action(&Action::Move {
        from: at(8, 4),
        mv: Move::Step { to: at(5, 4) },
    });
    let result = joiner.apply_remote(message);

    assert_eq!(
        result,
        Err(ReplicationError::Rejected(TurnError::IllegalMove {
            from: at(8, 4),
            to: at(5, 4),
        }))
    );
    assert_eq!(joiner.game(), &before);
}

#[test]
fn test_remote_rescue_without_promotion_rejected() {
    let (_, mut joiner) = peers();
    let message = WireMessage::from_action(&Action::Rescue {
        ambassador: at(10, 3),
    });

    assert_eq!(
        joiner.apply_remote(message),
        Err(ReplicationError::Rejected(TurnError::NoRescuePending))
    );
}

#[test]
fn test_reset_mid_game() {
    let (mut host, mut joiner) = peers();
    let message = click_move(&mut host, at(8, 4), at(6, 4));
    joiner.apply_remote(message).unwrap();

    // Either side may reset, even off turn.
    let reset = host.reset_local();
    assert_eq!(reset, WireMessage::Reset);
    assert_eq!(joiner.apply_remote(reset), Ok(RemoteOutcome::Reset));

    assert_eq!(host.game(), &Game::new());
    assert_eq!(joiner.game(), &Game::new());
}

#[test]
fn test_frames_survive_the_codec() {
    let (mut host, mut joiner) = peers();
    let message = click_move(&mut host, at(8, 2), at(7, 2));

    let frame = message.encode().unwrap();
    let decoded = WireMessage::decode(&frame).unwrap();
    joiner.apply_remote(decoded).unwrap();
    assert_eq!(host.game(), joiner.game());
}

#[test]
fn test_out_of_bounds_frame_rejected() {
    let (_, mut joiner) = peers();
    let frame = r#"{"type":"move","move":{"startRow":12,"startCol":4,"move":{"r":6,"c":4,"type":"move"}}}"#;

    let result = WireMessage::decode(frame)
        .map_err(ReplicationError::from)
        .and_then(|message| joiner.apply_remote(message));
    assert_eq!(
        result,
        Err(ReplicationError::Protocol(ProtocolError::OutOfBounds {
            row: 12,
            col: 4,
        }))
    );
}

#[test]
fn test_hot_seat_controls_both_players() {
    let mut session = GameSession::hot_seat();
    click_move(&mut session, at(8, 4), at(7, 4));
    assert!(session.is_local_turn());
    click_move(&mut session, at(2, 4), at(3, 4));
    assert_eq!(session.game().current_player(), Player::One);
}

/// Player 1 can capture diagonally onto the promotion row with an Ambassador
/// waiting in the Sacrifice Zone.
fn promotion_peers() -> (GameSession, GameSession) {
    let mut board = Board::empty();
    board.set(at(3, 2), Some(Piece::governor(Player::One).moved()));
    board.set(at(2, 3), Some(Piece::governor(Player::Two).moved()));
    board.set(at(0, 6), Some(Piece::ambassador(Player::One).trapped()));
    board.set(at(6, 6), Some(Piece::governor(Player::Two).moved()));
    let game = Game::from_board(board, Player::One);

    let id = "127.0.0.1:7878".to_string();
    (
        GameSession::from_game(id.clone(), Seat::Single(Player::One), game.clone()),
        GameSession::from_game(id, Seat::Single(Player::Two), game),
    )
}

/// Sends `message` through the codec, as the transport would.
fn relay(message: WireMessage, to: &mut GameSession) -> RemoteOutcome {
    let frame = message.encode().unwrap();
    to.apply_remote(WireMessage::decode(&frame).unwrap()).unwrap()
}

#[test]
fn test_promotion_and_rescue_replicate_in_order() {
    let (mut host, mut joiner) = promotion_peers();

    let message = click_move(&mut host, at(3, 2), at(1, 4));
    assert!(matches!(message, WireMessage::Move { .. }));
    assert_eq!(
        relay(message, &mut joiner),
        RemoteOutcome::Applied(TurnOutcome::RescuePending { governor: at(1, 4) })
    );
    assert_eq!(host.game(), joiner.game());
    assert_eq!(joiner.game().pending_rescue(), Some(at(1, 4)));
    assert_eq!(joiner.game().last_flipped(), Some(at(2, 3)));

    // The rescue is still the host's turn.
    assert!(host.is_local_turn());
    let message = host
        .handle_local_click(at(0, 6))
        .expect("Rescue should be committed");
    assert!(matches!(message, WireMessage::Promotion { .. }));
    assert_eq!(
        relay(message, &mut joiner),
        RemoteOutcome::Applied(TurnOutcome::TurnPassed { next: Player::Two })
    );
    assert_eq!(host.game(), joiner.game());

    let rescued = joiner.game().board().get(at(1, 4)).unwrap();
    assert_eq!(rescued.kind(), PieceKind::Ambassador);
    assert!(!rescued.is_trapped());
    assert!(joiner.is_local_turn());
}

#[test]
fn test_rescue_before_its_move_is_rejected() {
    let (mut host, mut joiner) = promotion_peers();
    let move_message = click_move(&mut host, at(3, 2), at(1, 4));
    let rescue_message = host.handle_local_click(at(0, 6)).unwrap();

    let before = joiner.game().clone();
    assert_eq!(
        joiner.apply_remote(rescue_message),
        Err(ReplicationError::Rejected(TurnError::NoRescuePending))
    );
    assert_eq!(joiner.game(), &before);

    relay(move_message, &mut joiner);
    relay(rescue_message, &mut joiner);
    assert_eq!(host.game(), joiner.game());
}

#[test]
fn test_reset_clears_pending_rescue_and_immunity() {
    let (mut host, mut joiner) = promotion_peers();
    let message = click_move(&mut host, at(3, 2), at(1, 4));
    relay(message, &mut joiner);
    assert!(joiner.game().pending_rescue().is_some());
    assert!(joiner.game().last_flipped().is_some());

    let reset = joiner.reset_local();
    assert_eq!(relay(reset, &mut host), RemoteOutcome::Reset);

    for session in [&host, &joiner] {
        assert_eq!(session.game().pending_rescue(), None);
        assert_eq!(session.game().last_flipped(), None);
        assert_eq!(session.game().current_player(), Player::One);
        assert_eq!(session.game(), &Game::new());
    }
}
