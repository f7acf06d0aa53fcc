//! Tests for the async session loop over an in-memory transport.

use dragon_face::{
    Action, Coord, GameEvent, GameSession, Input, MemoryTransport, Move, Orchestrator, Player,
    Role, SessionEnd, Transport, WireMessage,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

fn at(row: u8, col: u8) -> Coord {
    Coord::new(row, col).unwrap()
}

struct Harness {
    input_tx: mpsc::UnboundedSender<Input>,
    event_rx: mpsc::UnboundedReceiver<GameEvent>,
    remote: MemoryTransport,
    task: JoinHandle<anyhow::Result<SessionEnd>>,
}

fn start(role: Role) -> Harness {
    let (local, remote) = MemoryTransport::pair();
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let session = GameSession::networked("memory".to_string(), role);

    let mut orchestrator = Orchestrator::new(session, local, input_rx, event_tx);
    let task = tokio::spawn(async move { orchestrator.run().await });

    Harness {
        input_tx,
        event_rx,
        remote,
        task,
    }
}

/// Waits for the first event matching `pred`.
async fn wait_for(
    events: &mut mpsc::UnboundedReceiver<GameEvent>,
    pred: impl Fn(&GameEvent) -> bool,
) -> GameEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.expect("Event channel closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("Timed out waiting for event")
}

#[tokio::test]
async fn test_publishes_initial_state() {
    let mut h = start(Role::Host);

    let snapshot = match wait_for(&mut h.event_rx, |_| true).await {
        GameEvent::StateChanged(snapshot) => snapshot,
        other => panic!("Expected initial state, got {:?}", other),
    };
    assert_eq!(snapshot.current_player(), &Player::One);

    h.input_tx.send(Input::Quit).unwrap();
    assert_eq!(h.task.await.unwrap().unwrap(), SessionEnd::LocalQuit);
}

#[tokio::test]
async fn test_local_move_is_broadcast() {
    let mut h = start(Role::Host);

    h.input_tx.send(Input::Click(at(8, 4))).unwrap();
    h.input_tx.send(Input::Click(at(6, 4))).unwrap();

    let frame = tokio::time::timeout(Duration::from_secs(5), h.remote.recv())
        .await
        .expect("Timed out waiting for frame")
        .unwrap()
        .expect("Frame expected");
    let action = WireMessage::decode(&frame).unwrap().into_action().unwrap();
    assert_eq!(
        action,
        Action::Move {
            from: at(8, 4),
            mv: Move::Step { to: at(6, 4) },
        }
    );

    h.input_tx.send(Input::Quit).unwrap();
    assert_eq!(h.task.await.unwrap().unwrap(), SessionEnd::LocalQuit);
}

#[tokio::test]
async fn test_remote_move_is_applied() {
    let mut h = start(Role::Joiner);

    let message = WireMessage::from_action(&Action::Move {
        from: at(8, 4),
        mv: Move::Step { to: at(6, 4) },
    });
    h.remote.send(&message).await.unwrap();

    let event = wait_for(&mut h.event_rx, |e| {
        matches!(e, GameEvent::StateChanged(s) if *s.current_player() == Player::Two)
    })
    .await;
    let GameEvent::StateChanged(snapshot) = event else {
        unreachable!();
    };
    assert!(snapshot.board().get(at(6, 4)).is_some());
    assert!(snapshot.board().is_empty(at(8, 4)));

    h.input_tx.send(Input::Quit).unwrap();
    assert_eq!(h.task.await.unwrap().unwrap(), SessionEnd::LocalQuit);
}

#[tokio::test]
async fn test_bad_remote_frames_raise_desync() {
    let mut h = start(Role::Host);

    h.remote.send_raw("{\"type\":\"chat\"}").unwrap();
    wait_for(&mut h.event_rx, |e| matches!(e, GameEvent::Desync(_))).await;

    // Player 2 cannot move on player 1's turn.
    let message = WireMessage::from_action(&Action::Move {
        from: at(2, 4),
        mv: Move::Step { to: at(3, 4) },
    });
    h.remote.send(&message).await.unwrap();
    wait_for(&mut h.event_rx, |e| matches!(e, GameEvent::Desync(_))).await;

    h.input_tx.send(Input::Quit).unwrap();
    assert_eq!(h.task.await.unwrap().unwrap(), SessionEnd::LocalQuit);
}

#[tokio::test]
async fn test_remote_reset_is_reported() {
    let mut h = start(Role::Joiner);

    h.remote.send(&WireMessage::Reset).await.unwrap();
    wait_for(&mut h.event_rx, |e| matches!(e, GameEvent::RemoteReset)).await;

    h.input_tx.send(Input::Quit).unwrap();
    assert_eq!(h.task.await.unwrap().unwrap(), SessionEnd::LocalQuit);
}

#[tokio::test]
async fn test_peer_disconnect_ends_session() {
    let Harness {
        input_tx,
        mut event_rx,
        remote,
        task,
    } = start(Role::Host);

    drop(remote);
    wait_for(&mut event_rx, |e| matches!(e, GameEvent::SessionEnded(_))).await;
    assert_eq!(task.await.unwrap().unwrap(), SessionEnd::PeerDisconnected);
    drop(input_tx);
}

#[tokio::test]
async fn test_closing_input_ends_session() {
    let Harness {
        input_tx,
        event_rx: _event_rx,
        remote: _remote,
        task,
    } = start(Role::Host);

    drop(input_tx);
    assert_eq!(task.await.unwrap().unwrap(), SessionEnd::InputClosed);
}
