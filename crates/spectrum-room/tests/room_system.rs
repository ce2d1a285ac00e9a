//! Integration tests driving the registry and room actors through
//! per-player event channels, the way a transport collaborator would.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use spectrum_engine::scoring;
use spectrum_protocol::{ClientEvent, Phase, PlayerId, RoomId, ServerEvent};
use spectrum_room::{PlayerSender, RoomError, RoomRegistry};
use tokio::sync::mpsc;

type Rx = mpsc::UnboundedReceiver<ServerEvent>;

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn channel() -> (PlayerSender, Rx) {
    mpsc::unbounded_channel()
}

/// Receives the next event, with a timeout so a broken dispatch fails
/// the test instead of hanging it.
async fn next_event(rx: &mut Rx) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(30), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

/// Receives until an event matching `pred` arrives, returning it.
async fn wait_for(rx: &mut Rx, pred: impl Fn(&ServerEvent) -> bool) -> ServerEvent {
    loop {
        let event = next_event(rx).await;
        if pred(&event) {
            return event;
        }
    }
}

/// Pulls everything currently queued without waiting.
fn drain(rx: &mut Rx) -> Vec<ServerEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

/// Registry with one room holding players P-1..P-n (P-1 created it).
async fn registry_with_room(
    n: u64,
) -> (
    RoomRegistry,
    RoomId,
    HashMap<PlayerId, PlayerSender>,
    HashMap<PlayerId, Rx>,
) {
    let mut registry = RoomRegistry::new();
    let mut txs = HashMap::new();
    let mut rxs = HashMap::new();

    let (tx, rx) = channel();
    let room_id = registry.create_room(pid(1), "player-1", tx.clone()).unwrap();
    txs.insert(pid(1), tx);
    rxs.insert(pid(1), rx);

    for i in 2..=n {
        let (tx, rx) = channel();
        registry
            .join_room(pid(i), room_id, &format!("player-{i}"), tx.clone())
            .await
            .unwrap();
        txs.insert(pid(i), tx);
        rxs.insert(pid(i), rx);
    }

    (registry, room_id, txs, rxs)
}

/// Starts the game and returns the seated spymaster and one guesser.
async fn start_game(
    registry: &mut RoomRegistry,
    room_id: RoomId,
    txs: &HashMap<PlayerId, PlayerSender>,
    rxs: &mut HashMap<PlayerId, Rx>,
) -> (PlayerId, PlayerId) {
    registry
        .handle_event(
            pid(1),
            ClientEvent::StartGame { room_id },
            txs[&pid(1)].clone(),
        )
        .await;

    let event = wait_for(rxs.get_mut(&pid(1)).unwrap(), |e| {
        matches!(e, ServerEvent::NewRound { .. })
    })
    .await;
    let spymaster = match event {
        ServerEvent::NewRound { spymaster_id, .. } => spymaster_id,
        _ => unreachable!(),
    };
    let guesser = txs
        .keys()
        .copied()
        .find(|id| *id != spymaster)
        .expect("at least one guesser");
    (spymaster, guesser)
}

// =========================================================================
// Registry
// =========================================================================

#[tokio::test]
async fn test_create_room_delivers_room_created() {
    let mut registry = RoomRegistry::new();
    let (tx, mut rx) = channel();
    let room_id = registry.create_room(pid(1), "Ada", tx).unwrap();

    assert_eq!(room_id.as_str().len(), 4);
    assert!(room_id.as_str().bytes().all(|c| RoomId::ALPHABET.contains(&c)));

    let event = next_event(&mut rx).await;
    match event {
        ServerEvent::RoomCreated { room_id: id, players } => {
            assert_eq!(id, room_id);
            assert_eq!(players.len(), 1);
            assert_eq!(players[0].display_name, "Ada");
            assert_eq!(players[0].score, 0);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(registry.room_count(), 1);
}

#[tokio::test]
async fn test_room_codes_are_unique_among_live_rooms() {
    let mut registry = RoomRegistry::new();
    let mut codes = HashSet::new();
    for i in 1..=40 {
        let (tx, _rx) = channel();
        let room_id = registry.create_room(pid(i), "p", tx).unwrap();
        assert!(codes.insert(room_id), "duplicate code {room_id}");
    }
    assert_eq!(registry.room_count(), 40);
}

#[tokio::test]
async fn test_join_unknown_room_fails() {
    let mut registry = RoomRegistry::new();
    let (tx, _rx) = channel();
    let result = registry
        .join_room(pid(1), "ZZ99".parse().unwrap(), "Ada", tx)
        .await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_sixth_join_rejected_with_error_event() {
    let (mut registry, room_id, _txs, _rxs) = registry_with_room(5).await;

    let (tx, mut rx) = channel();
    registry
        .handle_event(
            pid(6),
            ClientEvent::JoinRoom {
                room_id,
                display_name: "player-6".into(),
            },
            tx,
        )
        .await;

    let event = next_event(&mut rx).await;
    assert!(matches!(event, ServerEvent::Error { .. }));

    let info = registry.room_info(room_id).await.unwrap();
    assert_eq!(info.player_count, 5);
    assert_eq!(registry.player_room(&pid(6)), None);
}

#[tokio::test]
async fn test_one_room_per_player() {
    let mut registry = RoomRegistry::new();
    let (tx1, _rx1) = channel();
    let room_a = registry.create_room(pid(1), "Ada", tx1).unwrap();

    let (tx1b, _rx1b) = channel();
    let result = registry.create_room(pid(1), "Ada", tx1b);
    assert!(matches!(result, Err(RoomError::AlreadyInRoom(p, r)) if p == pid(1) && r == room_a));

    let (tx2, _rx2) = channel();
    let room_b = registry.create_room(pid(2), "Grace", tx2).unwrap();
    let (tx1c, _rx1c) = channel();
    let result = registry.join_room(pid(1), room_b, "Ada", tx1c).await;
    assert!(matches!(result, Err(RoomError::AlreadyInRoom(..))));
}

#[tokio::test]
async fn test_action_on_foreign_room_rejected() {
    let (mut registry, _room_a, txs, mut rxs) = registry_with_room(2).await;
    let (tx3, _rx3) = channel();
    let room_b = registry.create_room(pid(3), "other", tx3).unwrap();

    registry
        .handle_event(
            pid(1),
            ClientEvent::StartGame { room_id: room_b },
            txs[&pid(1)].clone(),
        )
        .await;

    let event = wait_for(rxs.get_mut(&pid(1)).unwrap(), |e| {
        matches!(e, ServerEvent::Error { .. })
    })
    .await;
    match event {
        ServerEvent::Error { message } => {
            assert!(message.contains("not in this room"), "got: {message}");
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_disconnect_destroys_empty_room() {
    let mut registry = RoomRegistry::new();
    let (tx, _rx) = channel();
    let room_id = registry.create_room(pid(1), "Ada", tx).unwrap();
    assert_eq!(registry.room_count(), 1);

    registry.disconnect(pid(1)).await;
    assert_eq!(registry.room_count(), 0);
    assert_eq!(registry.player_room(&pid(1)), None);

    // The code is gone for joiners too.
    let (tx2, _rx2) = channel();
    let result = registry.join_room(pid(2), room_id, "Grace", tx2).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_disconnect_when_not_in_a_room_is_noop() {
    let mut registry = RoomRegistry::new();
    registry.disconnect(pid(42)).await;
    assert_eq!(registry.room_count(), 0);
}

// =========================================================================
// Round flow through the actors
// =========================================================================

#[tokio::test]
async fn test_full_round_flow() {
    let (mut registry, room_id, txs, mut rxs) = registry_with_room(3).await;
    let (spymaster, guesser) = start_game(&mut registry, room_id, &txs, &mut rxs).await;

    // Spymaster alone gets the target and zones.
    let event = wait_for(rxs.get_mut(&spymaster).unwrap(), |e| {
        matches!(e, ServerEvent::YourTurnToClue { .. })
    })
    .await;
    let target = match event {
        ServerEvent::YourTurnToClue { target_value, score_zones, .. } => {
            assert_eq!(score_zones.tier(target_value), 4);
            target_value
        }
        _ => unreachable!(),
    };

    // Clue.
    registry
        .handle_event(
            spymaster,
            ClientEvent::SendClue {
                room_id,
                clue: "lukewarm".into(),
            },
            txs[&spymaster].clone(),
        )
        .await;
    wait_for(rxs.get_mut(&guesser).unwrap(), |e| {
        matches!(e, ServerEvent::ClueGiven { .. })
    })
    .await;
    let event = next_event(rxs.get_mut(&guesser).unwrap()).await;
    assert_eq!(event, ServerEvent::YourTurnToGuess);

    let info = registry.room_info(room_id).await.unwrap();
    assert_eq!(info.phase, Phase::Guessing);

    // Guess.
    registry
        .handle_event(
            guesser,
            ClientEvent::SendGuess {
                room_id,
                guess_value: 61,
            },
            txs[&guesser].clone(),
        )
        .await;
    wait_for(rxs.get_mut(&spymaster).unwrap(), |e| {
        matches!(e, ServerEvent::YourTurnToReveal)
    })
    .await;

    // Reveal: everyone gets the result, the spymaster gets the points.
    registry
        .handle_event(
            spymaster,
            ClientEvent::RevealAnswer { room_id },
            txs[&spymaster].clone(),
        )
        .await;
    for rx in rxs.values_mut() {
        let event = wait_for(rx, |e| matches!(e, ServerEvent::RoundResult { .. })).await;
        match event {
            ServerEvent::RoundResult {
                target_value,
                guess_value,
                score_this_round,
                players,
                clue,
                ..
            } => {
                assert_eq!(target_value, target);
                assert_eq!(guess_value, 61);
                assert_eq!(clue, "lukewarm");
                let expected =
                    u32::from(scoring::score_for(target.abs_diff(61)));
                assert_eq!(score_this_round, expected);
                for p in &players {
                    let want = if p.id == spymaster { expected } else { 0 };
                    assert_eq!(p.score, want);
                }
            }
            _ => unreachable!(),
        }
    }
}

#[tokio::test]
async fn test_target_not_sent_to_guessers_before_reveal() {
    let (mut registry, room_id, txs, mut rxs) = registry_with_room(3).await;
    let (spymaster, guesser) = start_game(&mut registry, room_id, &txs, &mut rxs).await;

    registry
        .handle_event(
            spymaster,
            ClientEvent::SendClue {
                room_id,
                clue: "tepid".into(),
            },
            txs[&spymaster].clone(),
        )
        .await;
    wait_for(rxs.get_mut(&guesser).unwrap(), |e| {
        matches!(e, ServerEvent::YourTurnToGuess)
    })
    .await;

    // Everything any guesser has seen so far is target-free.
    for (player, rx) in rxs.iter_mut() {
        if *player == spymaster {
            continue;
        }
        for event in drain(rx) {
            let json = serde_json::to_string(&event).unwrap();
            assert!(
                !json.contains("targetValue") && !json.contains("scoreZones"),
                "target leaked to {player}: {json}"
            );
        }
    }
}

#[tokio::test]
async fn test_error_goes_only_to_the_offender() {
    let (mut registry, room_id, txs, mut rxs) = registry_with_room(2).await;

    // A guess while still waiting is out of phase.
    registry
        .handle_event(
            pid(2),
            ClientEvent::SendGuess {
                room_id,
                guess_value: 50,
            },
            txs[&pid(2)].clone(),
        )
        .await;

    let event = wait_for(rxs.get_mut(&pid(2)).unwrap(), |e| {
        matches!(e, ServerEvent::Error { .. })
    })
    .await;
    match event {
        ServerEvent::Error { message } => {
            assert!(message.contains("waiting"), "got: {message}");
        }
        _ => unreachable!(),
    }

    // The innocent player saw roster events, never an error.
    let innocent = drain(rxs.get_mut(&pid(1)).unwrap());
    assert!(!innocent.iter().any(|e| matches!(e, ServerEvent::Error { .. })));

    // Room state untouched.
    let info = registry.room_info(room_id).await.unwrap();
    assert_eq!(info.phase, Phase::Waiting);
}

#[tokio::test]
async fn test_late_joiner_sees_current_phase() {
    let (mut registry, room_id, txs, mut rxs) = registry_with_room(2).await;
    start_game(&mut registry, room_id, &txs, &mut rxs).await;

    let (tx, mut rx) = channel();
    registry
        .join_room(pid(3), room_id, "player-3", tx)
        .await
        .unwrap();

    let event = wait_for(&mut rx, |e| matches!(e, ServerEvent::RoomJoined { .. })).await;
    match event {
        ServerEvent::RoomJoined { phase, players, .. } => {
            assert_eq!(phase, Phase::ChoosingClue);
            assert_eq!(players.len(), 3);
        }
        _ => unreachable!(),
    }
}

// =========================================================================
// Disconnects mid-round
// =========================================================================

#[tokio::test]
async fn test_guesser_disconnect_keeps_round_going() {
    let (mut registry, room_id, txs, mut rxs) = registry_with_room(3).await;
    let (spymaster, guesser) = start_game(&mut registry, room_id, &txs, &mut rxs).await;

    registry
        .handle_event(
            spymaster,
            ClientEvent::SendClue {
                room_id,
                clue: "clue".into(),
            },
            txs[&spymaster].clone(),
        )
        .await;

    registry.disconnect(guesser).await;

    wait_for(rxs.get_mut(&spymaster).unwrap(), |e| {
        matches!(e, ServerEvent::PlayerLeft { .. })
    })
    .await;

    let info = registry.room_info(room_id).await.unwrap();
    assert_eq!(info.phase, Phase::Guessing);
    assert_eq!(info.player_count, 2);
}

#[tokio::test]
async fn test_spymaster_disconnect_abandons_and_restarts() {
    let (mut registry, room_id, txs, mut rxs) = registry_with_room(3).await;
    let (spymaster, guesser) = start_game(&mut registry, room_id, &txs, &mut rxs).await;

    registry
        .handle_event(
            spymaster,
            ClientEvent::SendClue {
                room_id,
                clue: "clue".into(),
            },
            txs[&spymaster].clone(),
        )
        .await;
    wait_for(rxs.get_mut(&guesser).unwrap(), |e| {
        matches!(e, ServerEvent::YourTurnToGuess)
    })
    .await;

    registry.disconnect(spymaster).await;

    // A survivor sees the roster change, then the fresh round — and
    // never a result for the abandoned round.
    let rx = rxs.get_mut(&guesser).unwrap();
    wait_for(rx, |e| matches!(e, ServerEvent::PlayerLeft { .. })).await;
    let event = next_event(rx).await;
    match event {
        ServerEvent::NewRound { spymaster_id, players, .. } => {
            assert_ne!(spymaster_id, spymaster);
            assert_eq!(players.len(), 2);
            assert!(players.iter().all(|p| p.score == 0));
        }
        other => panic!("expected an immediate new round, got {other:?}"),
    }
    assert!(!drain(rx)
        .iter()
        .any(|e| matches!(e, ServerEvent::RoundResult { .. })));

    let info = registry.room_info(room_id).await.unwrap();
    assert_eq!(info.phase, Phase::ChoosingClue);
}

// =========================================================================
// Deferred restart
// =========================================================================

/// Drives a 2-player room through one whole round up to the result.
async fn play_one_round(
    registry: &mut RoomRegistry,
    room_id: RoomId,
    txs: &HashMap<PlayerId, PlayerSender>,
    rxs: &mut HashMap<PlayerId, Rx>,
) -> PlayerId {
    let (spymaster, guesser) = start_game(registry, room_id, txs, rxs).await;
    registry
        .handle_event(
            spymaster,
            ClientEvent::SendClue {
                room_id,
                clue: "clue".into(),
            },
            txs[&spymaster].clone(),
        )
        .await;
    registry
        .handle_event(
            guesser,
            ClientEvent::SendGuess {
                room_id,
                guess_value: 50,
            },
            txs[&guesser].clone(),
        )
        .await;
    wait_for(rxs.get_mut(&spymaster).unwrap(), |e| {
        matches!(e, ServerEvent::YourTurnToReveal)
    })
    .await;
    registry
        .handle_event(
            spymaster,
            ClientEvent::RevealAnswer { room_id },
            txs[&spymaster].clone(),
        )
        .await;
    wait_for(rxs.get_mut(&guesser).unwrap(), |e| {
        matches!(e, ServerEvent::RoundResult { .. })
    })
    .await;
    spymaster
}

#[tokio::test(start_paused = true)]
async fn test_next_round_starts_automatically_after_reveal() {
    let (mut registry, room_id, txs, mut rxs) = registry_with_room(2).await;
    let spymaster = play_one_round(&mut registry, room_id, &txs, &mut rxs).await;

    // The paused clock advances through the 5 s delay while we wait.
    let rx = rxs.get_mut(&spymaster).unwrap();
    let event = wait_for(rx, |e| matches!(e, ServerEvent::NewRound { .. })).await;
    match event {
        ServerEvent::NewRound { spymaster_id, .. } => {
            // Two players: strict rotation hands the role over.
            assert_ne!(spymaster_id, spymaster);
        }
        _ => unreachable!(),
    }
    let info = registry.room_info(room_id).await.unwrap();
    assert_eq!(info.phase, Phase::ChoosingClue);
}

#[tokio::test(start_paused = true)]
async fn test_restart_is_noop_for_a_destroyed_room() {
    let (mut registry, _room_id, txs, mut rxs) = registry_with_room(2).await;
    play_one_round(&mut registry, _room_id, &txs, &mut rxs).await;

    // Everyone leaves during the result screen.
    registry.disconnect(pid(1)).await;
    registry.disconnect(pid(2)).await;
    assert_eq!(registry.room_count(), 0);

    // Let the scheduled restart fire into the void.
    tokio::time::advance(Duration::from_secs(6)).await;
    tokio::task::yield_now().await;

    assert_eq!(registry.room_count(), 0);
    for rx in rxs.values_mut() {
        assert!(!drain(rx)
            .iter()
            .any(|e| matches!(e, ServerEvent::NewRound { .. })));
    }
}
