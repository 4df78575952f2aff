//! Integration tests for the room lifecycle: readiness, countdown, dealing,
//! guessing, results and the next round.
//!
//! Time is paused so countdown and results timers fire as soon as the test
//! waits on them.

use rank_guess::{
    game::Card,
    room::{
        PlayerAction, Profile, ProfileDirectory, RoomConfig, RoomError, RoomEvent, RoomPhase,
        RoomRegistry,
    },
};
use std::{collections::HashSet, sync::Arc, time::Duration};
use tokio::sync::mpsc;

type Events = mpsc::UnboundedReceiver<RoomEvent>;

const NAMES: [&str; 4] = ["Alice", "Bob", "Carol", "Dave"];

async fn registry() -> RoomRegistry {
    let directory = ProfileDirectory::new();
    for (i, name) in NAMES.iter().enumerate() {
        directory
            .upsert(Profile {
                id: format!("p{}", i + 1),
                name: name.to_string(),
            })
            .await;
    }
    RoomRegistry::new(RoomConfig::default(), Arc::new(directory))
}

/// Creates a room and seats `n` players, returning their event streams.
async fn seated_room(registry: &RoomRegistry, n: usize) -> (String, Vec<Events>) {
    let code = registry.create_room().await;
    let mut streams = Vec::new();
    for i in 1..=n {
        let id = format!("p{i}");
        let (tx, rx) = mpsc::unbounded_channel();
        registry.whitelist(&code, &id).await.unwrap();
        registry.join(&code, &id, Arc::new(tx)).await.unwrap();
        streams.push(rx);
    }
    (code, streams)
}

async fn act(registry: &RoomRegistry, code: &str, id: &str, action: PlayerAction) -> Result<(), RoomError> {
    registry.handle_action(code, id, action).await
}

async fn ready_all(registry: &RoomRegistry, code: &str, n: usize) {
    for i in 1..=n {
        act(registry, code, &format!("p{i}"), PlayerAction::SetReady { is_ready: true })
            .await
            .unwrap();
    }
}

/// Next event that isn't a roster update.
async fn next_event(rx: &mut Events) -> RoomEvent {
    loop {
        match rx.recv().await.expect("room dropped the channel") {
            RoomEvent::LobbyState { .. } => continue,
            event => return event,
        }
    }
}

fn drain(rx: &mut Events) -> Vec<RoomEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

async fn phase(registry: &RoomRegistry, code: &str) -> RoomPhase {
    registry.get_room(code).await.unwrap().phase
}

#[tokio::test(start_paused = true)]
async fn test_full_round_with_four_players() {
    let registry = registry().await;
    let (code, mut streams) = seated_room(&registry, 4).await;
    assert_eq!(phase(&registry, &code).await, RoomPhase::Lobby);

    ready_all(&registry, &code, 4).await;
    assert_eq!(phase(&registry, &code).await, RoomPhase::Countdown);

    let mut seen: HashSet<Card> = HashSet::new();
    let mut community: Option<Vec<Card>> = None;
    for (rx, name) in streams.iter_mut().zip(NAMES) {
        assert_eq!(next_event(rx).await, RoomEvent::GameStartCountdown { duration: 5 });

        let RoomEvent::RoundStart {
            name: dealt_to,
            hole_cards,
            community_cards,
        } = next_event(rx).await
        else {
            panic!("expected a private deal");
        };
        assert_eq!(dealt_to, name);
        assert_eq!(hole_cards.len(), 4);
        assert_eq!(community_cards.len(), 5);

        match &community {
            Some(shared) => assert_eq!(shared, &community_cards),
            None => {
                seen.extend(community_cards.iter().copied());
                community = Some(community_cards);
            }
        }
        seen.extend(hole_cards);
    }
    assert_eq!(seen.len(), 4 * 4 + 5, "no card may be dealt twice");
    assert_eq!(phase(&registry, &code).await, RoomPhase::Guessing);

    for i in 1..=4 {
        act(&registry, &code, &format!("p{i}"), PlayerAction::SubmitGuess { guess: i })
            .await
            .unwrap();
    }

    let RoomEvent::ShowResults { results } = next_event(&mut streams[0]).await else {
        panic!("expected results");
    };
    assert_eq!(results.len(), 4);
    assert_eq!(results[0].actual_rank, 1);
    for result in &results {
        assert_eq!(result.is_correct, result.guess == result.actual_rank);
        assert_eq!(result.score, u32::from(result.is_correct));
        assert_eq!(result.hand.cards.len(), 5);
    }
    assert!(results.windows(2).all(|w| w[0].actual_rank <= w[1].actual_rank));
    assert_eq!(phase(&registry, &code).await, RoomPhase::Results);

    // Results stay up for the display period, then everyone is unready again.
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(phase(&registry, &code).await, RoomPhase::WaitingForNextRound);
    let snapshot = registry.get_room(&code).await.unwrap();
    assert!(snapshot.players.iter().all(|p| !p.is_ready));
}

#[tokio::test(start_paused = true)]
async fn test_next_round_deals_without_countdown() {
    let registry = registry().await;
    let (code, mut streams) = seated_room(&registry, 2).await;
    ready_all(&registry, &code, 2).await;

    for rx in &mut streams {
        next_event(rx).await;
        next_event(rx).await;
    }
    act(&registry, &code, "p1", PlayerAction::SubmitGuess { guess: 1 }).await.unwrap();
    act(&registry, &code, "p2", PlayerAction::SubmitGuess { guess: 1 }).await.unwrap();
    assert!(matches!(next_event(&mut streams[0]).await, RoomEvent::ShowResults { .. }));

    assert!(matches!(
        act(&registry, &code, "p1", PlayerAction::NextRoundReady).await,
        Err(RoomError::WrongPhase { .. })
    ));

    tokio::time::sleep(Duration::from_secs(11)).await;
    drain(&mut streams[0]);

    act(&registry, &code, "p1", PlayerAction::NextRoundReady).await.unwrap();
    assert_eq!(phase(&registry, &code).await, RoomPhase::WaitingForNextRound);
    act(&registry, &code, "p2", PlayerAction::NextRoundReady).await.unwrap();
    assert_eq!(phase(&registry, &code).await, RoomPhase::Guessing);

    let events = drain(&mut streams[0]);
    assert!(events.iter().any(|e| matches!(e, RoomEvent::RoundStart { .. })));
    assert!(!events.iter().any(|e| matches!(e, RoomEvent::GameStartCountdown { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_scores_accumulate_across_rounds() {
    let registry = registry().await;
    let (code, mut streams) = seated_room(&registry, 1).await;
    ready_all(&registry, &code, 1).await;
    assert!(matches!(
        next_event(&mut streams[0]).await,
        RoomEvent::GameStartCountdown { .. }
    ));

    for round in 1..=2u32 {
        assert!(matches!(next_event(&mut streams[0]).await, RoomEvent::RoundStart { .. }));
        // The only seat is always rank 1.
        act(&registry, &code, "p1", PlayerAction::SubmitGuess { guess: 1 }).await.unwrap();
        let RoomEvent::ShowResults { results } = next_event(&mut streams[0]).await else {
            panic!("expected results");
        };
        assert_eq!(results[0].score, round);

        tokio::time::sleep(Duration::from_secs(11)).await;
        act(&registry, &code, "p1", PlayerAction::NextRoundReady).await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_unready_during_countdown_cancels_deal() {
    let registry = registry().await;
    let (code, mut streams) = seated_room(&registry, 2).await;
    ready_all(&registry, &code, 2).await;
    assert_eq!(next_event(&mut streams[1]).await, RoomEvent::GameStartCountdown { duration: 5 });

    act(&registry, &code, "p1", PlayerAction::SetReady { is_ready: false }).await.unwrap();
    assert_eq!(next_event(&mut streams[1]).await, RoomEvent::GameStartCancelled);
    assert_eq!(phase(&registry, &code).await, RoomPhase::Lobby);

    // Well past the original deadline: nothing was dealt.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(phase(&registry, &code).await, RoomPhase::Lobby);
    assert!(
        !drain(&mut streams[1])
            .iter()
            .any(|e| matches!(e, RoomEvent::RoundStart { .. }))
    );

    // Readying again restarts the countdown from scratch.
    act(&registry, &code, "p1", PlayerAction::SetReady { is_ready: true }).await.unwrap();
    assert_eq!(next_event(&mut streams[1]).await, RoomEvent::GameStartCountdown { duration: 5 });
    assert!(matches!(next_event(&mut streams[1]).await, RoomEvent::RoundStart { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_join_during_countdown_cancels_it() {
    let registry = registry().await;
    let (code, mut streams) = seated_room(&registry, 1).await;
    ready_all(&registry, &code, 1).await;
    assert_eq!(next_event(&mut streams[0]).await, RoomEvent::GameStartCountdown { duration: 5 });

    let (tx, _rx) = mpsc::unbounded_channel();
    registry.whitelist(&code, "p2").await.unwrap();
    registry.join(&code, "p2", Arc::new(tx)).await.unwrap();

    assert_eq!(next_event(&mut streams[0]).await, RoomEvent::GameStartCancelled);
    let snapshot = registry.get_room(&code).await.unwrap();
    assert_eq!(snapshot.phase, RoomPhase::Lobby);
    assert_eq!(snapshot.player_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_roster_broadcast_on_ready() {
    let registry = registry().await;
    let (code, mut streams) = seated_room(&registry, 2).await;
    drain(&mut streams[1]);

    act(&registry, &code, "p1", PlayerAction::SetReady { is_ready: true }).await.unwrap();
    let RoomEvent::LobbyState { players } = streams[1].recv().await.unwrap() else {
        panic!("expected roster");
    };
    assert_eq!(players.len(), 2);
    assert_eq!(players[0].name, "Alice");
    assert!(players[0].is_ready);
    assert!(!players[1].is_ready);
}

#[tokio::test(start_paused = true)]
async fn test_actions_from_unseated_player() {
    let registry = registry().await;
    let (code, _streams) = seated_room(&registry, 1).await;

    assert_eq!(
        act(&registry, &code, "p4", PlayerAction::SetReady { is_ready: true }).await,
        Err(RoomError::PlayerNotFound("p4".to_string()))
    );
    assert_eq!(phase(&registry, &code).await, RoomPhase::Lobby);
}

#[tokio::test(start_paused = true)]
async fn test_closed_channel_does_not_stall_room() {
    let registry = registry().await;
    let (code, mut streams) = seated_room(&registry, 2).await;
    let gone = streams.remove(1);
    drop(gone);

    ready_all(&registry, &code, 2).await;
    assert!(matches!(next_event(&mut streams[0]).await, RoomEvent::GameStartCountdown { .. }));
    assert!(matches!(next_event(&mut streams[0]).await, RoomEvent::RoundStart { .. }));
    assert_eq!(phase(&registry, &code).await, RoomPhase::Guessing);
}
