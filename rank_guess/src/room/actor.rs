//! Room actor implementation with async message handling.

use super::{
    channel::{Outbound, deliver},
    config::{COMMUNITY_CARDS, HOLE_CARDS_PER_PLAYER, RoomConfig},
    errors::{RoomError, RoomResult},
    messages::{
        LeaveOutcome, LobbyPlayer, PlayerAction, PlayerId, PlayerResult, RoomCode, RoomEvent,
        RoomMessage, RoomPhase, RoomSnapshot,
    },
    scoring::rank_by_strength,
};
use crate::game::{Card, Deck, EvaluatedHand, evaluate_player_hand};
use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::Duration,
};

/// Room actor handle for sending messages
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    code: RoomCode,
}

impl RoomHandle {
    /// Create a new room handle
    pub fn new(sender: mpsc::Sender<RoomMessage>, code: RoomCode) -> Self {
        Self { sender, code }
    }

    /// Get room code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Whether the actor behind this handle has shut down
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the room
    pub async fn send(&self, message: RoomMessage) -> RoomResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| RoomError::RoomNotFound(self.code.clone()))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomMessage,
    ) -> RoomResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| RoomError::RoomNotFound(self.code.clone()))
    }

    /// Authorize a player to take a seat
    pub async fn whitelist(&self, player_id: PlayerId) -> RoomResult<()> {
        self.request(|response| RoomMessage::Whitelist {
            player_id,
            response,
        })
        .await?
    }

    pub async fn is_whitelisted(&self, player_id: PlayerId) -> RoomResult<bool> {
        self.request(|response| RoomMessage::IsWhitelisted {
            player_id,
            response,
        })
        .await
    }

    /// Seat a player under `name`, delivering room events to `channel`
    pub async fn join(&self, player_id: PlayerId, name: String, channel: Outbound) -> RoomResult<()> {
        self.request(|response| RoomMessage::Join {
            player_id,
            name,
            channel,
            response,
        })
        .await?
    }

    pub async fn leave(&self, player_id: PlayerId) -> RoomResult<LeaveOutcome> {
        self.request(|response| RoomMessage::Leave {
            player_id,
            channel: None,
            response,
        })
        .await
    }

    /// Leave on behalf of one connection. A seat since taken over by a newer
    /// channel is left alone and reported as `NotSeated`.
    pub async fn leave_from(&self, player_id: PlayerId, channel: Outbound) -> RoomResult<LeaveOutcome> {
        self.request(|response| RoomMessage::Leave {
            player_id,
            channel: Some(channel),
            response,
        })
        .await
    }

    /// Apply a player action
    pub async fn act(&self, player_id: PlayerId, action: PlayerAction) -> RoomResult<()> {
        self.request(|response| RoomMessage::Action {
            player_id,
            action,
            response,
        })
        .await?
    }

    pub async fn snapshot(&self) -> RoomResult<RoomSnapshot> {
        self.request(|response| RoomMessage::GetState { response }).await
    }
}

/// Where each round's deck comes from
#[derive(Debug)]
pub(crate) enum DeckSource {
    Shuffled,
    /// Dealt in order every round. Community cards first, then hole cards
    /// seat by seat in player id order.
    #[cfg(test)]
    Fixed(Vec<Card>),
}

/// Cards and score for one seat
#[derive(Debug, Default)]
struct PlayerGameData {
    hole_cards: Vec<Card>,
    hand: Option<EvaluatedHand>,
    /// 0 until a guess is submitted
    guess: u32,
    score: u32,
}

#[derive(Debug)]
struct PlayerState {
    channel: Outbound,
    is_ready: bool,
    name: String,
    game: PlayerGameData,
}

/// A scheduled timer message. Aborting the task stops it from firing;
/// the generation catches expiries already sitting in the inbox.
#[derive(Debug)]
struct RoomTimer {
    generation: u64,
    task: JoinHandle<()>,
}

/// Room actor running a single game session
pub struct RoomActor {
    /// Room code
    code: RoomCode,

    /// Room configuration
    config: RoomConfig,

    /// Lifecycle phase
    phase: RoomPhase,

    /// Seated players, iterated in id order
    players: BTreeMap<PlayerId, PlayerState>,

    /// Players allowed to take a seat
    whitelist: HashSet<PlayerId>,

    deck: Deck,
    deck_source: DeckSource,
    community_cards: Vec<Card>,

    /// Pending countdown to the first deal
    countdown: Option<RoomTimer>,

    /// Pending end of the results display
    round_timer: Option<RoomTimer>,

    /// Last timer generation handed out
    generation: u64,

    /// Message inbox
    inbox: mpsc::Receiver<RoomMessage>,

    /// Lets timers post back without keeping the inbox open
    timer_sender: mpsc::WeakSender<RoomMessage>,

    /// Is room closed
    is_closed: bool,
}

impl RoomActor {
    /// Create a new room actor
    ///
    /// # Returns
    ///
    /// * `(RoomActor, RoomHandle)` - Actor and handle for sending messages
    pub fn new(code: RoomCode, config: RoomConfig) -> (Self, RoomHandle) {
        Self::with_deck_source(code, config, DeckSource::Shuffled)
    }

    pub(crate) fn with_deck_source(
        code: RoomCode,
        config: RoomConfig,
        deck_source: DeckSource,
    ) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(100);

        let actor = Self {
            code: code.clone(),
            config,
            phase: RoomPhase::Lobby,
            players: BTreeMap::new(),
            whitelist: HashSet::new(),
            deck: Deck::default(),
            deck_source,
            community_cards: Vec::new(),
            countdown: None,
            round_timer: None,
            generation: 0,
            inbox,
            timer_sender: sender.downgrade(),
            is_closed: false,
        };

        let handle = RoomHandle::new(sender, code);

        (actor, handle)
    }

    /// Run the room actor event loop
    ///
    /// Returns when the last player leaves or every handle is dropped.
    pub async fn run(mut self) {
        log::info!("Room {} starting", self.code);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);

            if self.is_closed {
                break;
            }
        }

        self.cancel_timers();
        log::info!("Room {} closed", self.code);
    }

    /// Handle a room message
    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Whitelist {
                player_id,
                response,
            } => {
                let result = self.handle_whitelist(player_id);
                let _ = response.send(result);
            }

            RoomMessage::IsWhitelisted {
                player_id,
                response,
            } => {
                let _ = response.send(self.whitelist.contains(&player_id));
            }

            RoomMessage::Join {
                player_id,
                name,
                channel,
                response,
            } => {
                let result = self.handle_join(player_id, name, channel);
                let _ = response.send(result);
            }

            RoomMessage::Leave {
                player_id,
                channel,
                response,
            } => {
                let result = self.handle_leave(&player_id, channel.as_ref());
                let _ = response.send(result);
            }

            RoomMessage::Action {
                player_id,
                action,
                response,
            } => {
                let result = self.handle_action(&player_id, action);
                let _ = response.send(result);
            }

            RoomMessage::GetState { response } => {
                let _ = response.send(self.snapshot());
            }

            RoomMessage::CountdownElapsed { generation } => {
                if !Self::timer_matches(&self.countdown, generation) {
                    log::debug!("Room {}: ignoring stale countdown {}", self.code, generation);
                    return;
                }
                self.countdown = None;
                if self.phase == RoomPhase::Countdown {
                    self.deal_round();
                }
            }

            RoomMessage::ResultsElapsed { generation } => {
                if !Self::timer_matches(&self.round_timer, generation) {
                    log::debug!("Room {}: ignoring stale results timer {}", self.code, generation);
                    return;
                }
                self.round_timer = None;
                if self.phase == RoomPhase::Results {
                    self.wait_for_next_round();
                }
            }
        }
    }

    fn handle_whitelist(&mut self, player_id: PlayerId) -> RoomResult<()> {
        if self.whitelist.contains(&player_id) {
            return Ok(());
        }
        if self.whitelist.len() >= self.config.max_players {
            return Err(RoomError::RoomFull);
        }

        log::debug!("Room {}: whitelisted {}", self.code, player_id);
        self.whitelist.insert(player_id);
        Ok(())
    }

    fn handle_join(&mut self, player_id: PlayerId, name: String, channel: Outbound) -> RoomResult<()> {
        if !self.whitelist.contains(&player_id) {
            return Err(RoomError::NotWhitelisted(player_id));
        }

        // Reconnecting with a new channel keeps the seat but not readiness.
        if let Some(player) = self.players.get_mut(&player_id) {
            log::info!("Room {}: {} ({}) rejoined", self.code, name, player_id);
            player.channel = channel;
            player.name = name;
            player.is_ready = false;
            self.cancel_countdown();
            self.broadcast_roster();
            return Ok(());
        }

        if !matches!(
            self.phase,
            RoomPhase::Lobby | RoomPhase::Countdown | RoomPhase::WaitingForNextRound
        ) {
            return Err(self.wrong_phase("join"));
        }
        if self.players.len() >= self.config.max_players {
            return Err(RoomError::RoomFull);
        }

        log::info!("Room {}: {} ({}) joined", self.code, name, player_id);
        self.players.insert(
            player_id,
            PlayerState {
                channel,
                is_ready: false,
                name,
                game: PlayerGameData::default(),
            },
        );

        self.cancel_countdown();
        self.broadcast_roster();
        Ok(())
    }

    fn handle_leave(&mut self, player_id: &str, channel: Option<&Outbound>) -> LeaveOutcome {
        let Some(seated) = self.players.get(player_id) else {
            return LeaveOutcome::NotSeated;
        };
        if channel.is_some_and(|channel| !Arc::ptr_eq(&seated.channel, channel)) {
            log::debug!(
                "Room {}: {} left from a replaced connection, keeping seat",
                self.code,
                player_id
            );
            return LeaveOutcome::NotSeated;
        }
        let Some(player) = self.players.remove(player_id) else {
            return LeaveOutcome::NotSeated;
        };
        log::info!("Room {}: {} ({}) left", self.code, player.name, player_id);

        if self.players.is_empty() {
            self.cancel_timers();
            self.is_closed = true;
            return LeaveOutcome::RoomEmptied;
        }

        self.cancel_countdown();
        self.broadcast_roster();

        match self.phase {
            RoomPhase::Guessing if self.all_guessed() => self.finish_round(),
            RoomPhase::WaitingForNextRound if self.all_ready() => self.deal_round(),
            _ => {}
        }

        LeaveOutcome::Left
    }

    fn handle_action(&mut self, player_id: &str, action: PlayerAction) -> RoomResult<()> {
        if !self.players.contains_key(player_id) {
            return Err(RoomError::PlayerNotFound(player_id.to_string()));
        }

        match action {
            PlayerAction::SetReady { is_ready } => {
                self.set_ready(player_id, is_ready);
                match self.phase {
                    RoomPhase::Lobby if self.all_ready() => self.start_countdown(),
                    RoomPhase::Countdown if !is_ready => {
                        self.cancel_countdown();
                    }
                    RoomPhase::WaitingForNextRound if self.all_ready() => self.deal_round(),
                    _ => {}
                }
                Ok(())
            }

            PlayerAction::SubmitGuess { guess } => {
                if self.phase != RoomPhase::Guessing {
                    return Err(self.wrong_phase("submit a guess"));
                }
                let max = self.players.len() as u32;
                if guess == 0 || guess > max {
                    return Err(RoomError::InvalidGuess { guess, max });
                }

                if let Some(player) = self.players.get_mut(player_id) {
                    player.game.guess = guess;
                }
                log::debug!("Room {}: {} guessed {}", self.code, player_id, guess);

                if self.all_guessed() {
                    self.finish_round();
                }
                Ok(())
            }

            PlayerAction::NextRoundReady => {
                if self.phase != RoomPhase::WaitingForNextRound {
                    return Err(self.wrong_phase("ready up for the next round"));
                }
                self.set_ready(player_id, true);
                if self.all_ready() {
                    self.deal_round();
                }
                Ok(())
            }
        }
    }

    fn set_ready(&mut self, player_id: &str, is_ready: bool) {
        if let Some(player) = self.players.get_mut(player_id) {
            player.is_ready = is_ready;
        }
        self.broadcast_roster();
    }

    fn start_countdown(&mut self) {
        self.phase = RoomPhase::Countdown;
        log::info!(
            "Room {}: all {} players ready, dealing in {:?}",
            self.code,
            self.players.len(),
            self.config.countdown
        );

        self.broadcast(RoomEvent::GameStartCountdown {
            duration: self.config.countdown_secs(),
        });
        let timer = self.schedule(self.config.countdown, |generation| {
            RoomMessage::CountdownElapsed { generation }
        });
        self.countdown = Some(timer);
    }

    /// Calls off a running countdown and returns the room to the lobby.
    fn cancel_countdown(&mut self) {
        let Some(timer) = self.countdown.take() else {
            return;
        };
        timer.task.abort();

        if self.phase == RoomPhase::Countdown {
            log::info!("Room {}: countdown cancelled", self.code);
            self.phase = RoomPhase::Lobby;
            self.broadcast(RoomEvent::GameStartCancelled);
        }
    }

    fn cancel_timers(&mut self) {
        for timer in [self.countdown.take(), self.round_timer.take()]
            .into_iter()
            .flatten()
        {
            timer.task.abort();
        }
    }

    fn schedule(&mut self, delay: Duration, message: impl FnOnce(u64) -> RoomMessage) -> RoomTimer {
        self.generation += 1;
        let generation = self.generation;
        let message = message(generation);
        let sender = self.timer_sender.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(message).await;
            }
        });

        RoomTimer { generation, task }
    }

    fn timer_matches(timer: &Option<RoomTimer>, generation: u64) -> bool {
        timer.as_ref().is_some_and(|t| t.generation == generation)
    }

    /// Deals a round, closing the room if the deck can't cover the table.
    fn deal_round(&mut self) {
        if let Err(e) = self.try_deal_round() {
            log::error!("Room {}: dealing failed, closing room: {}", self.code, e);
            self.cancel_timers();
            self.is_closed = true;
        }
    }

    fn try_deal_round(&mut self) -> RoomResult<()> {
        self.phase = RoomPhase::Dealing;
        self.deck = match &self.deck_source {
            DeckSource::Shuffled => Deck::default().shuffled(),
            #[cfg(test)]
            DeckSource::Fixed(cards) => Deck::from_cards(cards.clone()),
        };
        self.community_cards = self.deck.deal(COMMUNITY_CARDS)?;

        for player in self.players.values_mut() {
            let hole_cards = self.deck.deal(HOLE_CARDS_PER_PLAYER)?;
            let hand = evaluate_player_hand(&hole_cards, &self.community_cards)?;
            player.game.hole_cards = hole_cards;
            player.game.hand = Some(hand);
            player.game.guess = 0;
        }

        for player in self.players.values() {
            deliver(
                &player.channel,
                RoomEvent::RoundStart {
                    name: player.name.clone(),
                    hole_cards: player.game.hole_cards.clone(),
                    community_cards: self.community_cards.clone(),
                },
            );
        }

        self.phase = RoomPhase::Guessing;
        log::info!("Room {}: dealt {} players", self.code, self.players.len());
        Ok(())
    }

    fn finish_round(&mut self) {
        self.phase = RoomPhase::Results;

        let ranking = rank_by_strength(
            self.players
                .iter()
                .filter_map(|(id, player)| player.game.hand.as_ref().map(|hand| (id.clone(), hand))),
        );

        let mut results = Vec::with_capacity(ranking.len());
        for (player_id, actual_rank) in ranking {
            let Some(player) = self.players.get_mut(&player_id) else {
                continue;
            };
            let Some(hand) = player.game.hand.as_ref() else {
                continue;
            };

            let is_correct = player.game.guess == actual_rank;
            if is_correct {
                player.game.score += 1;
            }

            results.push(PlayerResult {
                name: player.name.clone(),
                hole_cards: player.game.hole_cards.clone(),
                hand: hand.into(),
                guess: player.game.guess,
                actual_rank,
                is_correct,
                score: player.game.score,
            });
        }

        log::info!("Room {}: round finished", self.code);
        self.broadcast(RoomEvent::ShowResults { results });

        let timer = self.schedule(self.config.results_display, |generation| {
            RoomMessage::ResultsElapsed { generation }
        });
        self.round_timer = Some(timer);
    }

    fn wait_for_next_round(&mut self) {
        self.phase = RoomPhase::WaitingForNextRound;
        for player in self.players.values_mut() {
            player.is_ready = false;
            player.game.guess = 0;
        }
        self.broadcast_roster();
    }

    fn all_ready(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.is_ready)
    }

    fn all_guessed(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.game.guess != 0)
    }

    fn wrong_phase(&self, action: &'static str) -> RoomError {
        RoomError::WrongPhase {
            action,
            phase: self.phase.to_string(),
        }
    }

    fn roster(&self) -> Vec<LobbyPlayer> {
        self.players
            .values()
            .map(|p| LobbyPlayer {
                name: p.name.clone(),
                is_ready: p.is_ready,
            })
            .collect()
    }

    fn broadcast_roster(&self) {
        self.broadcast(RoomEvent::LobbyState {
            players: self.roster(),
        });
    }

    fn broadcast(&self, event: RoomEvent) {
        for player in self.players.values() {
            deliver(&player.channel, event.clone());
        }
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            phase: self.phase,
            max_players: self.config.max_players,
            player_count: self.players.len(),
            whitelist_count: self.whitelist.len(),
            players: self.roster(),
        }
    }
}
