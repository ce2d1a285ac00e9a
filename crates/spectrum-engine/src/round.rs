//! The per-room round state machine.
//!
//! [`Room`] is a pure state machine: every operation takes the caller's
//! identity and an RNG, mutates the room, and returns the addressed
//! events the transport should deliver. No channels, no clocks — the
//! runtime layer owns those, which keeps every transition deterministic
//! under a seeded RNG.
//!
//! Phase order within a round is strict:
//!
//! ```text
//! waiting → choosing_clue → guessing → revealing → (choosing_clue, next round)
//! ```
//!
//! The hidden target exists from round entry until reveal and is only
//! ever placed in the spymaster-addressed `yourTurnToClue` payload.

use rand::Rng;
use spectrum_protocol::{
    Card, Phase, Player, PlayerId, Recipient, RoomId, ServerEvent,
};

use crate::{cards, scoring, GameError};

/// An addressed outbound event.
pub type Outbound = (Recipient, ServerEvent);

/// Minimum roster size to start a round.
pub const MIN_PLAYERS: usize = 2;

/// Maximum roster size.
pub const MAX_PLAYERS: usize = 5;

/// A round action a rostered player can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundAction {
    /// Start the first round.
    Start,
    /// Spymaster submits the clue.
    GiveClue(String),
    /// A guesser submits the team's guess.
    SubmitGuess(u8),
    /// Spymaster reveals the target.
    Reveal,
}

/// One room's roster and round state.
///
/// Roster order is join order and defines spymaster rotation. The
/// `card`/`target`/`clue`/`guess` options are populated as the round
/// advances; `target` is taken at reveal, which doubles as the guard
/// against revealing twice.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    players: Vec<Player>,
    phase: Phase,
    spymaster: Option<PlayerId>,
    /// Roster slot where rotation resumes after the spymaster left.
    resume_slot: Option<usize>,
    card: Option<Card>,
    target: Option<u8>,
    clue: Option<String>,
    guess: Option<u8>,
    /// Monotonic round counter; tags deferred restarts.
    round: u64,
}

impl Room {
    /// Creates a room in `waiting` with the creator as its only player.
    pub fn new(id: RoomId, creator: PlayerId, display_name: &str) -> Self {
        Self {
            id,
            players: vec![Player {
                id: creator,
                display_name: display_name.to_string(),
                score: 0,
            }],
            phase: Phase::Waiting,
            spymaster: None,
            resume_slot: None,
            card: None,
            target: None,
            clue: None,
            guess: None,
            round: 0,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The current round number (0 before the first round).
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn spymaster(&self) -> Option<PlayerId> {
        self.spymaster
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player)
    }

    fn roster(&self) -> Vec<Player> {
        self.players.clone()
    }

    fn active_card(&self) -> Card {
        // Set at round entry, cleared only when the round state resets.
        self.card.clone().expect("card is set while a round is active")
    }

    // -----------------------------------------------------------------------
    // Roster changes
    // -----------------------------------------------------------------------

    /// Appends a player to the roster (join order preserved).
    ///
    /// The joiner receives a `roomJoined` snapshot with the current
    /// phase so a mid-round client can reconcile; the room hears
    /// `playerJoined`.
    pub fn join(
        &mut self,
        player: PlayerId,
        display_name: &str,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::RoomFull);
        }
        self.players.push(Player {
            id: player,
            display_name: display_name.to_string(),
            score: 0,
        });
        Ok(vec![
            (
                Recipient::All,
                ServerEvent::PlayerJoined {
                    players: self.roster(),
                },
            ),
            (
                Recipient::Player(player),
                ServerEvent::RoomJoined {
                    room_id: self.id,
                    players: self.roster(),
                    phase: self.phase,
                },
            ),
        ])
    }

    /// Removes a player from the roster.
    ///
    /// If the departing player was the spymaster mid-round, the round is
    /// abandoned (clue/guess/target discarded) and a new one begins
    /// immediately — no reveal, no result, no restart delay. Rotation
    /// resumes at the slot the departed spymaster held. If the remaining
    /// roster is too small for a round, the room falls back to `waiting`.
    ///
    /// An empty return with an empty roster means the room should be
    /// destroyed; there is no one left to notify.
    pub fn remove_player<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        rng: &mut R,
    ) -> Vec<Outbound> {
        let Some(slot) = self.players.iter().position(|p| p.id == player) else {
            return Vec::new();
        };
        let was_spymaster = self.spymaster == Some(player);
        self.players.remove(slot);

        if self.players.is_empty() {
            return Vec::new();
        }

        let mut out = vec![(
            Recipient::All,
            ServerEvent::PlayerLeft {
                players: self.roster(),
            },
        )];

        if was_spymaster {
            self.spymaster = None;
            self.resume_slot = Some(slot);
            if self.phase.in_round() {
                self.clear_round_state();
                if self.players.len() >= MIN_PLAYERS {
                    out.extend(self.begin_round(rng));
                } else {
                    self.phase = Phase::Waiting;
                }
            }
        }

        out
    }

    // -----------------------------------------------------------------------
    // Round actions
    // -----------------------------------------------------------------------

    /// Applies a round action on behalf of `sender`.
    ///
    /// The single transition entry point: guards are checked against the
    /// current phase and the sender's role; on failure the room is
    /// untouched and the error is for the caller alone.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        sender: PlayerId,
        action: RoundAction,
        rng: &mut R,
    ) -> Result<Vec<Outbound>, GameError> {
        if !self.contains(sender) {
            return Err(GameError::NotInRoom(sender));
        }
        match action {
            RoundAction::Start => self.start(rng),
            RoundAction::GiveClue(clue) => self.give_clue(sender, clue),
            RoundAction::SubmitGuess(value) => self.submit_guess(sender, value),
            RoundAction::Reveal => self.reveal(sender),
        }
    }

    /// `waiting → choosing_clue`: explicit start request.
    fn start<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.phase != Phase::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::InsufficientPlayers { min: MIN_PLAYERS });
        }
        Ok(self.begin_round(rng))
    }

    /// `choosing_clue → guessing`: spymaster submits the clue.
    fn give_clue(
        &mut self,
        sender: PlayerId,
        clue: String,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.phase != Phase::ChoosingClue {
            return Err(GameError::InvalidPhase(self.phase));
        }
        let spymaster = self.require_spymaster()?;
        if sender != spymaster {
            return Err(GameError::NotYourTurn);
        }

        self.clue = Some(clue.clone());
        self.phase = Phase::Guessing;

        Ok(vec![
            (
                Recipient::All,
                ServerEvent::ClueGiven {
                    clue,
                    card: self.active_card(),
                },
            ),
            (
                Recipient::AllExcept(spymaster),
                ServerEvent::YourTurnToGuess,
            ),
        ])
    }

    /// `guessing → revealing`: first valid guess wins.
    fn submit_guess(
        &mut self,
        sender: PlayerId,
        value: u8,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.phase != Phase::Guessing {
            return Err(GameError::InvalidPhase(self.phase));
        }
        let spymaster = self.require_spymaster()?;
        if sender == spymaster {
            return Err(GameError::NotYourTurn);
        }

        let value = value.min(scoring::MAX_VALUE);
        self.guess = Some(value);
        self.phase = Phase::Revealing;

        Ok(vec![
            (
                Recipient::All,
                ServerEvent::GuessSubmitted { guess_value: value },
            ),
            (Recipient::Player(spymaster), ServerEvent::YourTurnToReveal),
        ])
    }

    /// `revealing → (scored)`: spymaster reveals; score lands on the
    /// spymaster's total. The runtime schedules the next round.
    fn reveal(&mut self, sender: PlayerId) -> Result<Vec<Outbound>, GameError> {
        if self.phase != Phase::Revealing {
            return Err(GameError::InvalidPhase(self.phase));
        }
        let spymaster = self.require_spymaster()?;
        if sender != spymaster {
            return Err(GameError::NotYourTurn);
        }
        // Taking the target here also rejects a second reveal.
        let (Some(target), Some(guess)) = (self.target.take(), self.guess.take())
        else {
            return Err(GameError::InvalidPhase(self.phase));
        };

        let points = scoring::score_for(target.abs_diff(guess));
        if let Some(p) = self.players.iter_mut().find(|p| p.id == spymaster) {
            p.score += u32::from(points);
        }
        let clue = self.clue.take().unwrap_or_default();

        Ok(vec![(
            Recipient::All,
            ServerEvent::RoundResult {
                target_value: target,
                guess_value: guess,
                score_this_round: u32::from(points),
                players: self.roster(),
                card: self.active_card(),
                clue,
            },
        )])
    }

    /// Deferred restart after a reveal.
    ///
    /// Fires only if the room is still sitting on the revealed round
    /// `after_round` — an abandon/restart in between bumped the counter
    /// and makes this a no-op. Falls back to `waiting` if the roster
    /// shrank below a playable size.
    pub fn try_restart<R: Rng + ?Sized>(
        &mut self,
        after_round: u64,
        rng: &mut R,
    ) -> Option<Vec<Outbound>> {
        if self.round != after_round
            || self.phase != Phase::Revealing
            || self.target.is_some()
        {
            return None;
        }
        if self.players.len() < MIN_PLAYERS {
            self.clear_round_state();
            self.phase = Phase::Waiting;
            return None;
        }
        Some(self.begin_round(rng))
    }

    // -----------------------------------------------------------------------
    // Round entry
    // -----------------------------------------------------------------------

    /// Enters `choosing_clue`: seats the next spymaster, draws a card
    /// and target, computes the zone table, and announces the round.
    ///
    /// Rotation is round-robin over roster (join) order. The first
    /// selection in a room's lifetime is uniform-random; after a
    /// spymaster departure it resumes at the slot they held.
    fn begin_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Outbound> {
        let len = self.players.len();
        let slot = match self
            .spymaster
            .and_then(|id| self.players.iter().position(|p| p.id == id))
        {
            Some(current) => (current + 1) % len,
            None => match self.resume_slot.take() {
                Some(slot) => slot % len,
                None => rng.random_range(0..len),
            },
        };
        let spymaster = self.players[slot].id;

        let card = cards::draw(rng);
        let target = rng.random_range(1..=scoring::MAX_VALUE);

        self.spymaster = Some(spymaster);
        self.resume_slot = None;
        self.card = Some(card.clone());
        self.target = Some(target);
        self.clue = None;
        self.guess = None;
        self.round += 1;
        self.phase = Phase::ChoosingClue;

        vec![
            (
                Recipient::All,
                ServerEvent::NewRound {
                    spymaster_id: spymaster,
                    card: card.clone(),
                    players: self.roster(),
                },
            ),
            (
                Recipient::Player(spymaster),
                ServerEvent::YourTurnToClue {
                    card,
                    target_value: target,
                    score_zones: scoring::zones_for(target),
                },
            ),
        ]
    }

    fn clear_round_state(&mut self) {
        self.card = None;
        self.target = None;
        self.clue = None;
        self.guess = None;
    }

    fn require_spymaster(&self) -> Result<PlayerId, GameError> {
        // A round past `waiting` always has a seated spymaster.
        self.spymaster
            .ok_or(GameError::InvalidPhase(self.phase))
    }
}

// =========================================================================
// Tests
// =========================================================================
