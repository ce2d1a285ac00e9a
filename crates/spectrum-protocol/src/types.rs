//! The event vocabulary the game core shares with its transport.
//!
//! The transport collaborator delivers [`ClientEvent`]s into the core and
//! carries [`ServerEvent`]s back out, each addressed by a [`Recipient`].
//! Everything here is wire-shaped: the serde attributes pin the exact
//! JSON the client SDK expects (camelCase tags and fields).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque per-connection player identifier, assigned by the transport.
///
/// Newtype over `u64` so a player id can never be confused with any other
/// number. `#[serde(transparent)]` keeps the wire form a plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A 4-character room code from the alphabet `A–Z0–9`, e.g. `"K7PQ"`.
///
/// Players type these to join, so they are short, uppercase, and
/// validated on the way in. Stored inline as bytes to stay `Copy`;
/// serialized as a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId([u8; 4]);

impl RoomId {
    /// Number of characters in a room code.
    pub const LEN: usize = 4;

    /// Characters a room code may contain.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Builds a room id from raw bytes, validating the alphabet.
    pub fn new(code: [u8; Self::LEN]) -> Result<Self, ProtocolError> {
        if code
            .iter()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            Ok(Self(code))
        } else {
            Err(ProtocolError::InvalidRoomId(
                String::from_utf8_lossy(&code).into_owned(),
            ))
        }
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        // Validated ASCII on construction.
        std::str::from_utf8(&self.0).expect("room id is ASCII")
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; Self::LEN] = s
            .as_bytes()
            .try_into()
            .map_err(|_| ProtocolError::InvalidRoomId(s.to_string()))?;
        Self::new(bytes)
    }
}

impl TryFrom<String> for RoomId {
    type Error = ProtocolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive a server event?
// ---------------------------------------------------------------------------

/// Addressing for an outbound event.
///
/// The round engine never talks to connections directly; it returns
/// `(Recipient, ServerEvent)` pairs and the transport resolves the
/// recipient set. This is what keeps the hidden target out of broadcast
/// payloads — spymaster-only events are `Player(spymaster)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every player in the room.
    All,

    /// One specific player.
    Player(PlayerId),

    /// Everyone except the specified player (e.g. "your turn to guess"
    /// goes to everyone but the spymaster).
    AllExcept(PlayerId),
}

// ---------------------------------------------------------------------------
// Game data carried in event payloads
// ---------------------------------------------------------------------------

/// A player as the roster sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    /// Cumulative score across rounds. Points go to the spymaster.
    pub score: u32,
}

/// A themed spectrum, e.g. "Hot" ↔ "Cold".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub left_label: String,
    pub right_label: String,
}

/// Round phase. Transitions are monotonic within a round:
///
/// ```text
/// waiting → choosing_clue → guessing → revealing → (choosing_clue, next round)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Waiting,
    ChoosingClue,
    Guessing,
    Revealing,
}

impl Phase {
    /// Returns `true` if a round is in flight (anything past `waiting`).
    pub fn in_round(&self) -> bool {
        !matches!(self, Self::Waiting)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::ChoosingClue => write!(f, "choosing_clue"),
            Self::Guessing => write!(f, "guessing"),
            Self::Revealing => write!(f, "revealing"),
        }
    }
}

/// Score tier for every guess value in `[0, 100]`, relative to one
/// round's target. Spymaster-only guidance; never broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreZones(pub Vec<u8>);

impl ScoreZones {
    /// The tier a guess of `value` would earn.
    pub fn tier(&self, value: u8) -> u8 {
        self.0.get(value as usize).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// ClientEvent — inbound
// ---------------------------------------------------------------------------

/// Events the transport delivers into the core on behalf of a player.
///
/// The sending player's [`PlayerId`] is not part of the payload — the
/// transport knows which connection an event arrived on and passes it
/// alongside. Disconnects are likewise implicit (a registry call), not
/// a wire event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Create a room and join it as the first player.
    CreateRoom { display_name: String },

    /// Join an existing room by code.
    JoinRoom { room_id: RoomId, display_name: String },

    /// Start the first round (any member, roster permitting).
    StartGame { room_id: RoomId },

    /// Spymaster submits the clue for the current card.
    SendClue { room_id: RoomId, clue: String },

    /// A guesser submits the team's guess. First valid submission wins.
    SendGuess { room_id: RoomId, guess_value: u8 },

    /// Spymaster reveals the target and ends the round.
    RevealAnswer { room_id: RoomId },
}

// ---------------------------------------------------------------------------
// ServerEvent — outbound
// ---------------------------------------------------------------------------

/// Events the core hands back to the transport, each paired with a
/// [`Recipient`].
///
/// The hidden target appears in exactly two places: `yourTurnToClue`
/// (addressed to the spymaster alone) and `roundResult` (broadcast only
/// once the round is over).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// The caller's room was created; they are its only member.
    RoomCreated { room_id: RoomId, players: Vec<Player> },

    /// Sent to a joiner so a late-joining client can reconcile UI state.
    RoomJoined {
        room_id: RoomId,
        players: Vec<Player>,
        phase: Phase,
    },

    /// Roster changed: someone joined.
    PlayerJoined { players: Vec<Player> },

    /// A new round began. Target and zones are withheld here.
    NewRound {
        spymaster_id: PlayerId,
        card: Card,
        players: Vec<Player>,
    },

    /// The spymaster's clue, echoed to the whole room.
    ClueGiven { clue: String, card: Card },

    /// The team's guess, echoed to the whole room.
    GuessSubmitted { guess_value: u8 },

    /// Full result of a finished round.
    RoundResult {
        target_value: u8,
        guess_value: u8,
        score_this_round: u32,
        players: Vec<Player>,
        card: Card,
        clue: String,
    },

    /// Roster changed: someone left.
    PlayerLeft { players: Vec<Player> },

    /// Spymaster only: the hidden target and its scoring zones.
    YourTurnToClue {
        card: Card,
        target_value: u8,
        score_zones: ScoreZones,
    },

    /// Each guesser: the clue is in, submit a guess.
    YourTurnToGuess,

    /// Spymaster only: the guess is in, reveal when ready.
    YourTurnToReveal,

    /// Guard failure, delivered only to the offending caller.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================
