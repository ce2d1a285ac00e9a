//! Guard failures of the round state machine.

use spectrum_protocol::{Phase, PlayerId};

/// Errors a round-engine operation can reject with.
///
/// All of these are caller-local: the room state is untouched and only
/// the offending caller hears about them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The roster already holds the maximum number of players.
    #[error("room is full")]
    RoomFull,

    /// Start requested with too small a roster.
    #[error("need at least {min} players to start")]
    InsufficientPlayers { min: usize },

    /// Start requested while a round is already in flight.
    #[error("game already started")]
    AlreadyStarted,

    /// The caller holds the wrong role for this action (e.g. a guesser
    /// sending a clue, or the spymaster guessing).
    #[error("not your turn")]
    NotYourTurn,

    /// The action doesn't belong to the current phase.
    #[error("invalid action during {0}")]
    InvalidPhase(Phase),

    /// The caller is not on this room's roster.
    #[error("player {0} is not in this room")]
    NotInRoom(PlayerId),
}
