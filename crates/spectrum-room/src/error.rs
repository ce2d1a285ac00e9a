//! Error types for the room layer.

use spectrum_engine::GameError;
use spectrum_protocol::{PlayerId, RoomId};

/// Errors that can occur during registry and room-runtime operations.
///
/// Every variant is caller-local: the offending caller hears about it
/// through the `error` event and room state is untouched.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room code does not name a live room.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// Room-code generation exhausted its retry bound without finding
    /// a free code.
    #[error("could not allocate a unique room code")]
    CreationFailed,

    /// The player is already in a room (one room per player).
    #[error("player {0} is already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// A round-engine guard failure, forwarded as-is.
    #[error(transparent)]
    Game(#[from] GameError),
}
