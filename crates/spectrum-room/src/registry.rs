//! Room registry: creates, tracks, and routes players to rooms.

use std::collections::HashMap;

use spectrum_engine::{GameError, RoundAction};
use spectrum_protocol::{ClientEvent, PlayerId, RoomId, ServerEvent};

use crate::actor::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Retry bound for room-code generation. 36⁴ live codes would have to
/// exist before this matters, but the loop is bounded anyway.
const MAX_CODE_ATTEMPTS: u32 = 64;

/// Owns all live rooms and tracks which player is in which room.
///
/// This is the entry point for the transport collaborator. Operations
/// take `&mut self` — callers serialize access (e.g. behind a
/// `tokio::sync::Mutex`); each room's own processing then runs in its
/// actor task, so rooms never block one another.
pub struct RoomRegistry {
    config: RoomConfig,

    /// Live rooms, keyed by room code.
    rooms: HashMap<RoomId, RoomHandle>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time (key invariant).
    player_rooms: HashMap<PlayerId, RoomId>,
}

impl RoomRegistry {
    /// Creates an empty registry with default runtime settings.
    pub fn new() -> Self {
        Self::with_config(RoomConfig::default())
    }

    pub fn with_config(config: RoomConfig) -> Self {
        Self {
            config,
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Transport entry point
    // -----------------------------------------------------------------------

    /// Handles one inbound event on behalf of a connected player.
    ///
    /// Guard failures are delivered to the caller's own channel as an
    /// `error` event and never touch room state; this method itself
    /// never fails.
    pub async fn handle_event(
        &mut self,
        player_id: PlayerId,
        event: ClientEvent,
        sender: PlayerSender,
    ) {
        let result = match event {
            ClientEvent::CreateRoom { display_name } => self
                .create_room(player_id, &display_name, sender.clone())
                .map(|_| ()),
            ClientEvent::JoinRoom {
                room_id,
                display_name,
            } => {
                self.join_room(player_id, room_id, &display_name, sender.clone())
                    .await
            }
            ClientEvent::StartGame { room_id } => {
                self.route_action(player_id, room_id, RoundAction::Start).await
            }
            ClientEvent::SendClue { room_id, clue } => {
                self.route_action(player_id, room_id, RoundAction::GiveClue(clue))
                    .await
            }
            ClientEvent::SendGuess {
                room_id,
                guess_value,
            } => {
                self.route_action(
                    player_id,
                    room_id,
                    RoundAction::SubmitGuess(guess_value),
                )
                .await
            }
            ClientEvent::RevealAnswer { room_id } => {
                self.route_action(player_id, room_id, RoundAction::Reveal).await
            }
        };

        if let Err(e) = result {
            tracing::debug!(%player_id, error = %e, "event rejected");
            let _ = sender.send(ServerEvent::Error {
                message: e.to_string(),
            });
        }
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Creates a room with the caller as its first player and returns
    /// the fresh, collision-checked room code.
    pub fn create_room(
        &mut self,
        player_id: PlayerId,
        display_name: &str,
        sender: PlayerSender,
    ) -> Result<RoomId, RoomError> {
        if let Some(current) = self.player_rooms.get(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, *current));
        }

        let room_id = self.allocate_code()?;
        let handle = spawn_room(
            room_id,
            player_id,
            display_name,
            sender,
            self.config.clone(),
        );
        self.rooms.insert(room_id, handle);
        self.player_rooms.insert(player_id, room_id);
        tracing::info!(%room_id, %player_id, "room created");
        Ok(room_id)
    }

    /// Adds a player to an existing room.
    ///
    /// Enforces the "one room at a time" invariant.
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        room_id: RoomId,
        display_name: &str,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if let Some(current) = self.player_rooms.get(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, *current));
        }

        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        handle.join(player_id, display_name, sender).await?;
        self.player_rooms.insert(player_id, room_id);
        Ok(())
    }

    /// Removes a disconnected player from their room, if any.
    ///
    /// An emptied room is destroyed in the same call — its actor stops
    /// and the registry entry disappears, so any pending deferred
    /// restart lands on a closed channel.
    pub async fn disconnect(&mut self, player_id: PlayerId) {
        let Some(room_id) = self.player_rooms.remove(&player_id) else {
            return;
        };

        let Some(handle) = self.rooms.get(&room_id) else {
            return;
        };

        match handle.leave(player_id).await {
            Ok(0) => {
                self.rooms.remove(&room_id);
                tracing::info!(%room_id, "room empty, destroyed");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(%room_id, %player_id, error = %e, "leave failed");
            }
        }
    }

    /// Routes a round action to the room the event names.
    ///
    /// The caller must actually be in that room — their outbound
    /// channel is registered with its actor, nowhere else.
    pub async fn route_action(
        &self,
        player_id: PlayerId,
        room_id: RoomId,
        action: RoundAction,
    ) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        if self.player_rooms.get(&player_id) != Some(&room_id) {
            return Err(RoomError::Game(GameError::NotInRoom(player_id)));
        }

        handle.send_action(player_id, action).await
    }

    /// Returns info about a specific room.
    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;
        handle.get_info().await
    }

    /// Returns the room a player is currently in, if any.
    pub fn player_room(&self, player_id: &PlayerId) -> Option<RoomId> {
        self.player_rooms.get(player_id).copied()
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all live room codes.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }

    fn allocate_code(&self) -> Result<RoomId, RoomError> {
        let mut rng = rand::rng();
        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = crate::ids::generate(&mut rng);
            if !self.rooms.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
        tracing::error!("room code space exhausted after {MAX_CODE_ATTEMPTS} attempts");
        Err(RoomError::CreationFailed)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
