//! Room actor: an isolated Tokio task that owns one room's state.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. That gives the round engine the serialized,
//! non-interleaved application of events its guards assume — no shared
//! mutable state, just message passing.

use std::collections::HashMap;

use spectrum_engine::{Outbound, Room, RoundAction};
use spectrum_protocol::{Phase, PlayerId, Recipient, RoomId, ServerEvent};
use tokio::sync::{mpsc, oneshot};

use crate::{RoomConfig, RoomError};

/// Channel sender for delivering outbound events to a player's
/// transport handler. One per connected player, registered at join.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Add a player to the roster.
    Join {
        player_id: PlayerId,
        display_name: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Remove a player. Replies with the remaining roster size so the
    /// registry can destroy an emptied room.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<usize>,
    },

    /// A round action from a player. Guard failures are answered with
    /// an `error` event to the sender, not a reply channel.
    Action {
        sender: PlayerId,
        action: RoundAction,
    },

    /// Deferred post-reveal restart, tagged with the revealed round.
    BeginRound { after_round: u64 },

    /// Request a snapshot of room metadata.
    Info { reply: oneshot::Sender<RoomInfo> },

    /// Shut down the room.
    Shutdown,
}

/// A snapshot of room metadata (not the full round state).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub phase: Phase,
    pub player_count: usize,
}

/// Handle to a running room actor. Cheap to clone — just an
/// `mpsc::Sender` wrapper. The registry holds one per room.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's code.
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Sends a join request to the room.
    pub async fn join(
        &self,
        player_id: PlayerId,
        display_name: &str,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player_id,
                display_name: display_name.to_string(),
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    /// Removes a player; returns how many remain.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Delivers a round action (fire-and-forget; outcomes arrive as
    /// events on the players' channels).
    pub async fn send_action(
        &self,
        sender: PlayerId,
        action: RoundAction,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Action { sender, action })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Requests the current room info.
    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    config: RoomConfig,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Clone of the command sender, used by the deferred-restart task
    /// to message the actor itself.
    self_tx: mpsc::Sender<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until the roster
    /// empties or a shutdown arrives.
    async fn run(mut self) {
        let room_id = self.room.id();
        tracing::info!(%room_id, "room actor started");

        // The creator is the only rostered player at this point.
        let creator = self.room.players()[0].id;
        self.send_to(
            creator,
            ServerEvent::RoomCreated {
                room_id,
                players: self.room.players().to_vec(),
            },
        );

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    display_name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, &display_name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let remaining = self.handle_leave(player_id);
                    let _ = reply.send(remaining);
                    if remaining == 0 {
                        tracing::info!(%room_id, "room empty, stopping");
                        break;
                    }
                }
                RoomCommand::Action { sender, action } => {
                    self.handle_action(sender, action);
                }
                RoomCommand::BeginRound { after_round } => {
                    let restarted =
                        self.room.try_restart(after_round, &mut rand::rng());
                    if let Some(events) = restarted {
                        tracing::info!(
                            %room_id,
                            round = self.room.round(),
                            "auto-starting next round"
                        );
                        self.dispatch(events);
                    }
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(RoomInfo {
                        room_id,
                        phase: self.room.phase(),
                        player_count: self.room.player_count(),
                    });
                }
                RoomCommand::Shutdown => {
                    tracing::info!(%room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(%room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        display_name: &str,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let events = self.room.join(player_id, display_name)?;
        self.senders.insert(player_id, sender);
        tracing::info!(
            room_id = %self.room.id(),
            %player_id,
            players = self.room.player_count(),
            "player joined"
        );
        self.dispatch(events);
        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> usize {
        self.senders.remove(&player_id);
        let events = self.room.remove_player(player_id, &mut rand::rng());
        tracing::info!(
            room_id = %self.room.id(),
            %player_id,
            players = self.room.player_count(),
            "player left"
        );
        self.dispatch(events);
        self.room.player_count()
    }

    fn handle_action(&mut self, sender: PlayerId, action: RoundAction) {
        let is_reveal = matches!(action, RoundAction::Reveal);

        match self.room.apply(sender, action, &mut rand::rng()) {
            Ok(events) => {
                self.dispatch(events);
                if is_reveal {
                    self.schedule_restart();
                }
            }
            Err(e) => {
                tracing::debug!(
                    room_id = %self.room.id(),
                    %sender,
                    error = %e,
                    "action rejected"
                );
                self.send_to(
                    sender,
                    ServerEvent::Error {
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    /// Schedules the post-reveal round restart.
    ///
    /// The sleep runs in its own task and messages the actor back. If
    /// the room is destroyed before the timer fires, the closed channel
    /// makes the send a no-op — a dead room is never resurrected. The
    /// round tag makes it a no-op after an abandon/restart too.
    fn schedule_restart(&self) {
        let tx = self.self_tx.clone();
        let after_round = self.room.round();
        let delay = self.config.restart_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(RoomCommand::BeginRound { after_round }).await;
        });
    }

    /// Dispatches outbound events to their recipients.
    fn dispatch(&self, events: Vec<Outbound>) {
        for (recipient, event) in events {
            match recipient {
                Recipient::All => {
                    for pid in self.senders.keys() {
                        self.send_to(*pid, event.clone());
                    }
                }
                Recipient::Player(pid) => {
                    self.send_to(pid, event);
                }
                Recipient::AllExcept(excluded) => {
                    for pid in self.senders.keys() {
                        if *pid != excluded {
                            self.send_to(*pid, event.clone());
                        }
                    }
                }
            }
        }
    }

    /// Sends an event to a single player. Silently drops if the
    /// receiver is gone (connection already closed).
    fn send_to(&self, player_id: PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(event);
        }
    }
}

/// Spawns a new room actor with the creator as its only player and
/// returns a handle to communicate with it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    creator: PlayerId,
    display_name: &str,
    sender: PlayerSender,
    config: RoomConfig,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size);

    let mut senders = HashMap::new();
    senders.insert(creator, sender);

    let actor = RoomActor {
        room: Room::new(room_id, creator, display_name),
        config,
        senders,
        receiver: rx,
        self_tx: tx.clone(),
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
