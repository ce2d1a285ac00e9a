//! Room registry and runtime for Spectrum.
//!
//! Each room runs as an isolated Tokio task (actor model) owning a pure
//! [`Room`](spectrum_engine::Room); the registry owns the room table,
//! the room-code allocator, and the player→room index. Outbound events
//! reach the transport collaborator through per-player channels,
//! addressed by [`Recipient`](spectrum_protocol::Recipient).
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates/destroys rooms, routes players and events
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`PlayerSender`] — a player's outbound event channel
//! - [`RoomConfig`] — runtime settings (restart delay, channel size)

mod actor;
mod config;
mod error;
mod ids;
mod registry;

pub use actor::{PlayerSender, RoomHandle, RoomInfo};
pub use config::RoomConfig;
pub use error::RoomError;
pub use registry::RoomRegistry;
