//! Event vocabulary for the Spectrum game server.
//!
//! This crate defines the "language" the game core and its transport
//! collaborator speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Recipient`],
//!   [`PlayerId`], [`RoomId`], [`Phase`], [`Card`], [`ScoreZones`]) —
//!   the event structures and the data carried in their payloads.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events become
//!   bytes at the transport edge.
//! - **Errors** ([`ProtocolError`]) — what can go wrong on the way.
//!
//! The protocol layer knows nothing about rooms or rounds — it only
//! names events and their shapes.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Card, ClientEvent, Phase, Player, PlayerId, Recipient, RoomId, ScoreZones,
    ServerEvent,
};
