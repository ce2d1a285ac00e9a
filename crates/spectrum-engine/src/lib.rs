//! Round state machine and scoring engine for Spectrum.
//!
//! Everything in this crate is pure: a [`Room`] is driven by
//! [`Room::apply`] with the caller's identity and an RNG, and answers
//! with recipient-addressed [`ServerEvent`](spectrum_protocol::ServerEvent)s.
//! The runtime layer (`spectrum-room`) supplies the serialization point
//! per room and the deferred-restart timer.
//!
//! # Key items
//!
//! - [`Room`] — roster plus round phase machine
//! - [`RoundAction`] — the actions a player can take in a round
//! - [`scoring`] — distance tiers and the per-round zone table
//! - [`cards`] — the built-in spectrum deck
//! - [`GameError`] — caller-local guard failures

pub mod cards;
mod error;
mod round;
pub mod scoring;

pub use error::GameError;
pub use round::{Outbound, Room, RoundAction, MAX_PLAYERS, MIN_PLAYERS};
