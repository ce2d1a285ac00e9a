//! Room-code generation.

use rand::Rng;
use spectrum_protocol::RoomId;

/// Draws a random 4-character code from the room-id alphabet.
///
/// Uniqueness against live rooms is the registry's job — this only
/// produces candidates.
pub(crate) fn generate<R: Rng + ?Sized>(rng: &mut R) -> RoomId {
    let mut code = [0u8; RoomId::LEN];
    for c in &mut code {
        *c = RoomId::ALPHABET[rng.random_range(0..RoomId::ALPHABET.len())];
    }
    RoomId::new(code).expect("drawn from the room id alphabet")
}
