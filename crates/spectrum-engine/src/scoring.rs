//! Distance-tiered scoring.
//!
//! The guess is scored by how far it lands from the hidden target:
//!
//! ```text
//! d ≤ 5 → 4 pts   d ≤ 10 → 3   d ≤ 15 → 2   d ≤ 20 → 1   d > 20 → 0
//! ```
//!
//! [`zones_for`] expands the tiers into the per-value table the
//! spymaster sees while choosing a clue.

use spectrum_protocol::ScoreZones;

/// Upper bound of the guess/target domain.
pub const MAX_VALUE: u8 = 100;

/// Points earned for a guess `distance` away from the target.
///
/// A pure function of the distance, so ties are impossible.
pub fn score_for(distance: u8) -> u8 {
    match distance {
        0..=5 => 4,
        6..=10 => 3,
        11..=15 => 2,
        16..=20 => 1,
        _ => 0,
    }
}

/// The tier every guess value in `[0, MAX_VALUE]` would earn against
/// `target`. Recomputed per round, never mutated.
pub fn zones_for(target: u8) -> ScoreZones {
    ScoreZones(
        (0..=MAX_VALUE)
            .map(|value| score_for(value.abs_diff(target)))
            .collect(),
    )
}
