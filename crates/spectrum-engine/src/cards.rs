//! The built-in deck of spectrum cards.

use rand::Rng;
use spectrum_protocol::Card;

/// Theme pairs, left pole first. Order is irrelevant — every round
/// draws uniformly.
const DECK: &[(&str, &str)] = &[
    ("Hot", "Cold"),
    ("Underrated", "Overrated"),
    ("Scary", "Cozy"),
    ("Cheap", "Expensive"),
    ("Useless", "Useful"),
    ("Healthy", "Unhealthy"),
    ("Guilty pleasure", "Actual pleasure"),
    ("Quiet", "Loud"),
    ("Round", "Pointy"),
    ("Smells bad", "Smells good"),
    ("Ordinary", "Extraordinary"),
    ("Villain", "Hero"),
    ("Low calorie", "High calorie"),
    ("Fad", "Timeless"),
    ("Dry", "Wet"),
    ("Casual", "Formal"),
    ("Introvert", "Extrovert"),
    ("Soft", "Hard"),
    ("Forgettable", "Memorable"),
    ("Dangerous", "Safe"),
    ("Bad habit", "Good habit"),
    ("Small talk", "Deep talk"),
    ("Snack", "Meal"),
    ("Art", "Commerce"),
];

/// Draws a random card from the deck.
pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Card {
    let (left, right) = DECK[rng.random_range(0..DECK.len())];
    Card {
        left_label: left.to_string(),
        right_label: right.to_string(),
    }
}
