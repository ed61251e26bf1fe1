//! Live faker backed by the thread-local `rand` generator.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::ports::faker::Faker;

const WORDS: &[&str] = &[
    "alpha", "amber", "anchor", "apple", "arrow", "aurora", "basil", "beacon", "birch", "blossom",
    "breeze", "canyon", "cedar", "cinder", "clover", "comet", "coral", "cosmos", "crystal", "delta",
    "dune", "ember", "falcon", "fern", "fjord", "forest", "garnet", "glacier", "harbor", "hazel",
    "horizon", "indigo", "island", "jasper", "juniper", "lagoon", "lantern", "lotus", "maple",
    "meadow", "meteor", "mint", "nebula", "oasis", "onyx", "orchid", "pebble", "pine", "prairie",
    "quartz", "raven", "river", "saffron", "sage", "sierra", "summit", "tundra", "velvet", "willow",
    "zephyr",
];

/// Largest integer produced by [`LiveFaker::number`].
pub const MAX_NUMBER: i64 = 10_000;

/// Faker drawing words from a fixed list and integers from `0..=MAX_NUMBER`.
pub struct LiveFaker;

impl Faker for LiveFaker {
    fn word(&self) -> String {
        WORDS.choose(&mut rand::rng()).map_or_else(String::new, |w| (*w).to_string())
    }

    fn number(&self) -> i64 {
        rand::rng().random_range(0..=MAX_NUMBER)
    }
}
