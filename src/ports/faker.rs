//! Randomness port used by the mock value synthesizer.

/// Produces the scalar contents of synthesized mock values.
///
/// Synthesis only needs a shape-preserving source of words and integers;
/// tests substitute a fixed implementation to get stable output.
pub trait Faker: Send + Sync {
    /// Returns a pseudo-random word.
    fn word(&self) -> String;

    /// Returns a pseudo-random non-negative integer.
    fn number(&self) -> i64;
}
