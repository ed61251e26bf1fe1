//! Port traits defining external boundaries.
//!
//! Each trait separates the mock pipeline from something it does not own:
//! the disk, the randomness behind fake values, and the language frontend
//! that answers type questions about the scanned sources. Implementations
//! live in `src/adapters/`.

pub mod faker;
pub mod filesystem;
pub mod oracle;

pub use faker::Faker;
pub use filesystem::FileSystem;
pub use oracle::{Frontend, SourceUnit, TypeOracle};
