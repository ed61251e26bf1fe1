//! Live adapters for real external interactions.

pub mod faker;
pub mod filesystem;
pub mod typescript;
