//! Service context bundling all port trait objects.

use crate::adapters::live::faker::LiveFaker;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::typescript::TypeScriptFrontend;
use crate::ports::{Faker, FileSystem, Frontend};

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Tests build the
/// struct directly with in-memory adapters.
pub struct ServiceContext {
    /// Filesystem for source scanning and mock persistence.
    pub fs: Box<dyn FileSystem>,
    /// Randomness behind synthesized scalars.
    pub faker: Box<dyn Faker>,
    /// Language frontend answering type questions.
    pub frontend: Box<dyn Frontend>,
}

impl ServiceContext {
    /// Creates a live context: real disk, `rand`-backed faker and the
    /// tree-sitter TypeScript frontend.
    #[must_use]
    pub fn live() -> Self {
        Self {
            fs: Box::new(LiveFileSystem),
            faker: Box::new(LiveFaker),
            frontend: Box::new(TypeScriptFrontend),
        }
    }
}
