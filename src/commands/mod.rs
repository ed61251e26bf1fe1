//! Command dispatch and handlers.

pub mod diff;
pub mod generate;
pub mod serve;

use std::env;
use std::path::PathBuf;

use crate::cli::{Command, SourceArgs};
use crate::config::{Options, CONFIG_ENV};
use crate::context::ServiceContext;
use crate::ports::FileSystem;

/// Dispatch a parsed command to its handler with live adapters.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let ctx = ServiceContext::live();
    match command {
        Command::Serve { source, host, port, no_watch } => {
            serve::run(ctx, source, host.as_deref(), *port, *no_watch)
        }
        Command::Generate { source } => generate::run(ctx, source),
        Command::Diff { source } => diff::run(ctx, source),
    }
}

/// Layers config file and flags into effective options.
fn load_options(fs: &dyn FileSystem, source: &SourceArgs) -> Result<Options, String> {
    let explicit = source.config.clone().or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
    let cwd = env::current_dir().map_err(|e| format!("Failed to read working directory: {e}"))?;
    let mut options = Options::discover(fs, &cwd, explicit.as_deref()).map_err(|e| e.to_string())?;
    source.apply(&mut options);
    Ok(options)
}
