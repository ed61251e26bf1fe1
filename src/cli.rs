//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{Options, Patterns};

/// Top-level CLI parser for `shapemock`.
#[derive(Debug, Parser)]
#[command(name = "shapemock", version, about = "Serve mock responses shaped like your declared service types")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every command that scans sources.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Root directory scanned for service sources.
    #[arg(long)]
    pub base_path: Option<PathBuf>,
    /// Config file (YAML or JSON). Defaults to `$SHAPEMOCK_CONFIG` or
    /// `shapemock.{yaml,yml,json}` in the working directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Regex selecting service classes by name (repeatable).
    #[arg(long = "include", value_name = "REGEX")]
    pub includes: Vec<String>,
    /// Regex excluding service classes by name (repeatable).
    #[arg(long = "exclude", value_name = "REGEX")]
    pub excludes: Vec<String>,
    /// Keep generated mocks in memory instead of writing them to disk.
    #[arg(long)]
    pub no_mock_file: bool,
}

impl SourceArgs {
    /// Applies the flags that were given over `options`.
    pub fn apply(&self, options: &mut Options) {
        if let Some(base_path) = &self.base_path {
            options.base_path.clone_from(base_path);
        }
        if !self.includes.is_empty() {
            options.includes = Patterns(self.includes.clone());
        }
        if !self.excludes.is_empty() {
            options.excludes = Patterns(self.excludes.clone());
        }
        if self.no_mock_file {
            options.mock_file = false;
        }
    }
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate mocks, serve them, and regenerate on source changes.
    Serve {
        /// Source selection flags.
        #[command(flatten)]
        source: SourceArgs,
        /// Address to bind.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on.
        #[arg(long)]
        port: Option<u16>,
        /// Do not watch sources or the mock file.
        #[arg(long)]
        no_watch: bool,
    },
    /// Run one incremental pass and write the mock files.
    Generate {
        /// Source selection flags.
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show endpoints added, changed or removed since the last pass.
    Diff {
        /// Source selection flags.
        #[command(flatten)]
        source: SourceArgs,
    },
}
