//! Configuration: defaults, an optional config file, then CLI overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ports::FileSystem;

/// Config file names probed in the working directory, in order.
pub const CONFIG_FILES: &[&str] = &["shapemock.yaml", "shapemock.yml", "shapemock.json"];

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SHAPEMOCK_CONFIG";

/// One pattern or a list of patterns.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Class-name regular expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany", into = "Vec<String>")]
pub struct Patterns(pub Vec<String>);

impl From<OneOrMany> for Patterns {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(pattern) => Self(vec![pattern]),
            OneOrMany::Many(patterns) => Self(patterns),
        }
    }
}

impl From<Patterns> for Vec<String> {
    fn from(value: Patterns) -> Self {
        value.0
    }
}

/// Recognized options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Options {
    /// Root directory scanned for service sources.
    pub base_path: PathBuf,
    /// Persist generated mocks to disk instead of memory only.
    pub mock_file: bool,
    /// Watch sources and the mock file for changes.
    pub watch_file: bool,
    /// Classes to include; empty means all.
    pub includes: Patterns,
    /// Classes to exclude.
    pub excludes: Patterns,
    /// Address the server binds to.
    pub host: String,
    /// Port the server listens on.
    pub port: u16,
    /// Mock directory, relative to `base_path`.
    pub mock_dir: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            mock_file: true,
            watch_file: true,
            includes: Patterns::default(),
            excludes: Patterns::default(),
            host: "127.0.0.1".to_string(),
            port: 5173,
            mock_dir: PathBuf::from("mock"),
        }
    }
}

impl Options {
    /// Loads options from `explicit`, or from the first config file found
    /// in `dir`, or falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or if any config
    /// file cannot be read or parsed.
    pub fn discover(fs: &dyn FileSystem, dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !fs.exists(path) {
                return Err(Error::Config(format!("config file {} not found", path.display())));
            }
            return Self::from_file(fs, path);
        }
        match CONFIG_FILES.iter().map(|name| dir.join(name)).find(|path| fs.exists(path)) {
            Some(path) => Self::from_file(fs, &path),
            None => Ok(Self::default()),
        }
    }

    /// Parses a YAML or JSON config file, chosen by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let contents = fs.read_to_string(path).map_err(|e| Error::io(path, e))?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(serde_yaml::from_str(&contents)?)
        }
    }

    /// Absolute-or-relative directory holding the persisted files.
    #[must_use]
    pub fn mock_dir_path(&self) -> PathBuf {
        self.base_path.join(&self.mock_dir)
    }
}
