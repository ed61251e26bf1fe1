//! Mock store: persisted structure and mock files.
//!
//! Both files live in one directory and are read and written through the
//! `FileSystem` port:
//!
//! ```text
//! <basePath>/<mockDir>/
//!   ├── structure.json   endpoint shapes from the last pass
//!   └── mock.json        served records, safe to edit by hand
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::mock::synthesize::synthesize;
use crate::mock::{MockRecord, MockSnapshot};
use crate::ports::Faker;
use crate::structure::StructureSnapshot;

/// File name of the persisted structure snapshot.
pub const STRUCTURE_FILE: &str = "structure.json";
/// File name of the persisted mock snapshot.
pub const MOCK_FILE: &str = "mock.json";

/// Persistence for [`StructureSnapshot`] and [`MockSnapshot`].
pub struct MockStore<'a> {
    ctx: &'a ServiceContext,
    dir: PathBuf,
}

impl<'a> MockStore<'a> {
    /// Creates a store writing into `dir`.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, dir: &Path) -> Self {
        Self { ctx, dir: dir.to_path_buf() }
    }

    /// Path of the structure file.
    #[must_use]
    pub fn structure_path(&self) -> PathBuf {
        self.dir.join(STRUCTURE_FILE)
    }

    /// Path of the mock file.
    #[must_use]
    pub fn mock_path(&self) -> PathBuf {
        self.dir.join(MOCK_FILE)
    }

    /// Loads both snapshots. Missing or unreadable files load as empty.
    #[must_use]
    pub fn load(&self) -> (StructureSnapshot, MockSnapshot) {
        (self.load_structure(), self.load_mocks())
    }

    /// Loads the structure snapshot, or an empty one.
    #[must_use]
    pub fn load_structure(&self) -> StructureSnapshot {
        self.load_or_default(&self.structure_path())
    }

    /// Loads the mock snapshot, or an empty one.
    #[must_use]
    pub fn load_mocks(&self) -> MockSnapshot {
        self.load_or_default(&self.mock_path())
    }

    /// Writes both snapshots as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or either write fails.
    pub fn save(&self, structure: &StructureSnapshot, mocks: &MockSnapshot) -> Result<()> {
        self.write_json(&self.structure_path(), structure)?;
        self.write_json(&self.mock_path(), mocks)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let mut json = serde_json::to_string_pretty(value)?;
        json.push('\n');
        self.ctx.fs.write(path, &json).map_err(|e| Error::io(path, e))
    }

    /// Reads the mock file strictly, for reloads while serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or not a valid
    /// mock array.
    pub fn read_mocks(&self) -> Result<MockSnapshot> {
        self.read_json(&self.mock_path())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let contents = self.ctx.fs.read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, path: &Path) -> T {
        if !self.ctx.fs.exists(path) {
            debug!(path = %path.display(), "no persisted file, starting empty");
            return T::default();
        }
        self.read_json(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "invalid persisted file, starting empty");
            T::default()
        })
    }
}

/// Builds the next mock snapshot.
///
/// Every previous record is kept in place. Each current URL listed in
/// `changed`, or not yet served at all, gets a freshly synthesized record
/// that replaces the first previous record with that URL or is appended.
#[must_use]
pub fn regenerate(
    current: &StructureSnapshot,
    changed: &[String],
    previous: &MockSnapshot,
    faker: &dyn Faker,
) -> MockSnapshot {
    let changed: HashSet<&str> = changed.iter().map(String::as_str).collect();
    let mut records = previous.records.clone();

    for (url, body) in current.by_url() {
        let existing = records.iter().position(|record| record.url == url);
        if existing.is_some() && !changed.contains(url) {
            continue;
        }
        let record = MockRecord::new(url, synthesize(body, faker));
        match existing {
            Some(index) => records[index] = record,
            None => records.push(record),
        }
    }

    MockSnapshot::new(records)
}
