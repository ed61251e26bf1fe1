//! The incremental pass: sources to structure, diff, regenerated mocks.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Options;
use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::mock::store::{regenerate, MockStore};
use crate::mock::MockSnapshot;
use crate::ports::SourceUnit;
use crate::structure::diff::{compare, StructureDiff};
use crate::structure::extract::{extract, ClassFilter};
use crate::structure::StructureSnapshot;

/// Extension of scanned source files.
pub const SOURCE_EXTENSION: &str = "ts";

/// Outcome of one [`Pipeline::refresh`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Structural differences against the previous pass.
    pub diff: StructureDiff,
    /// Whether the held snapshots changed (and were persisted).
    pub updated: bool,
}

/// Owns the current snapshots and recomputes them on demand.
pub struct Pipeline {
    ctx: ServiceContext,
    options: Options,
    filter: ClassFilter,
    structure: StructureSnapshot,
    mocks: MockSnapshot,
}

impl Pipeline {
    /// Creates a pipeline, loading persisted snapshots when `mockFile` is on.
    ///
    /// # Errors
    ///
    /// Returns an error if an include or exclude pattern is invalid.
    pub fn new(ctx: ServiceContext, options: Options) -> Result<Self> {
        let filter = ClassFilter::new(&options.includes.0, &options.excludes.0)?;
        let mut pipeline = Self {
            ctx,
            options,
            filter,
            structure: StructureSnapshot::default(),
            mocks: MockSnapshot::default(),
        };
        if pipeline.options.mock_file {
            let (structure, mocks) = pipeline.store().load();
            debug!(endpoints = structure.len(), records = mocks.len(), "loaded persisted snapshots");
            pipeline.structure = structure;
            pipeline.mocks = mocks;
        }
        Ok(pipeline)
    }

    fn store(&self) -> MockStore<'_> {
        MockStore::new(&self.ctx, &self.mock_dir())
    }

    /// Effective options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Directory holding the persisted files.
    #[must_use]
    pub fn mock_dir(&self) -> PathBuf {
        self.options.mock_dir_path()
    }

    /// Structure as of the last pass, including retained removed endpoints.
    #[must_use]
    pub fn structure(&self) -> &StructureSnapshot {
        &self.structure
    }

    /// Mocks as of the last pass or reload.
    #[must_use]
    pub fn mocks(&self) -> &MockSnapshot {
        &self.mocks
    }

    /// Extracts a fresh snapshot from the sources under `basePath`.
    ///
    /// Declaration files and everything under the mock directory are
    /// skipped. Files that cannot be read are logged and left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the base path cannot be walked or the frontend
    /// cannot be initialized.
    pub fn scan(&self) -> Result<StructureSnapshot> {
        let base = &self.options.base_path;
        let files = self
            .ctx
            .fs
            .list_files(base, SOURCE_EXTENSION, &self.mock_dir())
            .map_err(|e| Error::io(base, e))?;

        let units: Vec<SourceUnit> = files
            .into_iter()
            .filter(|path| !is_declaration_file(path))
            .filter_map(|path| match self.ctx.fs.read_to_string(&path) {
                Ok(text) => Some(SourceUnit::new(path, text)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot read source, skipping");
                    None
                }
            })
            .collect();
        debug!(units = units.len(), base = %base.display(), "scanning sources");

        let oracle = self.ctx.frontend.load(units)?;
        Ok(extract(oracle.as_ref(), &self.filter))
    }

    /// Compares the current sources with the held structure without
    /// changing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if scanning fails.
    pub fn preview(&self) -> Result<StructureDiff> {
        Ok(compare(&self.structure, &self.scan()?))
    }

    /// Runs one incremental pass.
    ///
    /// Added and changed endpoints get freshly synthesized records; every
    /// other record is kept verbatim. When nothing changed, nothing is
    /// written.
    ///
    /// # Errors
    ///
    /// Returns an error if scanning fails or the snapshots cannot be saved.
    pub fn refresh(&mut self) -> Result<PassReport> {
        let current = self.scan()?;
        let diff = compare(&self.structure, &current);
        let mocks = regenerate(&current, &diff.regenerate(), &self.mocks, self.ctx.faker.as_ref());
        let structure = self.structure.merged(&current);

        let updated = mocks != self.mocks || structure != self.structure;
        if !updated {
            debug!(endpoints = current.len(), "no endpoint changes");
            return Ok(PassReport { diff, updated });
        }

        self.structure = structure;
        self.mocks = mocks;
        if self.options.mock_file {
            self.store().save(&self.structure, &self.mocks)?;
        }
        info!(
            added = ?diff.added,
            changed = ?diff.changed,
            records = self.mocks.len(),
            "regenerated mocks"
        );
        Ok(PassReport { diff, updated })
    }

    /// Re-reads the mock file so hand edits take effect. Without
    /// persistence, or when the file does not parse (a save in progress),
    /// the in-memory snapshot is kept.
    pub fn reload_mocks(&mut self) -> &MockSnapshot {
        if self.options.mock_file {
            match self.store().read_mocks() {
                Ok(mocks) => {
                    self.mocks = mocks;
                    info!(records = self.mocks.len(), "reloaded mock file");
                }
                Err(e) => warn!(error = %e, "cannot reload mock file, keeping previous mocks"),
            }
        }
        &self.mocks
    }
}

fn is_declaration_file(path: &Path) -> bool {
    path.file_name().and_then(|name| name.to_str()).is_some_and(|name| name.ends_with(".d.ts"))
}
