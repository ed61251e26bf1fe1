//! Live filesystem adapter using `std::fs` and the `ignore` walker.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::ports::filesystem::FileSystem;

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, contents)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_files(
        &self,
        root: &Path,
        extension: &str,
        skip: &Path,
    ) -> Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>> {
        // `.gitignore` rules apply; node_modules is skipped even without one.
        let walker = WalkBuilder::new(root)
            .standard_filters(true)
            .filter_entry(|entry| entry.file_name() != "node_modules")
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if path.starts_with(skip) || !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if path.extension().is_some_and(|ext| ext == extension) {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }
}
