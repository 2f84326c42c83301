//! Discovery of the environment file.
//!
//! The file is searched in two passes. The first walks down the start directory's
//! subtree, the second climbs its ancestor chain. The first pass wins, so a file in a
//! subdirectory is preferred over one in a parent directory.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Name of the environment file searched by default.
pub const DEFAULT_FILE_NAME: &str = ".env";

/// `Locator` finds the environment file for a start directory.
#[derive(Clone, Debug)]
pub struct Locator {
    file_name: String,
    max_depth: Option<usize>,
}

impl Default for Locator {
    fn default() -> Locator {
        Locator::new(DEFAULT_FILE_NAME)
    }
}

impl Locator {
    /// Create a `Locator` looking for files with the given name.
    pub fn new(file_name: impl Into<String>) -> Locator {
        Locator {
            file_name: file_name.into(),
            max_depth: None,
        }
    }

    /// Limit how deep the downward search goes. Depth 0 only checks the start directory.
    pub fn max_depth(mut self, depth: usize) -> Locator {
        self.max_depth = Some(depth);
        self
    }

    /// The file name this `Locator` looks for.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Search from the current working directory.
    pub fn find(&self) -> Result<Option<PathBuf>> {
        let cwd = env::current_dir()?;
        self.find_from(&cwd)
    }

    /// Search from `start`, first downward and then upward.
    ///
    /// A relative `start` is resolved against the current working directory first, so the
    /// upward search reaches the real parent directories.
    pub fn find_from(&self, start: &Path) -> Result<Option<PathBuf>> {
        let start = absolute(start)?;
        let found = self.descend(&start).or_else(|| self.ascend(&start));
        match &found {
            Some(path) => debug!("found environment file {}", path.display()),
            None => debug!("no {} file around {}", self.file_name, start.display()),
        }
        Ok(found)
    }

    /// Walk the subtree of `root` in pre-order and return the first directory's file.
    ///
    /// Entries are sorted by name, symlinked directories are not followed and unreadable
    /// directories are skipped.
    pub fn descend(&self, root: &Path) -> Option<PathBuf> {
        let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!("skipping {}", err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.path().join(&self.file_name))
            .find(|candidate| candidate.is_file())
    }

    /// Check `start` and each of its ancestors up to the filesystem root.
    pub fn ascend(&self, start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(&self.file_name))
            .find(|candidate| candidate.is_file())
    }
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }
    // Rebuilding from components drops `.` segments.
    Ok(env::current_dir()?.join(path).components().collect())
}

/// Find the default environment file from the current working directory.
pub fn find_env_file() -> Result<Option<PathBuf>> {
    Locator::default().find()
}
