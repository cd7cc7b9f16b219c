//! Exception-aware directory cleanup.
//!
//! A [`DirCleaner`] removes every immediate child of a root directory except
//! the names in an [`ExceptionSet`], counting how many entries it removed and
//! skipped and how many bytes the removed entries held. Reads go through a
//! [`FileSystem`] and deletions through [`FileActions`], so the very same
//! cleanup can run for real, on an in-memory tree, or as a dry run.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::dry_run::FileActions;
use crate::error::{Result, WipeError};
use crate::fs::{FileSystem, directory_size};
use crate::logging::Logger;
use crate::size::add_thousands;


/// Outcome of one [`DirCleaner::clean_up`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    /// Bytes held by the removed entries, measured before removal
    pub cleaned_size: u64,
    /// Top-level entries removed
    pub removed: usize,
    /// Top-level entries kept because they are exceptions
    pub skipped: usize,
}

/// Names of top-level entries a cleanup must keep.
///
/// Matching is exact and case-sensitive against the entry's own name, never
/// against nested paths.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExceptionSet {
    names: Vec<String>,
}

impl ExceptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    pub fn contains(&self, name: &OsStr) -> bool {
        self.names.iter().any(|n| OsStr::new(n) == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExceptionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

/// Removes the children of `root`, keeping the exceptions.
pub struct DirCleaner<'a> {
    root: PathBuf,
    source: &'a dyn FileSystem,
    actions: &'a dyn FileActions,
    log: Logger,
    stats: CleanupStats,
}

impl<'a> DirCleaner<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        source: &'a dyn FileSystem,
        actions: &'a dyn FileActions,
        log: &Logger,
    ) -> Self {
        Self {
            root: root.into(),
            source,
            actions,
            log: log.inherit_as("DirCleaner"),
            stats: CleanupStats::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove every child of the root whose name is not in `exceptions`.
    ///
    /// Children are visited in listing order. Directories are sized before
    /// they are removed. If listing the root fails nothing is touched and the
    /// counters stay at zero. The first failure after that stops the cleanup
    /// and is returned as [`WipeError::CleanupAborted`] carrying the
    /// statistics gathered so far; entries already removed stay removed.
    pub fn clean_up(&mut self, exceptions: &ExceptionSet) -> Result<CleanupStats> {
        self.stats = CleanupStats::default();

        let entries = self
            .source
            .read_dir(&self.root)
            .map_err(|source| WipeError::IoError {
                path: self.root.clone(),
                source,
            })?;

        for entry in entries {
            if exceptions.contains(entry.name()) {
                self.stats.skipped += 1;
                self.log
                    .debug(format!("skipping {}", entry.name().to_string_lossy()));
                continue;
            }

            let path = self.root.join(entry.name());
            let removed = match entry.file_len() {
                Some(len) => {
                    self.log.debug(format!("{len:>8} F {}", path.display()));
                    self.actions.remove(&path).map(|()| len)
                }
                None => directory_size(self.source, &path).and_then(|size| {
                    self.log.debug(format!("{size:>8} D {}", path.display()));
                    self.actions.remove_all(&path).map(|()| size)
                }),
            };

            match removed {
                Ok(size) => {
                    self.stats.cleaned_size = self.stats.cleaned_size.saturating_add(size);
                    self.stats.removed += 1;
                }
                Err(source) => {
                    return Err(WipeError::CleanupAborted {
                        root: self.root.clone(),
                        stats: self.stats,
                        source: Box::new(source),
                    });
                }
            }
        }

        Ok(self.stats)
    }

    /// Statistics of the last cleanup, including an aborted one.
    pub fn stats(&self) -> CleanupStats {
        self.stats
    }

    pub fn cleaned_size(&self) -> u64 {
        self.stats.cleaned_size
    }
}

impl fmt::Display for DirCleaner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DirCleaner {:?} del:{} skip:{} size:{}",
            self.root.display().to_string(),
            self.stats.removed,
            self.stats.skipped,
            add_thousands(self.stats.cleaned_size, ',')
        )
    }
}
