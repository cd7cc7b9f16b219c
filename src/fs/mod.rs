//! Filesystem access for the cleaners.
//!
//! The cleaners read directory trees through the [`FileSystem`] trait so the
//! same algorithm runs against the real disk ([`OsFs`]) or against an
//! in-memory tree ([`MemoryFs`]). Writes go through
//! [`FileActions`](crate::dry_run::FileActions) instead, which is where the
//! dry-run switch lives.
//!
//! Symbolic links are never followed while listing or sizing: they are
//! reported as [`EntryKind::Symlink`] leaves.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::Path;

mod memory;
mod mirror;
mod sizer;

pub use memory::MemoryFs;
pub use mirror::{TreeCounts, count_tree, dump_tree, mirror_tree, tree_listing};
pub use sizer::{directory_size, directory_size_lossy};

/// Kind of a directory entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
}

/// An immediate child of a listed directory.
///
/// Only non-directories expose a length: the metadata length of a directory
/// says nothing about its contents, so directory sizes must come from
/// [`directory_size`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    name: OsString,
    kind: EntryKind,
    len: u64,
}

impl DirEntry {
    pub fn new(name: impl Into<OsString>, kind: EntryKind, len: u64) -> Self {
        Self {
            name: name.into(),
            kind,
            len,
        }
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Byte length of a file or symlink, `None` for directories.
    pub fn file_len(&self) -> Option<u64> {
        (!self.is_dir()).then_some(self.len)
    }
}

/// Metadata of a single path, following symlinks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub is_dir: bool,
    pub len: u64,
}

/// Read access to a directory tree.
pub trait FileSystem: Send + Sync {
    /// Immediate children of `path`, in the order the backend yields them.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Metadata of `path`, following symlinks.
    fn metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// Whole content of a UTF-8 text file.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Whether `path` is a file, a directory, or missing.
    fn is_file(&self, path: &Path) -> TriState {
        match self.metadata(path) {
            Ok(meta) if meta.is_dir => TriState::No,
            Ok(_) => TriState::Yes,
            Err(_) => TriState::Undecided,
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_file(path) == TriState::No
    }
}

/// The operating system's filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();

        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            // file_type() does not traverse symlinks
            let file_type = entry.file_type()?;
            let (kind, len) = if file_type.is_dir() {
                (EntryKind::Directory, 0)
            } else if file_type.is_symlink() {
                (EntryKind::Symlink, std::fs::symlink_metadata(entry.path())?.len())
            } else {
                (EntryKind::File, entry.metadata()?.len())
            };
            entries.push(DirEntry::new(entry.file_name(), kind, len));
        }

        Ok(entries)
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        let meta = std::fs::metadata(path)?;
        Ok(Metadata {
            is_dir: meta.is_dir(),
            len: meta.len(),
        })
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Answer to "is this path a file?"
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TriState {
    /// The path does not exist (or could not be inspected)
    #[default]
    Undecided,
    No,
    Yes,
}

impl TriState {
    pub const DEFAULT_LABELS: [&'static str; 3] = ["Undecided", "No", "Yes"];
    pub const DINGBAT_LABELS: [&'static str; 3] = ["\u{2753}", "\u{2718}", "\u{2714}"];

    /// Label for this state taken from `labels` in the order
    /// `[undecided, no, yes]`.
    pub fn label_with<'a>(self, labels: &[&'a str; 3]) -> &'a str {
        match self {
            TriState::Undecided => labels[0],
            TriState::No => labels[1],
            TriState::Yes => labels[2],
        }
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label_with(&Self::DEFAULT_LABELS))
    }
}
