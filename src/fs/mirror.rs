use std::path::Path;

use walkdir::WalkDir;

use super::{DirEntry, FileSystem, MemoryFs};
use crate::error::{Result, WipeError};
use crate::logging::Logger;

/// Content written for every mirrored file
pub const PLACEHOLDER: &[u8] = b"...";

/// Directory and file counts of a tree, excluding its root
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeCounts {
    pub directories: usize,
    pub files: usize,
}

/// Recreate the real tree at `root` inside `vfs`.
///
/// The root and its ancestors are created first, then every subdirectory
/// with its permission bits and a [`PLACEHOLDER`] file for every file or
/// symlink. Symlinks are not followed. Stops at the first error.
pub fn mirror_tree(root: &Path, vfs: &MemoryFs) -> Result<TreeCounts> {
    let root_mode = std::fs::metadata(root)
        .map(|meta| permission_bits(&meta))
        .map_err(|source| WipeError::IoError {
            path: root.to_path_buf(),
            source,
        })?;
    vfs.create_dir_all(root, root_mode)
        .map_err(|source| WipeError::IoError {
            path: root.to_path_buf(),
            source,
        })?;

    let mut counts = TreeCounts::default();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| WipeError::IoError {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path();
        let io_err = |source: std::io::Error| WipeError::IoError {
            path: path.to_path_buf(),
            source,
        };

        let meta = entry.metadata().map_err(|e| io_err(e.into()))?;
        if entry.file_type().is_dir() {
            vfs.create_dir(path, permission_bits(&meta))
                .map_err(io_err)?;
            counts.directories += 1;
        } else {
            vfs.write_file(path, PLACEHOLDER, permission_bits(&meta))
                .map_err(io_err)?;
            counts.files += 1;
        }
    }

    Ok(counts)
}

/// Count the directories and files below `root` on any [`FileSystem`].
pub fn count_tree(fs: &dyn FileSystem, root: &Path) -> Result<TreeCounts> {
    walk_tree(fs, root, |_, _| {})
}

/// One line per entry below `root`, sorted by path: directories end with
/// a separator, files and symlinks carry their byte length.
pub fn tree_listing(fs: &dyn FileSystem, root: &Path) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    walk_tree(fs, root, |path, entry| {
        let line = match entry.file_len() {
            Some(len) => format!("{len:>10} {}", path.display()),
            None => format!("{:>10} {}{}", "", path.display(), std::path::MAIN_SEPARATOR),
        };
        lines.push((path.to_path_buf(), line));
    })?;
    lines.sort();
    Ok(lines.into_iter().map(|(_, line)| line).collect())
}

/// Log the tree below `root` through [`Logger::debug`] and return its
/// counts.
pub fn dump_tree(fs: &dyn FileSystem, root: &Path, log: &Logger) -> Result<TreeCounts> {
    if !log.is_enabled() || log.quiet() {
        return count_tree(fs, root);
    }

    log.debug(format!("tree of {}:", root.display()));
    for line in tree_listing(fs, root)? {
        log.debug(line);
    }
    let counts = count_tree(fs, root)?;
    log.debug(format!(
        "{} directories, {} files",
        counts.directories, counts.files
    ));
    Ok(counts)
}

fn walk_tree(
    fs: &dyn FileSystem,
    root: &Path,
    mut visit: impl FnMut(&Path, &DirEntry),
) -> Result<TreeCounts> {
    let mut counts = TreeCounts::default();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs.read_dir(&dir).map_err(|source| WipeError::IoError {
            path: dir.clone(),
            source,
        })?;

        for entry in entries {
            let path = dir.join(entry.name());
            visit(&path, &entry);
            if entry.is_dir() {
                counts.directories += 1;
                pending.push(path);
            } else {
                counts.files += 1;
            }
        }
    }

    Ok(counts)
}

#[cfg(unix)]
fn permission_bits(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(_meta: &std::fs::Metadata) -> u32 {
    0o755
}
