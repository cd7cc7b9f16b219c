use std::path::Path;

use super::FileSystem;
use crate::error::{Result, WipeError};
use crate::logging::Logger;

/// Total byte size of the files below `path`.
///
/// Directories contribute only through their contents and symlinks are
/// counted with their own length without being followed. The first listing
/// error aborts the walk.
pub fn directory_size(fs: &dyn FileSystem, path: &Path) -> Result<u64> {
    let mut total = 0u64;
    let mut pending = vec![path.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs.read_dir(&dir).map_err(|source| WipeError::IoError {
            path: dir.clone(),
            source,
        })?;

        for entry in entries {
            match entry.file_len() {
                Some(len) => total = total.saturating_add(len),
                None => pending.push(dir.join(entry.name())),
            }
        }
    }

    Ok(total)
}

/// Like [`directory_size`] but for informational output: unreadable
/// subdirectories are skipped with a warning instead of failing the sum.
pub fn directory_size_lossy(fs: &dyn FileSystem, path: &Path, log: &Logger) -> u64 {
    let mut total = 0u64;
    let mut pending = vec![path.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                log.debug(format!("cannot size {}: {e}", dir.display()));
                continue;
            }
        };

        for entry in entries {
            match entry.file_len() {
                Some(len) => total = total.saturating_add(len),
                None => pending.push(dir.join(entry.name())),
            }
        }
    }

    total
}
