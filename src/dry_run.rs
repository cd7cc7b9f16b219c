//! Switchable execution of destructive filesystem operations.
//!
//! Every mutating operation the cleaners perform goes through a
//! [`FileActions`] implementation. Three exist:
//!
//! - [`SimulatedActions`] only reports what would have been done (dry run)
//! - [`OsActions`] performs the operation on the real filesystem
//! - [`VirtualActions`] performs it on a [`MemoryFs`]
//!
//! A [`DryRunner`] owns the active binding and can be switched between the
//! three at any time. It implements [`FileActions`] itself by forwarding to
//! whatever is bound, so a cleaner holding a `&DryRunner` never sees a
//! half-switched state.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Result, WipeError};
use crate::fs::{FileSystem, MemoryFs, OsFs, TriState};
use crate::logging::Logger;
use crate::paths::from_home;

const HIGH_VOLTAGE: char = '\u{26A1}';

/// The destructive operations a cleaner may request
pub trait FileActions: Send + Sync {
    /// Delete `path` and everything below it.
    fn remove_all(&self, path: &Path) -> Result<()>;

    /// Delete a file or an empty directory.
    fn remove(&self, path: &Path) -> Result<()>;

    /// Create `path` and any missing parents with permission bits `mode`.
    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()>;

    /// Create `path`. The parent must exist.
    fn create_dir(&self, path: &Path, mode: u32) -> Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Whether `path` is a file on the filesystem this backend reads.
    fn is_file(&self, path: &Path) -> TriState;
}

/// Reports each action instead of performing it.
///
/// Queries still go to `source`, so existence checks reflect reality.
pub struct SimulatedActions {
    log: Logger,
    source: Arc<dyn FileSystem>,
}

impl SimulatedActions {
    /// Simulate against the real filesystem.
    pub fn new(log: &Logger) -> Self {
        Self::reading(log, Arc::new(OsFs))
    }

    /// Simulate against an arbitrary filesystem.
    pub fn reading(log: &Logger, source: Arc<dyn FileSystem>) -> Self {
        Self {
            log: log.inherit_as("DryRun"),
            source,
        }
    }

    fn report(&self, action: &str, path: &Path) {
        self.log
            .info(format!("\t{HIGH_VOLTAGE} {action} {}", from_home(path)));
    }
}

impl FileActions for SimulatedActions {
    fn remove_all(&self, path: &Path) -> Result<()> {
        self.report("remove_dir_all", path);
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.report("remove", path);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        self.log.info(format!(
            "\t{HIGH_VOLTAGE} create_dir_all {} {mode:o}",
            from_home(path)
        ));
        Ok(())
    }

    fn create_dir(&self, path: &Path, mode: u32) -> Result<()> {
        self.log.info(format!(
            "\t{HIGH_VOLTAGE} create_dir {} {mode:o}",
            from_home(path)
        ));
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.log.info(format!(
            "\t{HIGH_VOLTAGE} rename {} -> {}",
            from_home(from),
            from_home(to)
        ));
        Ok(())
    }

    fn is_file(&self, path: &Path) -> TriState {
        self.source.is_file(path)
    }
}

/// Performs actions on the real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsActions;

impl FileActions for OsActions {
    fn remove_all(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path).map_err(|source| io_error(path, source))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let meta = std::fs::symlink_metadata(path).map_err(|source| io_error(path, source))?;
        let removed = if meta.is_dir() {
            std::fs::remove_dir(path)
        } else {
            std::fs::remove_file(path)
        };
        removed.map_err(|source| io_error(path, source))
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        dir_builder(mode, true)
            .create(path)
            .map_err(|source| io_error(path, source))
    }

    fn create_dir(&self, path: &Path, mode: u32) -> Result<()> {
        dir_builder(mode, false)
            .create(path)
            .map_err(|source| io_error(path, source))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::rename(from, to).map_err(|source| io_error(from, source))
    }

    fn is_file(&self, path: &Path) -> TriState {
        OsFs.is_file(path)
    }
}

#[cfg(unix)]
fn dir_builder(mode: u32, recursive: bool) -> std::fs::DirBuilder {
    use std::os::unix::fs::DirBuilderExt;

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(recursive).mode(mode);
    builder
}

#[cfg(not(unix))]
fn dir_builder(_mode: u32, recursive: bool) -> std::fs::DirBuilder {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(recursive);
    builder
}

/// Performs actions on an in-memory filesystem.
#[derive(Clone, Debug)]
pub struct VirtualActions {
    vfs: Arc<MemoryFs>,
}

impl VirtualActions {
    pub fn new(vfs: Arc<MemoryFs>) -> Self {
        Self { vfs }
    }
}

impl FileActions for VirtualActions {
    fn remove_all(&self, path: &Path) -> Result<()> {
        self.vfs
            .remove_all(path)
            .map_err(|source| io_error(path, source))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.vfs.remove(path).map_err(|source| io_error(path, source))
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        self.vfs
            .create_dir_all(path, mode)
            .map_err(|source| io_error(path, source))
    }

    fn create_dir(&self, path: &Path, mode: u32) -> Result<()> {
        self.vfs
            .create_dir(path, mode)
            .map_err(|source| io_error(path, source))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.vfs
            .rename(from, to)
            .map_err(|source| io_error(from, source))
    }

    fn is_file(&self, path: &Path) -> TriState {
        self.vfs.is_file(path)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> WipeError {
    WipeError::IoError {
        path: path.to_path_buf(),
        source,
    }
}

/// Where the actions of a [`DryRunner`] take effect
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DryRunTarget {
    /// Nothing happens, actions are only reported
    #[default]
    Simulated,
    /// The real filesystem
    RealFilesystem,
    /// A bound in-memory filesystem
    VirtualFilesystem,
}

impl fmt::Display for DryRunTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DryRunTarget::Simulated => "NOP",
            DryRunTarget::RealFilesystem => "OS",
            DryRunTarget::VirtualFilesystem => "VFS",
        };
        f.write_str(name)
    }
}

struct Binding {
    target: DryRunTarget,
    actions: Arc<dyn FileActions>,
    source: Arc<dyn FileSystem>,
    vfs: Option<Arc<MemoryFs>>,
}

/// The action dispatcher.
///
/// Starts out [`Simulated`](DryRunTarget::Simulated). Switching rebinds the
/// actions, the query and the read side together under one lock.
pub struct DryRunner {
    log: Logger,
    binding: Mutex<Binding>,
}

impl DryRunner {
    pub fn new(log: &Logger) -> Self {
        let log = log.inherit_as("DryRun");
        let binding = Mutex::new(Self::simulated(&log));
        Self { log, binding }
    }

    /// Dry run: report actions, touch nothing.
    pub fn enable(&self) {
        *self.binding() = Self::simulated(&self.log);
    }

    /// Run actions on `vfs` instead of the real filesystem.
    pub fn enable_on(&self, vfs: Arc<MemoryFs>) {
        *self.binding() = Binding {
            target: DryRunTarget::VirtualFilesystem,
            actions: Arc::new(VirtualActions::new(Arc::clone(&vfs))),
            source: vfs.clone(),
            vfs: Some(vfs),
        };
    }

    /// Run actions on the real filesystem.
    pub fn disable(&self) {
        *self.binding() = Binding {
            target: DryRunTarget::RealFilesystem,
            actions: Arc::new(OsActions),
            source: Arc::new(OsFs),
            vfs: None,
        };
    }

    pub fn mode(&self) -> DryRunTarget {
        self.binding().target
    }

    /// True when running actions cannot change any filesystem.
    pub fn is_safe_run(&self) -> bool {
        self.mode() == DryRunTarget::Simulated
    }

    /// The filesystem reads should go to in the current mode.
    pub fn source(&self) -> Arc<dyn FileSystem> {
        Arc::clone(&self.binding().source)
    }

    /// The bound virtual filesystem.
    pub fn virtual_fs(&self) -> Result<Arc<MemoryFs>> {
        self.binding()
            .vfs
            .clone()
            .ok_or(WipeError::InvalidDryRunOperation {
                operation: "virtual_fs",
            })
    }

    fn simulated(log: &Logger) -> Binding {
        Binding {
            target: DryRunTarget::Simulated,
            actions: Arc::new(SimulatedActions::new(log)),
            source: Arc::new(OsFs),
            vfs: None,
        }
    }

    fn binding(&self) -> MutexGuard<'_, Binding> {
        self.binding
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn actions(&self) -> Arc<dyn FileActions> {
        Arc::clone(&self.binding().actions)
    }
}

impl Default for DryRunner {
    fn default() -> Self {
        Self::new(&Logger::default())
    }
}

impl fmt::Display for DryRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mode())
    }
}

impl FileActions for DryRunner {
    fn remove_all(&self, path: &Path) -> Result<()> {
        self.actions().remove_all(path)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.actions().remove(path)
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        self.actions().create_dir_all(path, mode)
    }

    fn create_dir(&self, path: &Path, mode: u32) -> Result<()> {
        self.actions().create_dir(path, mode)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.actions().rename(from, to)
    }

    fn is_file(&self, path: &Path) -> TriState {
        self.actions().is_file(path)
    }
}
