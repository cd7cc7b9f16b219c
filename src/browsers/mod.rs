//! Per-browser profile cleaners.
//!
//! Each supported browser knows where its data and cache live, how to
//! recognise its own directories, and which profile entries must survive a
//! wipe. The shared machinery (dry-run dispatch, sizing, cache removal and
//! the exception-aware profile cleanup) lives in [`CleanerCore`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use regex::Regex;

use crate::cleaner::{CleanupStats, DirCleaner, ExceptionSet};
use crate::dry_run::{DryRunner, FileActions};
use crate::error::{Result, WipeError};
use crate::fs::{FileSystem, MemoryFs, TriState, directory_size_lossy};
use crate::logging::Logger;
use crate::paths::from_home;
use crate::size::SizeMode;

pub mod chromium;
pub mod firefox;

pub use chromium::ChromiumCleaner;
pub use firefox::FirefoxCleaner;

/// Permission bits for a re-created cache directory
const CACHE_DIR_MODE: u32 = 0o700;

/// The browsers that can be wiped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Browser {
    Chromium,
    Firefox,
}

impl Browser {
    pub const ALL: [Browser; 2] = [Browser::Chromium, Browser::Firefox];

    pub fn name(self) -> &'static str {
        match self {
            Browser::Chromium => "Chromium",
            Browser::Firefox => "Firefox",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Browser {
    type Err = WipeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Browser::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| WipeError::UnsupportedBrowser(s.to_string()))
    }
}

/// A cleaner for one browser profile.
pub trait BrowserCleaner: fmt::Display {
    fn browser(&self) -> Browser;

    /// The profile this cleaner was built for, empty when scanning.
    fn profile_name(&self) -> &str;

    /// Wipe the profile's cache and/or its non-essential data.
    ///
    /// Returns the number of bytes cleaned (or that would have been cleaned
    /// in a dry run). Failures are reported per stage, see
    /// [`Stage`](crate::error::Stage).
    fn clear_profile(&mut self, do_cache: bool, do_profile: bool) -> Result<u64>;

    /// Print where the browser's directories are expected, whether they
    /// exist and how large they are. Returns true if both exist.
    fn tell(&self) -> bool;

    /// Names of the profiles found on this system.
    fn find_profile_names(&self) -> Result<Vec<String>>;

    /// Whether the data directory holds this browser's profiles.
    fn identify_app_data_root(&self) -> bool;

    /// Whether `profile` has a cache directory that belongs to this browser.
    fn identify_profile_cache(&self, profile: &str) -> bool;

    /// Whether `profile` has a data directory that belongs to this browser.
    fn identify_profile_data(&self, profile: &str) -> bool;

    /// Bytes cleaned by the last [`clear_profile`](Self::clear_profile).
    fn cleaned_size(&self) -> u64;
}

/// Options every browser cleaner accepts
#[derive(Clone, Debug, Default)]
pub struct CleanerSettings {
    /// How sizes are reported
    pub size_mode: SizeMode,
    /// Only report what would be removed
    pub dry_run: bool,
    pub log: Logger,
    /// Overrides the browser's data directory
    pub data_dir: Option<PathBuf>,
    /// Overrides the browser's cache directory
    pub cache_dir: Option<PathBuf>,
    /// Run against this in-memory filesystem instead of the disk
    pub vfs: Option<Arc<MemoryFs>>,
}

/// Build the cleaner for `browser`.
///
/// Without a profile the cleaner can only scan.
pub fn cleaner_for(
    browser: Browser,
    profile: Option<&str>,
    settings: CleanerSettings,
) -> Result<Box<dyn BrowserCleaner>> {
    let cleaner: Box<dyn BrowserCleaner> = match browser {
        Browser::Chromium => Box::new(
            ChromiumCleaner::builder()
                .settings(settings)
                .profile(profile.unwrap_or_default())
                .build()?,
        ),
        Browser::Firefox => {
            let builder = FirefoxCleaner::builder().settings(settings);
            let builder = match profile {
                Some(profile) => builder.profile(profile),
                None => builder,
            };
            Box::new(builder.build()?)
        }
    };
    Ok(cleaner)
}

/// The machinery shared by all browser cleaners.
///
/// Reads go to the filesystem the dry runner is bound to, so identification
/// and sizing see the same tree the deletions act on.
pub(crate) struct CleanerCore {
    runner: DryRunner,
    size_mode: SizeMode,
    log: Logger,
}

impl CleanerCore {
    /// A bound virtual filesystem wins over the dry-run flag.
    pub(crate) fn new(name: &'static str, settings: &CleanerSettings) -> Self {
        let log = settings.log.inherit_as(name);
        let runner = DryRunner::new(&log);
        match &settings.vfs {
            Some(vfs) => runner.enable_on(Arc::clone(vfs)),
            None if settings.dry_run => runner.enable(),
            None => runner.disable(),
        }

        Self {
            runner,
            size_mode: settings.size_mode,
            log,
        }
    }

    pub(crate) fn log(&self) -> &Logger {
        &self.log
    }

    pub(crate) fn is_dry_run(&self) -> bool {
        self.runner.is_safe_run()
    }

    pub(crate) fn source(&self) -> Arc<dyn FileSystem> {
        self.runner.source()
    }

    pub(crate) fn is_dir(&self, path: &Path) -> bool {
        self.source().is_dir(path)
    }

    pub(crate) fn is_file(&self, path: &Path) -> bool {
        self.source().is_file(path) == TriState::Yes
    }

    pub(crate) fn format_size(&self, bytes: u64) -> String {
        self.size_mode.format(bytes)
    }

    /// Remove a whole profile cache directory.
    ///
    /// Refuses a cache directory that is, contains or lies inside
    /// `profile_root`. The size is measured first for reporting only.
    /// Re-creating the directory afterwards is best effort.
    pub(crate) fn clear_cache(
        &self,
        cache_root: &Path,
        profile_root: &Path,
        is_cache: bool,
        recreate: bool,
    ) -> Result<u64> {
        self.log.info("\tClearing cache...");

        if cache_root.starts_with(profile_root) || profile_root.starts_with(cache_root) {
            self.log.debug(format!(
                "cache {} overlaps profile {}",
                cache_root.display(),
                profile_root.display()
            ));
            return Err(WipeError::NotBrowserCache(cache_root.to_path_buf()));
        }

        let size = directory_size_lossy(self.source().as_ref(), cache_root, &self.log);
        if !is_cache {
            self.log
                .debug(format!("not a browser cache: {}", cache_root.display()));
            return Err(WipeError::NotBrowserCache(cache_root.to_path_buf()));
        }

        self.runner.remove_all(cache_root)?;
        if recreate && let Err(e) = self.runner.create_dir(cache_root, CACHE_DIR_MODE) {
            self.log.warn(format!(
                "could not recreate cache {}: {e}",
                from_home(cache_root)
            ));
        }

        self.report_cache(size);
        self.log.debug("clear_cache done");
        Ok(size)
    }

    /// Remove the cache subdirectories `cache_dirs` of a profile that keeps
    /// its cache inside the profile directory. Missing ones are skipped.
    pub(crate) fn clear_inline_cache(
        &self,
        profile_root: &Path,
        is_cache: bool,
        cache_dirs: &[&str],
    ) -> Result<u64> {
        self.log.info("\tClearing cache...");
        if !is_cache {
            self.log
                .debug(format!("no browser cache in {}", profile_root.display()));
            return Err(WipeError::NotBrowserCache(profile_root.to_path_buf()));
        }

        let source = self.source();
        let mut size = 0u64;
        for name in cache_dirs {
            let dir = profile_root.join(name);
            if !source.is_dir(&dir) {
                continue;
            }
            let bytes = directory_size_lossy(source.as_ref(), &dir, &self.log);
            self.runner.remove_all(&dir)?;
            self.log.debug(format!("{bytes:>8} D {}", dir.display()));
            size = size.saturating_add(bytes);
        }

        self.report_cache(size);
        self.log.debug("clear_inline_cache done");
        Ok(size)
    }

    fn report_cache(&self, size: u64) {
        let verb = if self.is_dry_run() {
            "Would have deleted"
        } else {
            "Deleted"
        };
        self.log.info(format!(
            "\t{verb} {} bytes from cache",
            self.format_size(size)
        ));
    }

    /// Clean the top level of a profile, keeping `exceptions`.
    pub(crate) fn erase_profile(
        &self,
        profile_root: &Path,
        is_profile: bool,
        exceptions: &ExceptionSet,
    ) -> Result<CleanupStats> {
        self.log.info("\tClearing profile");
        if !is_profile {
            return Err(WipeError::NotBrowserProfile(profile_root.to_path_buf()));
        }

        let source = self.source();
        let mut cleaner = DirCleaner::new(profile_root, source.as_ref(), &self.runner, &self.log);
        let stats = cleaner.clean_up(exceptions)?;
        self.log.debug(&cleaner);

        let verb = if self.is_dry_run() {
            "Would erase"
        } else {
            "Erased"
        };
        self.log.info(format!(
            "\t...{verb} {} bytes ({} removed, {} kept)",
            self.format_size(stats.cleaned_size),
            stats.removed,
            stats.skipped
        ));
        Ok(stats)
    }

    /// Remove the top-level files of `dir` whose name matches any pattern.
    pub(crate) fn remove_matching(&self, dir: &Path, patterns: &[Regex]) -> Result<u64> {
        let entries = self
            .source()
            .read_dir(dir)
            .map_err(|source| WipeError::IoError {
                path: dir.to_path_buf(),
                source,
            })?;

        let mut removed = 0u64;
        for entry in entries {
            let Some(len) = entry.file_len() else {
                continue;
            };
            let name = entry.name().to_string_lossy();
            if !patterns.iter().any(|p| p.is_match(&name)) {
                continue;
            }

            let path = dir.join(entry.name());
            self.runner.remove(&path)?;
            self.log.debug(format!("{len:>8} F {}", path.display()));
            removed = removed.saturating_add(len);
        }

        Ok(removed)
    }

    /// Print the location, presence and size of a data and a cache
    /// directory. Returns true if both exist.
    pub(crate) fn describe_dirs(&self, title: &str, data_dir: &Path, cache_dir: &Path) -> bool {
        let source = self.source();
        let data_exists = source.is_dir(data_dir);
        let cache_exists = source.is_dir(cache_dir);

        let size_of = |exists: bool, dir: &Path| {
            if exists {
                directory_size_lossy(source.as_ref(), dir, &self.log)
            } else {
                0
            }
        };
        let (data_size, cache_size) = rayon::join(
            || size_of(data_exists, data_dir),
            || size_of(cache_exists, cache_dir),
        );

        self.log.info(format!("\u{274B}\u{2726} {title} Directories:"));
        self.log.info(format!(
            "\tData : {data_exists:>5} {} {}",
            from_home(data_dir),
            self.format_size(data_size)
        ));
        self.log.info(format!(
            "\tCache: {cache_exists:>5} {} {}",
            from_home(cache_dir),
            self.format_size(cache_size)
        ));

        data_exists && cache_exists
    }
}

/// Compile a list of file name patterns.
pub(crate) fn compile_patterns(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| WipeError::InvalidPattern {
                pattern: (*pattern).to_string(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests;
