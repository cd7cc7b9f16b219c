//! Chromium and Chromium-based browsers.
//!
//! Profiles are plain directories under the data root (`Default`,
//! `Profile 1`, ...) with a matching directory under the cache root.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Browser, BrowserCleaner, CleanerCore, CleanerSettings, compile_patterns};
use crate::cleaner::ExceptionSet;
use crate::error::{Result, Stage, WipeError};
use crate::fs::MemoryFs;
use crate::logging::Logger;
use crate::size::SizeMode;

/// Chromium keeps no empty cache directory around
const RECREATE_CACHE_DIR: bool = false;

/// Top-level profile entries that survive a wipe
pub const PROFILE_EXCEPTIONS: &[&str] = &[
    "Bookmarks",
    "Bookmarks.bak",
    "LOCK",
    "Preferences",
    "PreferredApps",
    "Extension Rules",
    "Extensions",
    "Extension Scripts",
    "Extension State",
    // Progressive web apps keep their data here
    "File System",
    "Local Extension Settings",
    "Web Applications",
];

/// Profile subdirectories holding extension logs
const EXTENSION_DIRS: &[&str] = &["Extension Scripts", "Extension State", "Extension Rules"];

/// Cache subdirectories of a profile whose cache lives inside it
const INLINE_CACHE_DIRS: &[&str] = &[
    "Cache",
    "Code Cache",
    "GPUCache",
    "DawnCache",
    "DawnGraphiteCache",
    "DawnWebGPUCache",
];

/// Extension log junk, matched against file names
const JUNK_PATTERNS: &[&str] = &[r"^.*\.log$", r"^LOG.*$"];

pub struct ChromiumCleaner {
    core: CleanerCore,
    profile: String,
    data_dir: PathBuf,
    cache_dir: PathBuf,
    cleaned_size: u64,
}

impl ChromiumCleaner {
    pub fn builder() -> ChromiumCleanerBuilder {
        ChromiumCleanerBuilder::default()
    }

    /// Root holding all profiles, e.g. `~/.config/chromium`
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Root holding all profile caches, e.g. `~/.cache/chromium`
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn profile_root(&self) -> PathBuf {
        self.data_dir.join(&self.profile)
    }

    pub fn cache_root(&self) -> PathBuf {
        self.cache_dir.join(&self.profile)
    }

    /// Data and cache share one root, as on Windows, so each profile
    /// keeps its cache directories inside the profile.
    pub fn has_inline_cache(&self) -> bool {
        self.data_dir == self.cache_dir
    }

    fn clear_cache(&self) -> Result<u64> {
        let is_cache = self.identify_profile_cache(&self.profile);
        if self.has_inline_cache() {
            return self
                .core
                .clear_inline_cache(&self.profile_root(), is_cache, INLINE_CACHE_DIRS);
        }
        self.core.clear_cache(
            &self.cache_root(),
            &self.profile_root(),
            is_cache,
            RECREATE_CACHE_DIR,
        )
    }

    fn erase_profile(&mut self) -> Result<u64> {
        let is_profile = self.identify_profile_data(&self.profile);
        let exceptions: ExceptionSet = PROFILE_EXCEPTIONS.iter().copied().collect();

        match self
            .core
            .erase_profile(&self.profile_root(), is_profile, &exceptions)
        {
            Ok(stats) => Ok(stats.cleaned_size),
            Err(e) => {
                if let Some(stats) = e.partial_stats() {
                    self.cleaned_size += stats.cleaned_size;
                }
                Err(e)
            }
        }
    }

    /// Remove extension log files. Problems with a single directory are
    /// only warnings.
    fn clear_extensions(&self) -> Result<u64> {
        let patterns = compile_patterns(JUNK_PATTERNS)?;
        let log = self.core.log();
        let mut removed = 0u64;

        for sub_dir in EXTENSION_DIRS {
            log.info(format!("\tClearing {sub_dir}..."));
            let dir = self.profile_root().join(sub_dir);
            match self.core.remove_matching(&dir, &patterns) {
                Ok(bytes) => removed += bytes,
                Err(e) => log.warn(format!("{sub_dir}: {e}")),
            }
        }

        log.info("\t...Cleared extension junk");
        Ok(removed)
    }
}

impl BrowserCleaner for ChromiumCleaner {
    fn browser(&self) -> Browser {
        Browser::Chromium
    }

    fn profile_name(&self) -> &str {
        &self.profile
    }

    fn clear_profile(&mut self, do_cache: bool, do_profile: bool) -> Result<u64> {
        self.cleaned_size = 0;
        if self.profile.is_empty() {
            return Err(WipeError::NoProfile);
        }
        self.core.log().info(format!(
            "Clearing profile \"{}\" (dry run: {})",
            self.profile,
            self.core.is_dry_run()
        ));

        if do_cache {
            self.cleaned_size += self.clear_cache().map_err(|e| Stage::ClearCache.fail(e))?;
        }
        if do_profile {
            self.cleaned_size += self
                .erase_profile()
                .map_err(|e| Stage::EraseProfile.fail(e))?;
            self.cleaned_size += self
                .clear_extensions()
                .map_err(|e| Stage::ClearExtensions.fail(e))?;
        }

        self.core.log().debug(format!(
            "profile \"{}\" cleared of private/junk data",
            self.profile
        ));
        Ok(self.cleaned_size)
    }

    fn tell(&self) -> bool {
        self.core
            .describe_dirs(self.browser().name(), &self.data_dir, &self.cache_dir)
    }

    /// Top-level directories of the data root that look like profiles.
    fn find_profile_names(&self) -> Result<Vec<String>> {
        if !self.core.is_dir(&self.data_dir) {
            return Ok(Vec::new());
        }

        let entries = self
            .core
            .source()
            .read_dir(&self.data_dir)
            .map_err(|source| WipeError::IoError {
                path: self.data_dir.clone(),
                source,
            })?;

        let mut names: Vec<String> = entries
            .into_iter()
            .filter(|entry| entry.is_dir())
            .filter_map(|entry| entry.name().to_str().map(str::to_string))
            .filter(|name| self.identify_profile_data(name))
            .collect();
        names.sort();
        Ok(names)
    }

    fn identify_app_data_root(&self) -> bool {
        ["System Profile", "Default", "Avatars", "Safe Browsing"]
            .iter()
            .all(|dir| self.core.is_dir(&self.data_dir.join(dir)))
    }

    fn identify_profile_cache(&self, profile: &str) -> bool {
        let cache = self.cache_dir.join(profile);
        self.core.is_dir(&cache.join("Cache")) && self.core.is_dir(&cache.join("Code Cache"))
    }

    fn identify_profile_data(&self, profile: &str) -> bool {
        let user = self.data_dir.join(profile);
        self.core.is_dir(&user.join("Extension Rules"))
            && self.core.is_file(&user.join("Preferences"))
            && self.core.is_file(&user.join("Bookmarks"))
    }

    fn cleaned_size(&self) -> u64 {
        self.cleaned_size
    }
}

impl fmt::Display for ChromiumCleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Cleaner {:?} cleaned {}",
            self.browser(),
            self.profile,
            self.core.format_size(self.cleaned_size)
        )
    }
}

/// Builder for [`ChromiumCleaner`]
#[derive(Debug, Default)]
pub struct ChromiumCleanerBuilder {
    profile: String,
    settings: CleanerSettings,
}

impl ChromiumCleanerBuilder {
    /// Profile directory name, e.g. `Profile 1`
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Replace all shared settings at once
    pub fn settings(mut self, settings: CleanerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn size_mode(mut self, mode: SizeMode) -> Self {
        self.settings.size_mode = mode;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.settings.dry_run = dry_run;
        self
    }

    pub fn logger(mut self, log: &Logger) -> Self {
        self.settings.log = log.clone();
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.data_dir = Some(dir.into());
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.cache_dir = Some(dir.into());
        self
    }

    pub fn virtual_fs(mut self, vfs: Arc<MemoryFs>) -> Self {
        self.settings.vfs = Some(vfs);
        self
    }

    pub fn build(self) -> Result<ChromiumCleaner> {
        let overrides = (
            self.settings.data_dir.clone(),
            self.settings.cache_dir.clone(),
        );
        let (data_dir, cache_dir) = match overrides {
            (Some(data), Some(cache)) => (data, cache),
            (data, cache) => {
                let (default_data, default_cache) = default_dirs()?;
                (data.unwrap_or(default_data), cache.unwrap_or(default_cache))
            }
        };

        Ok(ChromiumCleaner {
            core: CleanerCore::new("ChromiumCleaner", &self.settings),
            profile: self.profile.trim_matches([' ', '\t']).to_string(),
            data_dir,
            cache_dir,
            cleaned_size: 0,
        })
    }
}

#[cfg(target_os = "macos")]
fn default_dirs() -> Result<(PathBuf, PathBuf)> {
    use crate::paths::at_home;

    Ok((
        at_home("Library/Application Support/Chromium")?,
        at_home("Library/Caches/Chromium")?,
    ))
}

/// Caches live inside the profiles under `User Data`.
#[cfg(windows)]
fn default_dirs() -> Result<(PathBuf, PathBuf)> {
    let root = crate::paths::local_app_data()?
        .join("Chromium")
        .join("User Data");
    Ok((root.clone(), root))
}

#[cfg(all(not(windows), not(target_os = "macos")))]
fn default_dirs() -> Result<(PathBuf, PathBuf)> {
    use crate::paths::at_home;

    Ok((at_home(".config/chromium")?, at_home(".cache/chromium")?))
}
