//! Firefox.
//!
//! Unlike Chromium, Firefox profile directories are not named after the
//! profile: the name is resolved to a directory through `profiles.ini`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Browser, BrowserCleaner, CleanerCore, CleanerSettings};
use crate::cleaner::ExceptionSet;
use crate::error::{Result, Stage, WipeError};
use crate::fs::MemoryFs;
use crate::logging::Logger;
use crate::size::SizeMode;

mod profiles;

pub use profiles::{FirefoxProfile, PROFILES_INI, ProfileRegistry};

/// Firefox expects its cache directory to exist
const RECREATE_CACHE_DIR: bool = true;

/// Top-level profile entries that survive a wipe
pub const PROFILE_EXCEPTIONS: &[&str] = &[
    "extension-preferences.json",
    "extensions.json",
    "lock",
    "places.sqlite",
    "bookmarkbackups",
    "extensions",
    "security_state",
    "settings",
    "features",
];

pub struct FirefoxCleaner {
    core: CleanerCore,
    /// The selected profile, `None` for a scan-only cleaner
    profile: Option<FirefoxProfile>,
    registry: Option<ProfileRegistry>,
    data_dir: PathBuf,
    cache_dir: PathBuf,
    cleaned_size: u64,
}

impl FirefoxCleaner {
    pub fn builder() -> FirefoxCleanerBuilder {
        FirefoxCleanerBuilder::default()
    }

    /// Root holding `profiles.ini` and the profiles, e.g. `~/.mozilla/firefox`
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Root holding the profile caches, e.g. `~/.cache/mozilla/firefox`
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn profile(&self) -> Option<&FirefoxProfile> {
        self.profile.as_ref()
    }

    fn resolve(&self, name: &str) -> Option<&FirefoxProfile> {
        match &self.profile {
            Some(profile) if profile.name.eq_ignore_ascii_case(name.trim()) => Some(profile),
            _ => self.registry.as_ref()?.get(name),
        }
    }

    fn clear_cache(&self, profile: &FirefoxProfile) -> Result<u64> {
        let is_cache = self.identify_profile_cache(&profile.name);
        self.core.clear_cache(
            &profile.cache_dir(&self.cache_dir),
            &profile.data_dir(&self.data_dir),
            is_cache,
            RECREATE_CACHE_DIR,
        )
    }

    fn erase_profile(&mut self, profile: &FirefoxProfile) -> Result<u64> {
        let is_profile = self.identify_profile_data(&profile.name);
        let exceptions: ExceptionSet = PROFILE_EXCEPTIONS.iter().copied().collect();

        self.core
            .erase_profile(&profile.data_dir(&self.data_dir), is_profile, &exceptions)
            .map(|stats| stats.cleaned_size)
            .inspect_err(|e| {
                if let Some(stats) = e.partial_stats() {
                    self.cleaned_size += stats.cleaned_size;
                }
            })
    }

    /// Firefox extensions leave no log junk behind.
    fn clear_extensions(&self) -> Result<u64> {
        Ok(0)
    }
}

impl BrowserCleaner for FirefoxCleaner {
    fn browser(&self) -> Browser {
        Browser::Firefox
    }

    fn profile_name(&self) -> &str {
        self.profile.as_ref().map_or("", |p| p.name.as_str())
    }

    fn clear_profile(&mut self, do_cache: bool, do_profile: bool) -> Result<u64> {
        self.cleaned_size = 0;
        let Some(profile) = self.profile.clone() else {
            return Err(WipeError::InvalidOperation(
                "a scan-only Firefox cleaner cannot clear a profile".to_string(),
            ));
        };
        if profile.name.is_empty() {
            return Err(WipeError::NoProfile);
        }
        self.core.log().info(format!(
            "Clearing profile \"{}\" (dry run: {})",
            profile.name,
            self.core.is_dry_run()
        ));

        if do_cache {
            self.cleaned_size += self
                .clear_cache(&profile)
                .map_err(|e| Stage::ClearCache.fail(e))?;
        }
        if do_profile {
            self.cleaned_size += self
                .erase_profile(&profile)
                .map_err(|e| Stage::EraseProfile.fail(e))?;
            self.cleaned_size += self
                .clear_extensions()
                .map_err(|e| Stage::ClearExtensions.fail(e))?;
        }

        self.core.log().debug(format!(
            "profile \"{}\" cleared of private/junk data",
            profile.name
        ));
        Ok(self.cleaned_size)
    }

    /// With a selected profile the profile's own directories are described,
    /// otherwise the roots.
    fn tell(&self) -> bool {
        match &self.profile {
            Some(profile) => self.core.describe_dirs(
                self.browser().name(),
                &profile.data_dir(&self.data_dir),
                &profile.cache_dir(&self.cache_dir),
            ),
            None => self
                .core
                .describe_dirs(self.browser().name(), &self.data_dir, &self.cache_dir),
        }
    }

    /// Profile names from `profiles.ini`, the default one marked.
    fn find_profile_names(&self) -> Result<Vec<String>> {
        let registry = match &self.registry {
            Some(registry) => registry.clone(),
            None => ProfileRegistry::load(self.core.source().as_ref(), &self.data_dir)?,
        };

        Ok(registry
            .iter()
            .map(|p| {
                if p.is_default {
                    format!("{} (default)", p.name)
                } else {
                    p.name.clone()
                }
            })
            .collect())
    }

    fn identify_app_data_root(&self) -> bool {
        self.core.is_file(&self.data_dir.join(PROFILES_INI))
            && self.core.is_file(&self.data_dir.join("installs.ini"))
            && self.core.is_dir(&self.data_dir.join("Crash Reports"))
    }

    fn identify_profile_cache(&self, profile: &str) -> bool {
        let Some(profile) = self.resolve(profile) else {
            return false;
        };
        let cache = profile.cache_dir(&self.cache_dir);
        self.core.is_dir(&cache.join("cache2")) && self.core.is_dir(&cache.join("startupCache"))
    }

    fn identify_profile_data(&self, profile: &str) -> bool {
        let Some(profile) = self.resolve(profile) else {
            return false;
        };
        let user = profile.data_dir(&self.data_dir);
        self.core.is_dir(&user.join("bookmarkbackups"))
            && self.core.is_dir(&user.join("extensions"))
            && self.core.is_file(&user.join("places.sqlite"))
            && self.core.is_file(&user.join("cookies.sqlite"))
    }

    fn cleaned_size(&self) -> u64 {
        self.cleaned_size
    }
}

impl fmt::Display for FirefoxCleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}Cleaner {:?} cleaned {}",
            self.browser(),
            self.profile_name(),
            self.core.format_size(self.cleaned_size)
        )
    }
}

/// Builder for [`FirefoxCleaner`]
#[derive(Debug, Default)]
pub struct FirefoxCleanerBuilder {
    profile: Option<String>,
    settings: CleanerSettings,
}

impl FirefoxCleanerBuilder {
    /// Profile name as listed in `profiles.ini`. Without one the cleaner is
    /// scan-only.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
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

    /// Resolve the directories and, when a profile was given, look it up in
    /// `profiles.ini`. A missing registry or unknown profile is an error
    /// only in that case.
    pub fn build(self) -> Result<FirefoxCleaner> {
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

        let core = CleanerCore::new("FirefoxCleaner", &self.settings);
        let source = core.source();

        let (profile, registry) = match self.profile {
            Some(name) => {
                let registry = ProfileRegistry::load(source.as_ref(), &data_dir)?;
                let profile = registry
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| WipeError::ProfileNotFound {
                        browser: Browser::Firefox.to_string(),
                        profile: name.trim().to_string(),
                    })?;
                (Some(profile), Some(registry))
            }
            None => (None, ProfileRegistry::load(source.as_ref(), &data_dir).ok()),
        };

        Ok(FirefoxCleaner {
            core,
            profile,
            registry,
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
        at_home("Library/Application Support/Firefox")?,
        at_home("Library/Caches/Firefox")?,
    ))
}

#[cfg(windows)]
fn default_dirs() -> Result<(PathBuf, PathBuf)> {
    use crate::paths::{local_app_data, roaming_app_data};

    Ok((
        roaming_app_data()?.join("Mozilla").join("Firefox"),
        local_app_data()?.join("Mozilla").join("Firefox"),
    ))
}

#[cfg(all(not(windows), not(target_os = "macos")))]
fn default_dirs() -> Result<(PathBuf, PathBuf)> {
    use crate::paths::at_home;

    Ok((
        at_home(".mozilla/firefox")?,
        at_home(".cache/mozilla/firefox")?,
    ))
}
