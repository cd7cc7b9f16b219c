//! Command-line interface definitions for browser-wipe.
//!
//! This module defines the CLI structure using clap. The main entry point is
//! the [`Cli`] struct, which can also be assembled programmatically through
//! [`Cli::builder`].
//!
//! # Example
//!
//! ```no_run
//! use browser_wipe::cli::Cli;
//!
//! let cli = Cli::parse_args();
//! if cli.scan() {
//!     println!("Scanning for {}", cli.browser());
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::error::{Result, WipeError};
use crate::logging::Logger;

/// Main command-line interface for browser-wipe.
///
/// Without `--cache` or `--profile` both the cache and the profile data are
/// wiped.
#[derive(Debug, Parser)]
#[command(
    name = "browser-wipe",
    bin_name = "browser-wipe",
    author,
    version,
    about = "Remove private and junk data from browser profiles, keeping bookmarks, extensions and settings",
    long_about = None
)]
pub struct Cli {
    /// Browser to clean (chromium, firefox)
    #[arg(
        short,
        long,
        default_value = "chromium",
        env = "BROWSER_WIPE_BROWSER"
    )]
    browser: String,

    /// Profile to clean, e.g. "Default" or "Profile 1"
    #[arg(short, long, env = "BROWSER_WIPE_NAME")]
    name: Option<String>,

    /// Clear the profile cache
    #[arg(short, long, env = "BROWSER_WIPE_CACHE")]
    cache: bool,

    /// Erase the profile's private data
    #[arg(short, long, env = "BROWSER_WIPE_PROFILE")]
    profile: bool,

    /// List browser directories and profiles, delete nothing
    #[arg(short, long, env = "BROWSER_WIPE_SCAN")]
    scan: bool,

    /// Size display mode: Std, SI or IEC
    #[arg(
        short = 'z',
        long,
        default_value = "Std",
        env = "BROWSER_WIPE_SIZE"
    )]
    size: String,

    /// Report what would be deleted without deleting anything
    #[arg(long, env = "BROWSER_WIPE_DRY")]
    dry: bool,

    /// Enable diagnostic logging
    #[arg(long, env = "BROWSER_WIPE_LOG")]
    log: bool,

    /// Silence all output except for errors
    #[arg(short, long, conflicts_with = "log", env = "BROWSER_WIPE_QUIET")]
    quiet: bool,

    /// Override the browser's data directory
    #[arg(long, env = "BROWSER_WIPE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Override the browser's cache directory
    #[arg(long, env = "BROWSER_WIPE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

impl Cli {
    /// Parse the process arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a builder for programmatic construction
    pub fn builder() -> CliBuilder {
        CliBuilder::default()
    }

    /// The browser name as given, not yet validated
    pub fn browser(&self) -> &str {
        &self.browser
    }

    /// The profile name, if one was given
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the cache should be cleared
    pub fn do_cache(&self) -> bool {
        self.cache || !self.profile
    }

    /// Whether the profile data should be erased
    pub fn do_profile(&self) -> bool {
        self.profile || !self.cache
    }

    pub fn scan(&self) -> bool {
        self.scan
    }

    /// The size mode as given, not yet validated
    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn dry(&self) -> bool {
        self.dry
    }

    pub fn log(&self) -> bool {
        self.log
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// The data directory override, made absolute
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.as_deref().map(normalize_path)
    }

    /// The cache directory override, made absolute
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir.as_deref().map(normalize_path)
    }

    /// The root logger for this invocation
    pub fn logger(&self) -> Logger {
        Logger::new(self.log, "Main").with_quiet(self.quiet)
    }
}

/// Builder for [`Cli`]
#[derive(Debug, Default)]
pub struct CliBuilder {
    browser: Option<String>,
    name: Option<String>,
    cache: bool,
    profile: bool,
    scan: bool,
    size: Option<String>,
    dry: bool,
    log: bool,
    quiet: bool,
    data_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
}

impl CliBuilder {
    /// Set the browser name
    pub fn browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = Some(browser.into());
        self
    }

    /// Set the profile name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Clear the cache
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    /// Erase the profile data
    pub fn profile(mut self, enabled: bool) -> Self {
        self.profile = enabled;
        self
    }

    /// Scan instead of wiping
    pub fn scan(mut self, enabled: bool) -> Self {
        self.scan = enabled;
        self
    }

    /// Set the size display mode
    pub fn size(mut self, mode: impl Into<String>) -> Self {
        self.size = Some(mode.into());
        self
    }

    /// Enable dry-run mode
    pub fn dry(mut self, enabled: bool) -> Self {
        self.dry = enabled;
        self
    }

    /// Enable diagnostic logging
    pub fn log(mut self, enabled: bool) -> Self {
        self.log = enabled;
        self
    }

    /// Enable quiet mode
    pub fn quiet(mut self, enabled: bool) -> Self {
        self.quiet = enabled;
        self
    }

    /// Override the data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Override the cache directory
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Build the Cli instance
    pub fn build(self) -> Result<Cli> {
        if self.log && self.quiet {
            return Err(WipeError::ConfigError(
                "--log and --quiet cannot be used together".to_string(),
            ));
        }

        Ok(Cli {
            browser: self.browser.unwrap_or_else(|| "chromium".to_string()),
            name: self.name,
            cache: self.cache,
            profile: self.profile,
            scan: self.scan,
            size: self.size.unwrap_or_else(|| "Std".to_string()),
            dry: self.dry,
            log: self.log,
            quiet: self.quiet,
            data_dir: self.data_dir,
            cache_dir: self.cache_dir,
        })
    }
}

/// Normalize a path to be absolute and clean, without requiring it to exist.
///
/// This function:
/// - Converts relative paths to absolute using the current directory
/// - Removes `.` and `..` components where possible
/// - Does NOT resolve symlinks
/// - Does NOT require the path to exist
pub(crate) fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    use std::path::Component;

    let path = path.as_ref();
    let absolute = if path.is_relative() {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    } else {
        path.to_path_buf()
    };

    let mut components = Vec::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                if let Some(last) = components.last()
                    && !matches!(last, Component::ParentDir | Component::RootDir)
                {
                    components.pop();
                    continue;
                }
                if matches!(components.last(), Some(Component::RootDir)) {
                    continue;
                }
                components.push(component);
            }
            Component::CurDir => continue,
            _ => components.push(component),
        }
    }

    components.into_iter().collect()
}
