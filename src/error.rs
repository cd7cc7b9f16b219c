//! Error types for browser-wipe.
//!
//! This module defines all error types used throughout browser-wipe, using
//! a combination of `thiserror` for ergonomic error definitions and `miette`
//! for rich diagnostic output.
//!
//! # Error Handling Strategy
//!
//! - All errors derive from [`WipeError`]
//! - Each variant includes helpful error messages and diagnostic codes
//! - Every variant maps to a process exit code through
//!   [`WipeError::exit_code`]
//! - A cleanup that fails halfway keeps its partial statistics inside
//!   [`WipeError::CleanupAborted`]
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use browser_wipe::error::{Result, WipeError};
//!
//! fn check_cache(path: &Path) -> Result<()> {
//!     if !path.join("Cache").is_dir() {
//!         return Err(WipeError::NotBrowserCache(path.to_path_buf()));
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::cleaner::CleanupStats;

/// Exit code used for failures that have no dedicated code.
pub const EXIT_GENERAL_FAILURE: u8 = 9;

/// Error types that can occur in browser-wipe operations
#[derive(Error, Debug, Diagnostic)]
pub enum WipeError {
    /// File system I/O error.
    ///
    /// Wraps the native error of the backend that performed the operation
    /// (the operating system or the in-memory filesystem) together with the
    /// path it was operating on.
    #[error("I/O error accessing '{path}'")]
    #[diagnostic(code(browser_wipe::io_error))]
    IoError {
        /// The path that caused the I/O error
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A virtual-filesystem operation was requested while the dry runner is
    /// not bound to a virtual filesystem.
    #[error("Invalid dry run operation: {operation} requires a virtual filesystem")]
    #[diagnostic(
        code(browser_wipe::dry_run::invalid_operation),
        help("Bind a virtual filesystem with `DryRunner::enable_on` first.")
    )]
    InvalidDryRunOperation {
        /// The operation that was attempted
        operation: &'static str,
    },

    /// The requested browser has no cleaner.
    #[error("Unsupported browser '{0}'")]
    #[diagnostic(
        code(browser_wipe::browser::unsupported),
        help("Supported browsers are: chromium, firefox")
    )]
    UnsupportedBrowser(
        /// The browser name given by the user
        String,
    ),

    /// A wipe was requested without naming the profile to wipe.
    #[error("Need the profile directory base name")]
    #[diagnostic(
        code(browser_wipe::cli::missing_profile),
        help("Pass the profile with --name, e.g. --name 'Profile 1'")
    )]
    MissingProfileName,

    /// Unknown size reporting mode.
    #[error("Unknown size mode '{0}'")]
    #[diagnostic(
        code(browser_wipe::size::invalid_mode),
        help("Use one of: Std, SI, IEC")
    )]
    InvalidSizeMode(
        /// The mode given by the user
        String,
    ),

    /// The user's home directory could not be determined.
    #[error("Could not determine the home directory")]
    #[diagnostic(code(browser_wipe::home::unavailable))]
    HomeDirUnavailable,

    /// The browser's profile registry (Firefox `profiles.ini`) is missing.
    #[error("Profile registry not found at '{0}'")]
    #[diagnostic(
        code(browser_wipe::profile::registry_missing),
        help("Is the browser installed for this user? Try --scan.")
    )]
    ProfileRegistryMissing(
        /// Where the registry was expected
        PathBuf,
    ),

    /// The browser's profile registry could not be parsed.
    #[error("Malformed profile registry '{path}' at line {line}: {message}")]
    #[diagnostic(code(browser_wipe::profile::registry_parse))]
    ProfileRegistryParse {
        /// The registry file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// The named profile is not known to the browser.
    #[error("{browser} profile '{profile}' does not exist")]
    #[diagnostic(
        code(browser_wipe::profile::not_found),
        help("Run with --scan to list the profiles found on this system.")
    )]
    ProfileNotFound {
        /// Browser name
        browser: String,
        /// The profile that was requested
        profile: String,
    },

    /// A browser cleaner was asked to clear a profile with an empty name.
    #[error("Browser user profile not given")]
    #[diagnostic(code(browser_wipe::profile::none))]
    NoProfile,

    /// A cleaner built for scanning was asked to clear a profile.
    #[error("Invalid operation: {0}")]
    #[diagnostic(code(browser_wipe::browser::invalid_operation))]
    InvalidOperation(
        /// Description of the operation
        String,
    ),

    /// The directory does not look like a browser cache.
    #[error("Not a browser cache directory: '{0}'")]
    #[diagnostic(
        code(browser_wipe::browser::not_cache),
        help("Refusing to delete a directory that does not look like a browser cache.")
    )]
    NotBrowserCache(
        /// The directory that failed identification
        PathBuf,
    ),

    /// The directory does not look like a browser user profile.
    #[error("Not a browser user profile directory: '{0}'")]
    #[diagnostic(
        code(browser_wipe::browser::not_profile),
        help("Refusing to clean a directory that does not look like a browser profile.")
    )]
    NotBrowserProfile(
        /// The directory that failed identification
        PathBuf,
    ),

    /// A junk-file pattern failed to compile.
    #[error("Invalid file pattern '{pattern}'")]
    #[diagnostic(code(browser_wipe::pattern::invalid))]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// The regex compilation error
        #[source]
        source: regex::Error,
    },

    /// A directory cleanup stopped at its first failed deletion.
    ///
    /// The statistics accumulated before the failure are kept so that the
    /// caller can still report how much was cleaned.
    #[error(
        "Cleanup of '{root}' aborted after removing {removed} entries",
        removed = .stats.removed
    )]
    #[diagnostic(code(browser_wipe::cleaner::aborted))]
    CleanupAborted {
        /// The cleanup root
        root: PathBuf,
        /// Statistics accumulated before the failure
        stats: CleanupStats,
        /// The deletion error
        #[source]
        source: Box<WipeError>,
    },

    /// One stage of a browser profile wipe failed.
    #[error("Error E-{code:03}: {stage} failed", code = .stage.exit_code())]
    #[diagnostic(code(browser_wipe::browser::stage_failed))]
    StageFailed {
        /// The stage that failed
        stage: Stage,
        /// What went wrong
        #[source]
        source: Box<WipeError>,
    },

    /// Invalid programmatic configuration.
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(browser_wipe::config::error),
        help("Check the required configuration parameters.")
    )]
    ConfigError(
        /// Description of the configuration error
        String,
    ),
}

impl WipeError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            WipeError::MissingProfileName => 1,
            WipeError::UnsupportedBrowser(_) => 2,
            WipeError::HomeDirUnavailable
            | WipeError::ProfileRegistryMissing(_)
            | WipeError::ProfileRegistryParse { .. }
            | WipeError::ProfileNotFound { .. } => 3,
            WipeError::InvalidSizeMode(_) => 4,
            WipeError::NoProfile => 40,
            WipeError::StageFailed { stage, .. } => stage.exit_code(),
            _ => EXIT_GENERAL_FAILURE,
        }
    }

    /// Statistics of the interrupted cleanup, if this error (or the error it
    /// wraps) carries them.
    pub fn partial_stats(&self) -> Option<&CleanupStats> {
        match self {
            WipeError::CleanupAborted { stats, .. } => Some(stats),
            WipeError::StageFailed { source, .. } => source.partial_stats(),
            _ => None,
        }
    }
}

/// The stages of a browser profile wipe, each with its own exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Removing the profile cache directory
    ClearCache,
    /// Removing non-excepted profile data
    EraseProfile,
    /// Removing extension log junk
    ClearExtensions,
}

impl Stage {
    /// Process exit code reported when this stage fails.
    pub fn exit_code(self) -> u8 {
        match self {
            Stage::ClearCache => 50,
            Stage::EraseProfile => 60,
            Stage::ClearExtensions => 70,
        }
    }

    /// Wrap `source` as a failure of this stage.
    pub fn fail(self, source: WipeError) -> WipeError {
        WipeError::StageFailed {
            stage: self,
            source: Box::new(source),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ClearCache => "Cache clearing",
            Stage::EraseProfile => "Profile erasure",
            Stage::ClearExtensions => "Extension cleanup",
        };
        f.write_str(name)
    }
}

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, WipeError>;
