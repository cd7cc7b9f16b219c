//! # browser-wipe
//!
//! Removes privacy-sensitive and junk data from web browser profiles while
//! keeping what the user cares about: bookmarks, extensions and settings.
//!
//! ## Overview
//!
//! A browser profile is split in two places: a cache root that can be
//! deleted outright, and a data root whose top-level entries are removed
//! except for an allow-list of names. Every deletion goes through a
//! [`dry_run::DryRunner`], which dispatches to the real filesystem, to an
//! in-memory filesystem, or to a simulation that only reports what it would
//! do.
//!
//! ## Key Features
//!
//! - **Exception-aware cleanup**: [`cleaner::DirCleaner`] removes all
//!   immediate children of a root except an [`cleaner::ExceptionSet`]
//! - **Safe identification**: a directory is only cleaned after it has been
//!   recognised as the browser's cache or profile
//! - **Dry runs**: simulated runs read the real tree and report the same
//!   statistics a real run would produce, without touching anything
//! - **Virtual filesystem**: [`fs::MemoryFs`] and [`fs::mirror_tree`] for
//!   rehearsing a cleanup on a copy of a real tree
//! - **Chromium and Firefox** support, including Firefox's `profiles.ini`
//!
//! ## Architecture
//!
//! - [`cli`]: Command-line interface definitions using clap
//! - [`commands`]: The scan and wipe commands
//! - [`browsers`]: Per-browser locations, identification and cleanup stages
//! - [`cleaner`]: The exception-aware directory cleaner
//! - [`dry_run`]: Swappable filesystem action backends
//! - [`fs`]: Read-only filesystem views, sizing and mirroring
//! - [`size`]: Byte count formatting
//! - [`error`]: Error types and handling with thiserror + miette
//!
//! ## Library Usage
//!
//! ```no_run
//! use browser_wipe::cli::Cli;
//! use browser_wipe::commands;
//!
//! let cli = Cli::builder()
//!     .browser("chromium")
//!     .name("Profile 1")
//!     .dry(true)
//!     .build()?;
//!
//! commands::execute(&cli)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! The crate uses a combination of:
//! - `thiserror` for strongly-typed errors
//! - `miette` for rich diagnostic output in CLI
//!
//! Every error maps to a process exit code through
//! [`error::WipeError::exit_code`].

pub mod browsers;
pub mod cleaner;
pub mod cli;
pub mod commands;
pub mod dry_run;
pub mod error;
pub mod fs;
pub mod logging;
pub mod paths;
pub mod size;
