//! Implementation of the browser-wipe commands.
//!
//! `mod.rs` validates the command line and dispatches; the command logic
//! lives in `scan` and `wipe`.

use std::sync::Arc;

use crate::browsers::{Browser, CleanerSettings};
use crate::cli::Cli;
use crate::error::{Result, WipeError};
use crate::fs::MemoryFs;
use crate::size::SizeMode;

pub(crate) mod scan;
pub(crate) mod wipe;

pub use scan::{ScanReport, scan};
pub use wipe::{Wipe, WipeBuilder};


/// Execute the command described by the parsed CLI arguments.
pub fn execute(cli: &Cli) -> Result<()> {
    execute_with_vfs(cli, None)
}

/// Execute against an in-memory filesystem instead of the disk when `vfs` is
/// given.
pub fn execute_with_vfs(cli: &Cli, vfs: Option<Arc<MemoryFs>>) -> Result<()> {
    let profile = match cli.name() {
        Some(name) if !name.is_empty() => Some(name),
        _ if cli.scan() => None,
        _ => return Err(WipeError::MissingProfileName),
    };
    let browser: Browser = cli.browser().parse()?;
    let size_mode: SizeMode = cli.size().parse()?;

    let log = cli.logger();
    let settings = CleanerSettings {
        size_mode,
        dry_run: cli.dry(),
        log: log.clone(),
        data_dir: cli.data_dir(),
        cache_dir: cli.cache_dir(),
        vfs,
    };

    if cli.scan() {
        scan(browser, &settings)?;
        return Ok(());
    }

    Wipe::builder()
        .browser(browser)
        .profile(profile.unwrap_or_default())
        .do_cache(cli.do_cache())
        .do_profile(cli.do_profile())
        .settings(settings)
        .build()
        .run()?;

    log.info("DONE!!!");
    Ok(())
}
