//! Wipe command: clear one browser profile.

use crate::browsers::{Browser, CleanerSettings, cleaner_for};
use crate::error::Result;
use crate::fs::dump_tree;

pub struct Wipe<'a> {
    browser: Browser,
    profile: &'a str,
    do_cache: bool,
    do_profile: bool,
    settings: CleanerSettings,
}

#[derive(Default)]
pub struct WipeBuilder<'a> {
    browser: Option<Browser>,
    profile: &'a str,
    do_cache: bool,
    do_profile: bool,
    settings: CleanerSettings,
}

impl<'a> WipeBuilder<'a> {
    pub fn new() -> Self {
        Self {
            browser: None,
            profile: "",
            do_cache: true,
            do_profile: true,
            settings: CleanerSettings::default(),
        }
    }

    pub fn browser(mut self, browser: Browser) -> Self {
        self.browser = Some(browser);
        self
    }

    pub fn profile(mut self, profile: &'a str) -> Self {
        self.profile = profile;
        self
    }

    pub fn do_cache(mut self, enabled: bool) -> Self {
        self.do_cache = enabled;
        self
    }

    pub fn do_profile(mut self, enabled: bool) -> Self {
        self.do_profile = enabled;
        self
    }

    pub fn settings(mut self, settings: CleanerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Wipe<'a> {
        Wipe {
            browser: self.browser.unwrap_or(Browser::Chromium),
            profile: self.profile,
            do_cache: self.do_cache,
            do_profile: self.do_profile,
            settings: self.settings,
        }
    }
}

impl<'a> Wipe<'a> {
    pub fn builder<'b>() -> WipeBuilder<'b> {
        WipeBuilder::new()
    }

    /// Clear the profile and print the cleaner's summary.
    ///
    /// Returns the bytes cleaned. On failure whatever was cleaned before the
    /// failing stage is reported before the error is returned.
    pub fn run(self) -> Result<u64> {
        let log = self.settings.log.clone();
        log.info(format!("Browser name  : {}", self.browser));
        log.info(format!("Profile name  : {}", self.profile));
        log.info(format!("Erase cache   : {}", self.do_cache));
        log.info(format!("Erase profile : {}", self.do_profile));
        log.info(format!("Dry run       : {}", self.settings.dry_run));
        log.info(format!("Logging enable: {}", log.is_enabled()));

        let size_mode = self.settings.size_mode;
        let rehearsal = self.settings.vfs.clone().map(|vfs| {
            let mut roots: Vec<_> = [&self.settings.data_dir, &self.settings.cache_dir]
                .into_iter()
                .flatten()
                .cloned()
                .collect();
            roots.dedup();
            (vfs, roots)
        });
        let mut cleaner = cleaner_for(self.browser, Some(self.profile), self.settings)?;

        match cleaner.clear_profile(self.do_cache, self.do_profile) {
            Ok(cleaned) => {
                if !log.quiet() {
                    println!("{cleaner}");
                }
                // What is left of the virtual tree after the rehearsal
                if let Some((vfs, roots)) = rehearsal {
                    for root in roots {
                        if let Err(e) = dump_tree(vfs.as_ref(), &root, &log) {
                            log.debug(format!("could not list {}: {e}", root.display()));
                        }
                    }
                }
                Ok(cleaned)
            }
            Err(e) => {
                let cleaned = cleaner.cleaned_size();
                if cleaned > 0 {
                    log.warn(format!(
                        "{} cleaned before the failure",
                        size_mode.format(cleaned)
                    ));
                }
                Err(e)
            }
        }
    }
}
