//! Scan command: report which browsers and profiles are present.

use crate::browsers::{Browser, CleanerSettings, cleaner_for};
use crate::error::Result;

/// What a scan found for one browser
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanReport {
    pub browser: Browser,
    /// Both the data and the cache root exist
    pub dirs_present: bool,
    /// The data root identifies as this browser's
    pub installed: bool,
    pub profiles: Vec<String>,
}

/// Describe every supported browser. Nothing is deleted.
///
/// The directory overrides in `settings` only apply to `selected`, the other
/// browsers are looked up in their default locations.
pub fn scan(selected: Browser, settings: &CleanerSettings) -> Result<Vec<ScanReport>> {
    let log = &settings.log;
    let mut reports = Vec::with_capacity(Browser::ALL.len());

    for browser in Browser::ALL {
        let settings = if browser == selected {
            settings.clone()
        } else {
            CleanerSettings {
                data_dir: None,
                cache_dir: None,
                ..settings.clone()
            }
        };

        let cleaner = cleaner_for(browser, None, settings)?;
        let dirs_present = cleaner.tell();
        let installed = cleaner.identify_app_data_root();
        log.info(format!("\tInstalled: {installed}"));

        let profiles = match cleaner.find_profile_names() {
            Ok(names) => names,
            Err(e) => {
                log.debug(format!("no {browser} profiles: {e}"));
                Vec::new()
            }
        };
        if profiles.is_empty() {
            log.info("\tProfiles : none");
        } else {
            log.info(format!("\tProfiles : {}", profiles.join(", ")));
        }

        reports.push(ScanReport {
            browser,
            dirs_present,
            installed,
            profiles,
        });
    }

    Ok(reports)
}
