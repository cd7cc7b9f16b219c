use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::*;
use crate::error::Stage;
use crate::fs::MemoryFs;

fn home() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Users\u")
    } else {
        PathBuf::from("/home/u")
    }
}

fn put(vfs: &MemoryFs, path: &Path, len: usize) {
    if let Some(parent) = path.parent() {
        vfs.create_dir_all(parent, 0o755).unwrap();
    }
    vfs.write_file(path, &vec![b'x'; len], 0o644).unwrap();
}

fn mkdir(vfs: &MemoryFs, path: &Path) {
    vfs.create_dir_all(path, 0o755).unwrap();
}

fn settings(vfs: &Arc<MemoryFs>, data: &Path, cache: &Path) -> CleanerSettings {
    CleanerSettings {
        log: Logger::silent(),
        data_dir: Some(data.to_path_buf()),
        cache_dir: Some(cache.to_path_buf()),
        vfs: Some(Arc::clone(vfs)),
        ..CleanerSettings::default()
    }
}

mod browser {
    use super::*;

    #[test]
    fn test_parse_browser_names() {
        assert_eq!("chromium".parse::<Browser>().unwrap(), Browser::Chromium);
        assert_eq!(" FireFox ".parse::<Browser>().unwrap(), Browser::Firefox);

        let err = "opera".parse::<Browser>().unwrap_err();
        assert!(matches!(&err, WipeError::UnsupportedBrowser(name) if name == "opera"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_display_matches_name() {
        for browser in Browser::ALL {
            assert_eq!(browser.to_string(), browser.name());
        }
    }

    #[test]
    fn test_compile_patterns_reports_bad_pattern() {
        assert_eq!(compile_patterns(&[r"^.*\.log$"]).unwrap().len(), 1);
        let err = compile_patterns(&["(unclosed"]).unwrap_err();
        assert!(matches!(err, WipeError::InvalidPattern { pattern, .. } if pattern == "(unclosed"));
    }
}

mod chromium {
    use super::*;

    fn data_dir() -> PathBuf {
        home().join(".config").join("chromium")
    }

    fn cache_dir() -> PathBuf {
        home().join(".cache").join("chromium")
    }

    /// A `Default` profile with 1500 B of wipeable data, 50 B of extension
    /// logs and a 5000 B cache
    fn chromium_vfs() -> Arc<MemoryFs> {
        let vfs = Arc::new(MemoryFs::new());
        let data = data_dir();
        for dir in ["System Profile", "Avatars", "Safe Browsing"] {
            mkdir(&vfs, &data.join(dir));
        }

        let profile = data.join("Default");
        mkdir(&vfs, &profile.join("Extension Rules"));
        put(&vfs, &profile.join("Preferences"), 120);
        put(&vfs, &profile.join("Bookmarks"), 80);
        put(&vfs, &profile.join("History"), 500);
        put(&vfs, &profile.join("Session Storage").join("000001.ldb"), 1000);
        put(&vfs, &profile.join("Extension State").join("LOG"), 30);
        put(&vfs, &profile.join("Extension State").join("000003.log"), 20);
        put(&vfs, &profile.join("Extension State").join("MANIFEST-000001"), 10);

        let cache = cache_dir().join("Default");
        put(&vfs, &cache.join("Cache").join("Cache_Data").join("data_0"), 4000);
        put(&vfs, &cache.join("Code Cache").join("js").join("index"), 1000);

        // Looks like a profile directory but lacks the markers
        put(&vfs, &data.join("Profile 7").join("Preferences"), 10);
        vfs
    }

    fn cleaner(vfs: &Arc<MemoryFs>, profile: &str) -> ChromiumCleaner {
        ChromiumCleaner::builder()
            .settings(settings(vfs, &data_dir(), &cache_dir()))
            .profile(profile)
            .build()
            .unwrap()
    }

    #[test]
    fn test_identification() {
        let vfs = chromium_vfs();
        let cleaner = cleaner(&vfs, "Default");

        assert!(cleaner.identify_app_data_root());
        assert!(cleaner.identify_profile_data("Default"));
        assert!(cleaner.identify_profile_cache("Default"));
        assert!(!cleaner.identify_profile_data("Profile 7"));
        assert!(!cleaner.identify_profile_cache("Profile 7"));
        assert_eq!(cleaner.find_profile_names().unwrap(), ["Default"]);
    }

    #[test]
    fn test_clear_profile_removes_cache_data_and_junk() {
        let vfs = chromium_vfs();
        let mut cleaner = cleaner(&vfs, "Default");

        let cleaned = cleaner.clear_profile(true, true).unwrap();
        assert_eq!(cleaned, 5000 + 1500 + 50);
        assert_eq!(cleaner.cleaned_size(), cleaned);
        assert_eq!(cleaner.to_string(), "ChromiumCleaner \"Default\" cleaned 6,550");

        let profile = cleaner.profile_root();
        assert!(!vfs.exists(&cleaner.cache_root()));
        assert!(!vfs.exists(&profile.join("History")));
        assert!(!vfs.exists(&profile.join("Session Storage")));
        assert!(!vfs.exists(&profile.join("Extension State").join("LOG")));
        assert!(!vfs.exists(&profile.join("Extension State").join("000003.log")));
        assert!(vfs.exists(&profile.join("Extension State").join("MANIFEST-000001")));
        assert_eq!(vfs.read_file(&profile.join("Bookmarks")).unwrap().len(), 80);
        assert!(vfs.exists(&profile.join("Preferences")));
    }

    #[test]
    fn test_cache_only() {
        let vfs = chromium_vfs();
        let mut cleaner = cleaner(&vfs, "Default");

        assert_eq!(cleaner.clear_profile(true, false).unwrap(), 5000);
        assert!(vfs.exists(&cleaner.profile_root().join("History")));
    }

    #[test]
    fn test_profile_name_is_trimmed() {
        let vfs = chromium_vfs();
        let cleaner = cleaner(&vfs, " \tDefault ");
        assert_eq!(cleaner.profile_name(), "Default");
    }

    #[test]
    fn test_empty_profile_is_refused() {
        let vfs = chromium_vfs();
        let mut cleaner = cleaner(&vfs, "  ");

        let err = cleaner.clear_profile(true, true).unwrap_err();
        assert!(matches!(err, WipeError::NoProfile));
        assert_eq!(err.exit_code(), 40);
    }

    #[test]
    fn test_unrecognised_cache_fails_stage() {
        let vfs = chromium_vfs();
        let mut cleaner = cleaner(&vfs, "Profile 7");

        let err = cleaner.clear_profile(true, false).unwrap_err();
        assert!(matches!(
            err,
            WipeError::StageFailed {
                stage: Stage::ClearCache,
                ..
            }
        ));
        assert_eq!(err.exit_code(), 50);
        assert_eq!(cleaner.cleaned_size(), 0);
    }

    #[test]
    fn test_unrecognised_profile_fails_stage() {
        let vfs = chromium_vfs();
        let mut cleaner = cleaner(&vfs, "Profile 7");

        let err = cleaner.clear_profile(false, true).unwrap_err();
        assert_eq!(err.exit_code(), 60);
        assert!(vfs.exists(&data_dir().join("Profile 7").join("Preferences")));
    }

    #[test]
    fn test_missing_data_dir_has_no_profiles() {
        let vfs = Arc::new(MemoryFs::new());
        let cleaner = cleaner(&vfs, "");
        assert!(cleaner.find_profile_names().unwrap().is_empty());
        assert!(!cleaner.identify_app_data_root());
        assert!(!cleaner.tell());
    }

    #[test]
    fn test_tell_reports_existing_dirs() {
        let vfs = chromium_vfs();
        assert!(cleaner(&vfs, "").tell());
    }

    /// One `User Data` root for data and cache, with the caches inside the
    /// profile: 4000 B of cache and 700 B of wipeable data
    fn shared_root_vfs(root: &Path) -> Arc<MemoryFs> {
        let vfs = Arc::new(MemoryFs::new());
        let profile = root.join("Default");
        mkdir(&vfs, &profile.join("Extension Rules"));
        put(&vfs, &profile.join("Bookmarks"), 80);
        put(&vfs, &profile.join("Preferences"), 120);
        put(&vfs, &profile.join("Extensions").join("abc").join("manifest.json"), 60);
        put(&vfs, &profile.join("Cache").join("Cache_Data").join("data_0"), 3000);
        put(&vfs, &profile.join("Code Cache").join("js").join("index"), 700);
        put(&vfs, &profile.join("GPUCache").join("data_1"), 300);
        put(&vfs, &profile.join("History"), 500);
        put(&vfs, &profile.join("Cookies"), 200);
        vfs
    }

    #[test]
    fn test_shared_root_keeps_exceptions() {
        let root = home().join("AppData").join("Local").join("Chromium").join("User Data");
        let vfs = shared_root_vfs(&root);
        let mut cleaner = ChromiumCleaner::builder()
            .settings(settings(&vfs, &root, &root))
            .profile("Default")
            .build()
            .unwrap();
        assert!(cleaner.has_inline_cache());

        assert_eq!(cleaner.clear_profile(true, true).unwrap(), 4700);

        let profile = root.join("Default");
        for kept in ["Bookmarks", "Preferences", "Extension Rules", "Extensions"] {
            assert!(vfs.exists(&profile.join(kept)), "{kept} should survive");
        }
        for removed in ["Cache", "Code Cache", "GPUCache", "History", "Cookies"] {
            assert!(!vfs.exists(&profile.join(removed)), "{removed} should be gone");
        }
    }

    #[test]
    fn test_shared_root_cache_only() {
        let root = home().join("chromium");
        let vfs = shared_root_vfs(&root);
        let mut cleaner = ChromiumCleaner::builder()
            .settings(settings(&vfs, &root, &root))
            .profile("Default")
            .build()
            .unwrap();

        assert_eq!(cleaner.clear_profile(true, false).unwrap(), 4000);
        let profile = root.join("Default");
        assert!(vfs.exists(&profile.join("History")));
        assert!(vfs.exists(&profile.join("Bookmarks")));
        assert!(!vfs.exists(&profile.join("Cache")));
    }

    #[test]
    fn test_cache_nested_in_profile_is_refused() {
        let vfs = chromium_vfs();
        let nested = data_dir().join("Default");
        mkdir(&vfs, &nested.join("Default").join("Cache"));
        mkdir(&vfs, &nested.join("Default").join("Code Cache"));
        let mut cleaner = ChromiumCleaner::builder()
            .settings(settings(&vfs, &data_dir(), &nested))
            .profile("Default")
            .build()
            .unwrap();
        assert!(!cleaner.has_inline_cache());

        let err = cleaner.clear_profile(true, true).unwrap_err();
        assert_eq!(err.exit_code(), 50);
        assert!(vfs.exists(&nested.join("Default").join("Cache")));
        assert!(vfs.exists(&nested.join("Bookmarks")));
    }
}

mod firefox {
    use super::*;
    use crate::browsers::firefox::{FirefoxCleanerBuilder, PROFILES_INI};

    const PROFILES: &str = "\
[Profile1]
Name=work
IsRelative=1
Path=zz81mmq0.work

[Profile0]
Name=default-esr
IsRelative=1
Path=k2x9v1ab.default-esr
Default=1

[General]
StartWithLastProfile=1
";

    fn data_dir() -> PathBuf {
        home().join(".mozilla").join("firefox")
    }

    fn cache_dir() -> PathBuf {
        home().join(".cache").join("mozilla").join("firefox")
    }

    /// `default-esr` with 1700 B of wipeable data and a 4000 B cache
    fn firefox_vfs() -> Arc<MemoryFs> {
        let vfs = Arc::new(MemoryFs::new());
        let data = data_dir();
        put(&vfs, &data.join("installs.ini"), 40);
        mkdir(&vfs, &data.join("Crash Reports"));
        vfs.write_file(&data.join(PROFILES_INI), PROFILES.as_bytes(), 0o644)
            .unwrap();

        let profile = data.join("k2x9v1ab.default-esr");
        mkdir(&vfs, &profile.join("bookmarkbackups"));
        put(&vfs, &profile.join("extensions").join("ublock@raymondhill.net.xpi"), 900);
        put(&vfs, &profile.join("places.sqlite"), 300);
        put(&vfs, &profile.join("cookies.sqlite"), 700);
        put(&vfs, &profile.join("sessionstore.jsonlz4"), 200);
        put(&vfs, &profile.join("storage").join("default").join("idb"), 800);

        let cache = cache_dir().join("k2x9v1ab.default-esr");
        put(&vfs, &cache.join("cache2").join("entries").join("A1B2"), 3000);
        put(&vfs, &cache.join("startupCache").join("scriptCache.bin"), 1000);

        mkdir(&vfs, &data.join("zz81mmq0.work"));
        vfs
    }

    fn builder(vfs: &Arc<MemoryFs>) -> FirefoxCleanerBuilder {
        FirefoxCleaner::builder().settings(settings(vfs, &data_dir(), &cache_dir()))
    }

    #[test]
    fn test_profile_resolved_through_registry() {
        let vfs = firefox_vfs();
        let cleaner = builder(&vfs).profile("Default-ESR").build().unwrap();

        assert_eq!(cleaner.profile_name(), "default-esr");
        assert!(cleaner.identify_app_data_root());
        assert!(cleaner.identify_profile_data("default-esr"));
        assert!(cleaner.identify_profile_cache("default-esr"));
        assert!(!cleaner.identify_profile_data("work"));
        assert!(!cleaner.identify_profile_data("unknown"));
        assert_eq!(
            cleaner.find_profile_names().unwrap(),
            ["default-esr (default)", "work"]
        );
    }

    #[test]
    fn test_clear_profile_recreates_cache() {
        let vfs = firefox_vfs();
        let mut cleaner = builder(&vfs).profile("default-esr").build().unwrap();

        let cleaned = cleaner.clear_profile(true, true).unwrap();
        assert_eq!(cleaned, 4000 + 1700);

        let cache = cache_dir().join("k2x9v1ab.default-esr");
        assert!(vfs.is_dir(&cache));
        assert!(!vfs.exists(&cache.join("cache2")));
        assert_eq!(vfs.mode(&cache).unwrap(), 0o700);

        let profile = data_dir().join("k2x9v1ab.default-esr");
        assert!(vfs.exists(&profile.join("places.sqlite")));
        assert!(vfs.exists(&profile.join("bookmarkbackups")));
        assert!(vfs.exists(&profile.join("extensions").join("ublock@raymondhill.net.xpi")));
        assert!(!vfs.exists(&profile.join("cookies.sqlite")));
        assert!(!vfs.exists(&profile.join("storage")));
    }

    #[test]
    fn test_unknown_profile_fails_construction() {
        let vfs = firefox_vfs();
        let err = builder(&vfs).profile("nope").build().err().unwrap();
        assert!(matches!(
            &err,
            WipeError::ProfileNotFound { profile, .. } if profile == "nope"
        ));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_missing_registry() {
        let vfs = Arc::new(MemoryFs::new());
        let err = builder(&vfs).profile("default-esr").build().err().unwrap();
        assert!(matches!(err, WipeError::ProfileRegistryMissing(_)));
        assert_eq!(err.exit_code(), 3);

        // Scanning still works without one
        let cleaner = builder(&vfs).build().unwrap();
        assert!(!cleaner.identify_app_data_root());
        assert!(matches!(
            cleaner.find_profile_names(),
            Err(WipeError::ProfileRegistryMissing(_))
        ));
    }

    #[test]
    fn test_scan_only_cleaner_cannot_clear() {
        let vfs = firefox_vfs();
        let mut cleaner = builder(&vfs).build().unwrap();
        assert_eq!(cleaner.profile_name(), "");

        let err = cleaner.clear_profile(true, true).unwrap_err();
        assert!(matches!(err, WipeError::InvalidOperation(_)));
        assert!(vfs.exists(&data_dir().join("k2x9v1ab.default-esr").join("cookies.sqlite")));
    }

    #[test]
    fn test_unrecognised_profile_fails_stage() {
        let vfs = firefox_vfs();
        let mut cleaner = builder(&vfs).profile("work").build().unwrap();

        let err = cleaner.clear_profile(false, true).unwrap_err();
        assert_eq!(err.exit_code(), 60);
        let err = cleaner.clear_profile(true, false).unwrap_err();
        assert_eq!(err.exit_code(), 50);
    }

    #[test]
    fn test_cache_root_shared_with_data_is_refused() {
        let vfs = firefox_vfs();
        let profile = data_dir().join("k2x9v1ab.default-esr");
        mkdir(&vfs, &profile.join("cache2"));
        mkdir(&vfs, &profile.join("startupCache"));
        let mut cleaner = FirefoxCleaner::builder()
            .settings(settings(&vfs, &data_dir(), &data_dir()))
            .profile("default-esr")
            .build()
            .unwrap();

        let err = cleaner.clear_profile(true, true).unwrap_err();
        assert_eq!(err.exit_code(), 50);
        assert!(vfs.exists(&profile.join("places.sqlite")));
        assert!(vfs.exists(&profile.join("cookies.sqlite")));
    }
}

#[test]
fn test_cleaner_for_dispatches_by_browser() {
    let vfs = Arc::new(MemoryFs::new());
    let root = home();

    let cleaner = cleaner_for(
        Browser::Chromium,
        Some("Profile 1"),
        settings(&vfs, &root, &root),
    )
    .unwrap();
    assert_eq!(cleaner.browser(), Browser::Chromium);
    assert_eq!(cleaner.profile_name(), "Profile 1");

    let cleaner = cleaner_for(Browser::Firefox, None, settings(&vfs, &root, &root)).unwrap();
    assert_eq!(cleaner.browser(), Browser::Firefox);
    assert_eq!(cleaner.cleaned_size(), 0);
}
