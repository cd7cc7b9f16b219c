#![allow(dead_code)]

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::{env, fs};

use tempfile::TempDir;

/// Global mutex to ensure only one test manipulates HOME at a time.
static HOME_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// RAII guard that redirects HOME to a temporary directory.
///
/// While the guard is alive, every browser location derived from the home
/// directory points into the sandbox, so tests cannot touch the developer's
/// real browser profiles.
pub struct TempHomeGuard {
    _lock: MutexGuard<'static, ()>,
    temp_home: TempDir,
    prev_home: Option<OsString>,
    #[cfg(windows)]
    prev_userprofile: Option<OsString>,
    #[cfg(windows)]
    prev_localappdata: Option<OsString>,
    #[cfg(windows)]
    prev_appdata: Option<OsString>,
}

impl TempHomeGuard {
    /// Create a new guard with a fresh temporary home directory.
    pub fn new() -> Self {
        let lock = HOME_MUTEX
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let temp_home = TempDir::new().expect("failed to create temporary HOME");
        let home_path = temp_home.path();

        let prev_home = env::var_os("HOME");
        #[cfg(windows)]
        let prev_userprofile = env::var_os("USERPROFILE");
        #[cfg(windows)]
        let prev_localappdata = env::var_os("LOCALAPPDATA");
        #[cfg(windows)]
        let prev_appdata = env::var_os("APPDATA");

        // SAFETY: we hold HOME_MUTEX, ensuring no other thread mutates the
        // environment while we redirect HOME for the test.
        unsafe {
            env::set_var("HOME", home_path);
            #[cfg(windows)]
            {
                env::set_var("USERPROFILE", home_path);
                env::set_var("LOCALAPPDATA", home_path.join("AppData").join("Local"));
                env::set_var("APPDATA", home_path.join("AppData").join("Roaming"));
            }
        }

        Self {
            _lock: lock,
            temp_home,
            prev_home,
            #[cfg(windows)]
            prev_userprofile,
            #[cfg(windows)]
            prev_localappdata,
            #[cfg(windows)]
            prev_appdata,
        }
    }

    /// Path to the temporary HOME directory.
    pub fn home(&self) -> &Path {
        self.temp_home.path()
    }
}

impl Drop for TempHomeGuard {
    fn drop(&mut self) {
        // SAFETY: guarded by HOME_MUTEX; we restore the environment to its
        // previous state before releasing the lock.
        unsafe {
            restore("HOME", self.prev_home.as_ref());
            #[cfg(windows)]
            {
                restore("USERPROFILE", self.prev_userprofile.as_ref());
                restore("LOCALAPPDATA", self.prev_localappdata.as_ref());
                restore("APPDATA", self.prev_appdata.as_ref());
            }
        }
        // temp_home drops here, cleaning up the directory
    }
}

/// # Safety
///
/// The caller must hold `HOME_MUTEX`.
unsafe fn restore(key: &str, prev: Option<&OsString>) {
    // SAFETY: see the function contract.
    unsafe {
        match prev {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}

/// Write `len` bytes to `root/rel`, creating parent directories.
pub fn put(root: &Path, rel: &str, len: usize) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, vec![b'x'; len]).unwrap();
    path
}

/// Data and cache roots of a browser fixture
pub struct BrowserDirs {
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
}

/// Bytes in the Chromium fixture's profile cache
pub const CHROMIUM_CACHE_BYTES: u64 = 10_000;
/// Bytes of non-excepted Chromium profile data
pub const CHROMIUM_DATA_BYTES: u64 = 1_800;
/// Bytes of Chromium extension logs
pub const CHROMIUM_JUNK_BYTES: u64 = 100;

/// A Chromium installation with one profile below `base`.
pub fn chromium_fixture(base: &Path, profile: &str) -> BrowserDirs {
    let data_dir = base.join("chromium-data");
    let cache_dir = base.join("chromium-cache");

    for dir in ["System Profile", "Default", "Avatars", "Safe Browsing"] {
        fs::create_dir_all(data_dir.join(dir)).unwrap();
    }

    let user = data_dir.join(profile);
    fs::create_dir_all(user.join("Extension Rules")).unwrap();
    put(&user, "Preferences", 100);
    put(&user, "Bookmarks", 200);
    put(&user, "History", 1000);
    put(&user, "Cookies", 500);
    put(&user, "Sessions/Session_13370", 300);
    put(&user, "Extension State/LOG", 40);
    put(&user, "Extension State/000001.log", 60);
    put(&user, "Extension State/CURRENT", 16);

    let cache = cache_dir.join(profile);
    put(&cache, "Cache/Cache_Data/data_0", 8000);
    put(&cache, "Code Cache/js/index", 2000);

    BrowserDirs {
        data_dir,
        cache_dir,
    }
}

/// Directory of the Firefox fixture's default profile
pub const FIREFOX_PROFILE_DIR: &str = "abcd1234.default-release";
/// Bytes in the Firefox fixture's profile cache
pub const FIREFOX_CACHE_BYTES: u64 = 6_000;
/// Bytes of non-excepted Firefox profile data
pub const FIREFOX_DATA_BYTES: u64 = 1_200;

/// A Firefox installation with a `default-release` profile below `base`.
pub fn firefox_fixture(base: &Path) -> BrowserDirs {
    let data_dir = base.join("firefox-data");
    let cache_dir = base.join("firefox-cache");

    fs::create_dir_all(data_dir.join("Crash Reports")).unwrap();
    put(&data_dir, "installs.ini", 64);
    fs::write(
        data_dir.join("profiles.ini"),
        format!(
            "[Profile0]\nName=default-release\nIsRelative=1\nPath={FIREFOX_PROFILE_DIR}\nDefault=1\n\n[General]\nStartWithLastProfile=1\nVersion=2\n"
        ),
    )
    .unwrap();

    let user = data_dir.join(FIREFOX_PROFILE_DIR);
    fs::create_dir_all(user.join("bookmarkbackups")).unwrap();
    put(&user, "extensions/uBlock0@raymondhill.net.xpi", 400);
    put(&user, "places.sqlite", 300);
    put(&user, "cookies.sqlite", 700);
    put(&user, "prefs.js", 50);
    put(&user, "storage/default/ls/data.sqlite", 450);

    let cache = cache_dir.join(FIREFOX_PROFILE_DIR);
    put(&cache, "cache2/entries/0A1B2C", 5000);
    put(&cache, "startupCache/scriptCache.bin", 1000);

    BrowserDirs {
        data_dir,
        cache_dir,
    }
}
