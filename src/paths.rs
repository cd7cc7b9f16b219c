//! Home directory helpers.

use std::path::{Path, PathBuf};

use crate::error::{Result, WipeError};

/// The current user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    home::home_dir()
        .filter(|home| !home.as_os_str().is_empty())
        .ok_or(WipeError::HomeDirUnavailable)
}

/// `rel` resolved underneath the home directory.
pub fn at_home(rel: impl AsRef<Path>) -> Result<PathBuf> {
    Ok(home_dir()?.join(rel))
}

/// Display form of `path` with the home directory shown as `~`.
pub fn from_home(path: &Path) -> String {
    match home_dir() {
        Ok(home) => tildify(path, &home),
        Err(_) => path.display().to_string(),
    }
}

/// `%LOCALAPPDATA%`, falling back to `~\AppData\Local`.
#[cfg(windows)]
pub fn local_app_data() -> Result<PathBuf> {
    match std::env::var_os("LOCALAPPDATA") {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => at_home(Path::new("AppData").join("Local")),
    }
}

/// `%APPDATA%`, falling back to `~\AppData\Roaming`.
#[cfg(windows)]
pub fn roaming_app_data() -> Result<PathBuf> {
    match std::env::var_os("APPDATA") {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => at_home(Path::new("AppData").join("Roaming")),
    }
}

fn tildify(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~{}{}", std::path::MAIN_SEPARATOR, rest.display()),
        Err(_) => path.display().to_string(),
    }
}
