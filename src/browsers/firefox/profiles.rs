//! Firefox's `profiles.ini` registry.
//!
//! Firefox names its profile directories `<random>.<name>` and records the
//! mapping from profile name to directory in `profiles.ini`:
//!
//! ```ini
//! [Profile0]
//! Name=default-esr
//! IsRelative=1
//! Path=k2x9v1ab.default-esr
//! Default=1
//! ```
//!
//! Section and key names are matched case-insensitively and profile names
//! are normalized to lowercase.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, WipeError};
use crate::fs::{FileSystem, TriState};

pub const PROFILES_INI: &str = "profiles.ini";

/// One `[Profile*]` section
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirefoxProfile {
    /// Lowercased profile name
    pub name: String,
    /// Profile directory, relative to the data root unless `is_relative` is
    /// false
    pub path: String,
    pub is_relative: bool,
    pub is_default: bool,
}

impl FirefoxProfile {
    /// The profile's data directory below `data_root`.
    pub fn data_dir(&self, data_root: &Path) -> PathBuf {
        if self.is_relative {
            data_root.join(&self.path)
        } else {
            PathBuf::from(&self.path)
        }
    }

    /// The profile's cache directory below `cache_root`.
    ///
    /// Absolute profiles still keep their cache under the cache root, in a
    /// directory named like the profile directory.
    pub fn cache_dir(&self, cache_root: &Path) -> PathBuf {
        if self.is_relative {
            return cache_root.join(&self.path);
        }
        match Path::new(&self.path).file_name() {
            Some(dir_name) => cache_root.join(dir_name),
            None => cache_root.to_path_buf(),
        }
    }
}

impl fmt::Display for FirefoxProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- {:>15} {:<30} Default:{:<5}",
            format!("{:?}", self.name),
            self.path,
            self.is_default
        )
    }
}

/// All profiles listed in a `profiles.ini`, keyed by lowercased name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, FirefoxProfile>,
}

impl ProfileRegistry {
    /// Read `profiles.ini` from the Firefox data root on `fs`.
    pub fn load(fs: &dyn FileSystem, data_root: &Path) -> Result<Self> {
        let ini = data_root.join(PROFILES_INI);
        if fs.is_file(&ini) != TriState::Yes {
            return Err(WipeError::ProfileRegistryMissing(ini));
        }

        let text = fs
            .read_to_string(&ini)
            .map_err(|source| WipeError::IoError {
                path: ini.clone(),
                source,
            })?;
        Self::parse(&ini, &text)
    }

    /// Parse registry text. `origin` is only used in error messages.
    pub fn parse(origin: &Path, text: &str) -> Result<Self> {
        let mut sections: Vec<(String, BTreeMap<String, String>)> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            let parse_error = |message: &str| WipeError::ProfileRegistryParse {
                path: origin.to_path_buf(),
                line: index + 1,
                message: message.to_string(),
            };

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| parse_error("unterminated section header"))?;
                sections.push((name.trim().to_lowercase(), BTreeMap::new()));
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| parse_error("expected key=value"))?;
            // Keys before the first section header are ignored
            if let Some((_, keys)) = sections.last_mut() {
                keys.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
        }

        let profiles = sections
            .into_iter()
            .filter(|(section, _)| section.starts_with("profile"))
            .filter_map(|(_, keys)| {
                let name = keys.get("name")?.to_lowercase();
                let path = keys.get("path")?.clone();
                let profile = FirefoxProfile {
                    is_relative: keys.get("isrelative").is_none_or(|v| parse_bool(v)),
                    is_default: keys.get("default").is_some_and(|v| parse_bool(v)),
                    name: name.clone(),
                    path,
                };
                Some((name, profile))
            })
            .collect();

        Ok(Self { profiles })
    }

    /// Look up a profile by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&FirefoxProfile> {
        self.profiles.get(&name.trim().to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FirefoxProfile> {
        self.profiles.values()
    }

    pub fn default_profile(&self) -> Option<&FirefoxProfile> {
        self.iter().find(|p| p.is_default)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
