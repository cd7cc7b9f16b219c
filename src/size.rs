//! Byte count formatting.
//!
//! Sizes are reported in one of three [`SizeMode`]s: the plain number with
//! thousands separators, decimal SI units (1 kB = 1000 B) or binary IEC units
//! (1 KiB = 1024 B).

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WipeError};

/// How byte counts are displayed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SizeMode {
    /// Full numeric size with thousands separators
    #[default]
    Std,
    /// International System: 1 kB = 1000 B
    Si,
    /// Binary system: 1 KiB = 1024 B
    Iec,
}

impl SizeMode {
    pub const ALL: [SizeMode; 3] = [SizeMode::Std, SizeMode::Si, SizeMode::Iec];

    /// The name accepted on the command line.
    pub fn short_name(self) -> &'static str {
        match self {
            SizeMode::Std => "Std",
            SizeMode::Si => "SI",
            SizeMode::Iec => "IEC",
        }
    }

    /// Format `bytes` in this mode.
    pub fn format(self, bytes: u64) -> String {
        match self {
            SizeMode::Std => add_thousands(bytes, ','),
            SizeMode::Si => byte_count_si(bytes),
            SizeMode::Iec => byte_count_iec(bytes),
        }
    }
}

impl fmt::Display for SizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SizeMode::Std => "Standard",
            SizeMode::Si => "International",
            SizeMode::Iec => "Binary",
        };
        f.write_str(name)
    }
}

impl FromStr for SizeMode {
    type Err = WipeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        SizeMode::ALL
            .into_iter()
            .find(|mode| mode.short_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| WipeError::InvalidSizeMode(s.to_string()))
    }
}

/// Byte count in the International System (1 kB = 1000 B)
pub fn byte_count_si(bytes: u64) -> String {
    scaled(bytes, 1000, b"kMGTPE", "B")
}

/// Byte count in the IEC binary system (1 KiB = 1024 B)
pub fn byte_count_iec(bytes: u64) -> String {
    scaled(bytes, 1024, b"KMGTPE", "iB")
}

fn scaled(bytes: u64, unit: u64, prefixes: &[u8], suffix: &str) -> String {
    if bytes < unit {
        return format!("{bytes} B");
    }

    let mut div = unit;
    let mut exp = 0;
    let mut n = bytes / unit;
    while n >= unit {
        div *= unit;
        exp += 1;
        n /= unit;
    }

    format!(
        "{:.1} {}{}",
        bytes as f64 / div as f64,
        prefixes[exp] as char,
        suffix
    )
}

/// Decimal representation of `n` with `sep` between groups of three digits
pub fn add_thousands(n: u64, sep: char) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }

    out
}
