//! Conditional logging.
//!
//! A [`Logger`] is handed to every component at construction time. Each
//! component derives its own named child with [`Logger::inherit_as`], so
//! diagnostic lines say which component produced them while the enabled and
//! quiet switches flow down from the command line.

use std::borrow::Cow;
use std::fmt::Display;

#[derive(Clone, Debug)]
pub struct Logger {
    enabled: bool,
    quiet: bool,
    prefix: Cow<'static, str>,
}

impl Logger {
    pub fn new(enabled: bool, prefix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            enabled,
            quiet: false,
            prefix: prefix.into(),
        }
    }

    /// A logger that prints nothing at all.
    pub fn silent() -> Self {
        Self::new(false, "").with_quiet(true)
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// A new logger with the same switches but a different prefix.
    pub fn inherit_as(&self, prefix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            enabled: self.enabled,
            quiet: self.quiet,
            prefix: prefix.into(),
        }
    }

    /// User-facing progress output.
    pub fn info(&self, message: impl Display) {
        if !self.quiet {
            eprintln!("{message}");
        }
    }

    pub fn warn(&self, message: impl Display) {
        if !self.quiet {
            eprintln!("Warning: {message}");
        }
    }

    /// Diagnostic output, only shown when logging was enabled.
    pub fn debug(&self, message: impl Display) {
        if self.enabled && !self.quiet {
            eprintln!("{} {message}", self.prefix);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(false, "Main")
    }
}
