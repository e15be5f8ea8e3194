//! Load and save options

use serde::{Deserialize, Serialize};

/// Options applied while reading a `.env` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Accept keys declared without a value; they load as `Value::Null`.
    pub accept_empty: bool,
    /// Cast values that carry a type annotation. When false every value
    /// stays a string, though annotations are still checked syntactically.
    pub auto_cast: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            accept_empty: false,
            auto_cast: true,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accept_empty(mut self, accept_empty: bool) -> Self {
        self.accept_empty = accept_empty;
        self
    }

    pub fn with_auto_cast(mut self, auto_cast: bool) -> Self {
        self.auto_cast = auto_cast;
        self
    }

    /// Read `ENVIST_ACCEPT_EMPTY` and `ENVIST_AUTO_CAST` from the process
    /// environment, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`LoadOptions::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            accept_empty: lookup("ENVIST_ACCEPT_EMPTY")
                .map(|s| parse_flag(&s))
                .unwrap_or(defaults.accept_empty),
            auto_cast: lookup("ENVIST_AUTO_CAST")
                .map(|s| parse_flag(&s))
                .unwrap_or(defaults.auto_cast),
        }
    }
}

/// Formatting of a saved file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// Write `KEY = value` instead of `KEY=value`.
    pub pretty: bool,
    /// Write keys in lexicographic order instead of insertion order.
    pub sort_keys: bool,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }
}

pub(crate) fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("true") || value == "1"
}
