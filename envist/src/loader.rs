//! The `Envist` loader

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::path::{Path, PathBuf};

use envist_core::{
    is_valid_key, EnvBridge, EnvMap, EnvistError, EnvistResult, ParseError, ProcessEnv, Value,
};
use envist_dsl::{cast_str, cast_value, has_reference, parse_line, resolve, ParsedLine};

use crate::config::{LoadOptions, SaveOptions};
use crate::file::{filter_lines, read_lines};
use crate::persist::write_env;

/// File read when no path is given.
pub const DEFAULT_PATH: &str = ".env";

/// A typed view of one `.env` file.
///
/// Every stored value is mirrored, as a string, into the environment bridge
/// `E`. With the default [`ProcessEnv`] bridge that is the process
/// environment, which is shared by every thread: callers that load from
/// several threads must serialize access themselves.
#[derive(Debug)]
pub struct Envist<E: EnvBridge = ProcessEnv> {
    path: PathBuf,
    options: LoadOptions,
    env: EnvMap,
    bridge: E,
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

impl Envist<ProcessEnv> {
    /// Load [`DEFAULT_PATH`] with default options.
    pub fn new() -> EnvistResult<Self> {
        Self::open(DEFAULT_PATH)
    }

    /// Load `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> EnvistResult<Self> {
        Self::with_options(path, LoadOptions::default())
    }

    pub fn with_options(path: impl AsRef<Path>, options: LoadOptions) -> EnvistResult<Self> {
        Self::with_bridge(path, options, ProcessEnv)
    }
}

impl<E: EnvBridge> Envist<E> {
    /// Load `path`, mirroring values into `bridge` instead of the process
    /// environment.
    pub fn with_bridge(path: impl AsRef<Path>, options: LoadOptions, bridge: E) -> EnvistResult<Self> {
        let mut envist = Self {
            path: path.as_ref().to_path_buf(),
            options,
            env: EnvMap::new(),
            bridge,
        };
        envist.load()?;
        Ok(envist)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> LoadOptions {
        self.options
    }

    pub fn bridge(&self) -> &E {
        &self.bridge
    }

    pub fn into_bridge(self) -> E {
        self.bridge
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Two-pass load. Pass one validates every line and collects the raw
    /// values; pass two resolves references against that raw map and casts.
    /// Nothing is stored or mirrored unless every line succeeds.
    fn load(&mut self) -> EnvistResult<()> {
        let lines = filter_lines(read_lines(&self.path)?);

        let mut parsed: Vec<(usize, ParsedLine)> = Vec::with_capacity(lines.len());
        let mut raw: HashMap<String, String> = HashMap::with_capacity(lines.len());
        for line in &lines {
            let entry = parse_line(&line.text, self.options.accept_empty)
                .map_err(|e| EnvistError::from(e).at_line(line.number))?;
            tracing::debug!(line = line.number, key = %entry.key, "parsed line");
            raw.insert(entry.key.clone(), entry.raw_value.clone());
            parsed.push((line.number, entry));
        }

        let mut env = EnvMap::new();
        for (number, entry) in parsed {
            let value = self
                .materialize(&entry, &raw)
                .map_err(|e| e.for_key(&entry.key).at_line(number))?;
            env.insert(entry.key, value);
        }

        for (key, value) in env.iter() {
            self.bridge.set(key, &value.to_string());
        }
        self.env = env;

        tracing::info!(path = %self.path.display(), count = self.env.len(), "loaded env file");
        Ok(())
    }

    fn materialize(&self, entry: &ParsedLine, raw: &HashMap<String, String>) -> EnvistResult<Value> {
        let text = if has_reference(&entry.raw_value) {
            resolve(&entry.raw_value, raw, &self.bridge)?
        } else {
            entry.raw_value.clone()
        };

        match entry.type_annotation.as_deref() {
            Some(annotation) if self.options.auto_cast => Ok(cast_str(&text, annotation)?),
            _ if text.is_empty() && self.options.accept_empty => Ok(Value::Null),
            _ => Ok(Value::Str(text)),
        }
    }

    /// Forget the current values (also from the bridge) and read the file
    /// again.
    pub fn reload(&mut self) -> EnvistResult<()> {
        for key in self.env.keys() {
            self.bridge.unset(key);
        }
        self.env.clear();
        self.load()?;
        tracing::info!(path = %self.path.display(), "reloaded env file");
        Ok(())
    }

    // ========================================================================
    // READING
    // ========================================================================

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.env.get(key)
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.env.get(key).cloned().unwrap_or(default)
    }

    /// Cast the stored value with `annotation`. The stored value is left
    /// untouched whether or not the cast succeeds.
    pub fn get_as(&self, key: &str, annotation: &str) -> EnvistResult<Value> {
        let value = self.env.get(key).ok_or_else(|| EnvistError::KeyNotFound {
            key: key.to_string(),
        })?;
        cast_value(value, annotation).map_err(|e| EnvistError::from(e).for_key(key))
    }

    pub fn get_all(&self) -> &EnvMap {
        &self.env
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.env.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.env.len()
    }

    pub fn is_empty(&self) -> bool {
        self.env.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.env.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.env.iter()
    }

    // ========================================================================
    // WRITING
    // ========================================================================

    /// Store `value` under `key`.
    ///
    /// `${NAME}` references in string values are resolved against the
    /// current values first.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> EnvistResult<()> {
        validate_key(key)?;
        let value = match value.into() {
            Value::Str(s) if has_reference(&s) => Value::Str(resolve(&s, &self.env, &self.bridge)?),
            other => other,
        };
        self.store(key, value);
        Ok(())
    }

    /// Store `raw` cast with `annotation`, after resolving references.
    pub fn set_typed(&mut self, key: &str, raw: &str, annotation: &str) -> EnvistResult<()> {
        validate_key(key)?;
        let text = if has_reference(raw) {
            resolve(raw, &self.env, &self.bridge)?
        } else {
            raw.to_string()
        };
        let value = cast_str(&text, annotation).map_err(|e| EnvistError::from(e).for_key(key))?;
        self.store(key, value);
        Ok(())
    }

    /// Set every pair in order, stopping at the first failure.
    pub fn set_all<I, K, V>(&mut self, entries: I) -> EnvistResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            self.set(key.as_ref(), value)?;
        }
        Ok(())
    }

    /// Set every entry of a `Value::Map` whose keys are strings.
    pub fn set_from_value(&mut self, data: &Value) -> EnvistResult<()> {
        let map = data.as_map().ok_or_else(|| EnvistError::NotAMapping {
            found: data.type_name().to_string(),
        })?;
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map.iter() {
            let key = key.as_str().ok_or_else(|| EnvistError::NotAMapping {
                found: format!("dict with {} keys", key.type_name()),
            })?;
            entries.push((key, value.clone()));
        }
        self.set_all(entries)
    }

    fn store(&mut self, key: &str, value: Value) {
        self.bridge.set(key, &value.to_string());
        self.env.insert(key, value);
        tracing::debug!(key, "set variable");
    }

    /// Remove `key` from the map and the bridge.
    pub fn unset(&mut self, key: &str) -> EnvistResult<()> {
        self.env.remove(key).ok_or_else(|| EnvistError::KeyNotFound {
            key: key.to_string(),
        })?;
        self.bridge.unset(key);
        Ok(())
    }

    /// Remove the listed keys, or everything when `keys` is `None`.
    ///
    /// All listed keys are checked before anything is removed.
    pub fn unset_all(&mut self, keys: Option<&[&str]>) -> EnvistResult<()> {
        match keys {
            Some(keys) => {
                if let Some(missing) = keys.iter().find(|k| !self.env.contains_key(k)) {
                    return Err(EnvistError::KeyNotFound {
                        key: missing.to_string(),
                    });
                }
                for key in keys {
                    // a key listed twice is already gone the second time
                    if self.env.remove(key).is_some() {
                        self.bridge.unset(key);
                    }
                }
            }
            None => {
                for key in self.env.keys() {
                    self.bridge.unset(key);
                }
                self.env.clear();
            }
        }
        Ok(())
    }

    /// Write the current values back to the file.
    pub fn save(&self, options: SaveOptions) -> EnvistResult<()> {
        write_env(&self.path, &self.env, options)
    }
}

fn validate_key(key: &str) -> EnvistResult<()> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(ParseError::InvalidKey {
            key: key.to_string(),
        }
        .into())
    }
}

impl<E: EnvBridge> Index<&str> for Envist<E> {
    type Output = Value;

    /// Panics when `key` is absent; use [`Envist::get`] to avoid that.
    fn index(&self, key: &str) -> &Value {
        match self.env.get(key) {
            Some(value) => value,
            None => panic!("Environment variable '{}' not found", key),
        }
    }
}

impl<E: EnvBridge> fmt::Display for Envist<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Envist path=\"{}\">", self.path.display())
    }
}
