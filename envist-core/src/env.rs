//! Environment access capability
//!
//! Loaded values are mirrored into "the environment" as strings. The process
//! environment is global mutable state, so it sits behind [`EnvBridge`] and
//! tests substitute [`MemoryEnv`].

use std::collections::HashMap;

/// Read/write access to an environment variable table.
pub trait EnvBridge {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, name: &str, value: &str);
    fn unset(&mut self, name: &str);
}

/// The real process environment.
///
/// Not synchronised: callers writing from several threads must serialise
/// access themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvBridge for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set(&mut self, name: &str, value: &str) {
        // set_var panics on '=' or NUL in the name; keys are validated before
        // they get here, but values may still carry a NUL.
        if name.is_empty() || name.contains(['=', '\0']) || value.contains('\0') {
            return;
        }
        std::env::set_var(name, value);
    }

    fn unset(&mut self, name: &str) {
        if name.is_empty() || name.contains(['=', '\0']) {
            return;
        }
        std::env::remove_var(name);
    }
}

/// In-memory environment table for tests and sandboxed loaders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryEnv {
    vars: HashMap<String, String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing variables.
    pub fn with_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvBridge for MemoryEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    fn unset(&mut self, name: &str) {
        self.vars.remove(name);
    }
}

impl<B: EnvBridge + ?Sized> EnvBridge for &mut B {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&mut self, name: &str, value: &str) {
        (**self).set(name, value)
    }

    fn unset(&mut self, name: &str) {
        (**self).unset(name)
    }
}
