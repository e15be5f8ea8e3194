//! `${NAME}` variable resolution with cycle and depth detection

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use envist_core::{EnvBridge, EnvMap, ParseError};
use once_cell::sync::Lazy;
use regex::Regex;

/// Deepest chain of nested references followed before giving up.
pub const MAX_RESOLUTION_DEPTH: usize = 10;

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{(.+?)\}").expect("static reference pattern compiles"));

/// Cheap pre-check: does `value` contain at least one `${...}`?
pub fn has_reference(value: &str) -> bool {
    REFERENCE.is_match(value)
}

/// Names referenced by `value`, in order of appearance.
pub fn references(value: &str) -> Vec<&str> {
    REFERENCE
        .captures_iter(value)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

// ============================================================================
// RESOLUTION CONTEXT
// ============================================================================

/// Key → text source consulted before the process environment.
pub trait ResolutionContext {
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// Raw first-pass values during a bulk load.
impl ResolutionContext for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|s| Cow::Borrowed(s.as_str()))
    }
}

/// The live typed map, stringified.
impl ResolutionContext for EnvMap {
    fn lookup(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name).map(|v| match v.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(v.to_string()),
        })
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Substitute every `${NAME}` in `value`.
///
/// Names are looked up in `ctx` first (recursively resolving what they point
/// to), then in `bridge`; a name found in neither becomes the empty string.
/// A name that is already being resolved higher up the chain is a
/// `CircularReference`; chains longer than [`MAX_RESOLUTION_DEPTH`] are
/// `TooDeepNesting`.
pub fn resolve(
    value: &str,
    ctx: &dyn ResolutionContext,
    bridge: &dyn EnvBridge,
) -> Result<String, ParseError> {
    Resolver {
        ctx,
        bridge,
        resolving: HashSet::new(),
    }
    .resolve(value, 0)
}

struct Resolver<'a> {
    ctx: &'a dyn ResolutionContext,
    bridge: &'a dyn EnvBridge,
    resolving: HashSet<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, value: &str, depth: usize) -> Result<String, ParseError> {
        if depth > MAX_RESOLUTION_DEPTH {
            return Err(ParseError::TooDeepNesting {
                max_depth: MAX_RESOLUTION_DEPTH,
            });
        }

        let mut result = value.to_string();
        for name in references(value) {
            if self.resolving.contains(name) {
                return Err(ParseError::CircularReference {
                    name: name.to_string(),
                });
            }

            let replacement = match self.ctx.lookup(name) {
                Some(raw) => {
                    let raw = raw.into_owned();
                    if has_reference(&raw) {
                        self.resolving.insert(name.to_string());
                        let resolved = self.resolve(&raw, depth + 1);
                        self.resolving.remove(name);
                        resolved?
                    } else {
                        raw
                    }
                }
                None => match self.bridge.get(name) {
                    Some(env_value) => env_value,
                    None => {
                        tracing::warn!(name, "unresolved variable reference, substituting empty string");
                        String::new()
                    }
                },
            };

            tracing::debug!(name, depth, "resolved variable reference");
            result = result.replace(&format!("${{{}}}", name), &replacement);
        }

        Ok(result)
    }
}

// ============================================================================
// TESTS
// ============================================================================
