//! Persistence writer
//!
//! Type annotations are not written back: a saved file reloads as strings
//! unless the caller re-annotates it.

use std::path::Path;

use envist_core::{EnvMap, EnvistError, EnvistResult, Value};

use crate::config::SaveOptions;
use crate::file::strip_comment;

/// Render the map as `.env` text, one `KEY=value` line per entry.
pub fn render(env: &EnvMap, options: SaveOptions) -> String {
    let entries: Vec<(&str, &Value)> = if options.sort_keys {
        env.sorted()
    } else {
        env.iter().collect()
    };
    let separator = if options.pretty { " = " } else { "=" };

    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(key);
        out.push_str(separator);
        out.push_str(&quote_if_needed(&value.to_string()));
        out.push('\n');
    }
    out
}

/// Write the rendered map to `path`, replacing its contents.
pub fn write_env(path: &Path, env: &EnvMap, options: SaveOptions) -> EnvistResult<()> {
    std::fs::write(path, render(env, options)).map_err(|e| EnvistError::Io {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tracing::info!(path = %path.display(), count = env.len(), "saved env file");
    Ok(())
}

/// Quote values that would not read back verbatim: surrounding whitespace,
/// a leading `#` or a ` #` that would start a comment, or an existing pair of
/// outer quotes.
///
/// The quote character the value does not contain is tried first; the first
/// wrapping that keeps the whole value out of comment stripping wins. A value
/// containing both quote characters where neither wrapping survives is
/// written as-is and will not reload verbatim.
fn quote_if_needed(text: &str) -> String {
    let padded = text != text.trim();
    let comment = text.starts_with('#') || text.contains(" #") || text.contains("\t#");
    let wrapped = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')));

    if !(padded || comment || wrapped) {
        return text.to_string();
    }
    let order = if text.contains('"') {
        ['\'', '"']
    } else {
        ['"', '\'']
    };
    for quote in order {
        let candidate = format!("{quote}{text}{quote}");
        if strip_comment(&candidate) == candidate {
            return candidate;
        }
    }
    tracing::warn!(value = text, "value cannot be quoted safely, saving unquoted");
    text.to_string()
}
