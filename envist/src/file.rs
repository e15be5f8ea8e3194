//! File reader and line filter

use std::path::Path;

use envist_core::{EnvistError, EnvistResult};
use envist_dsl::tokenizer::QuoteState;

/// A line that survived filtering, with its 1-based position in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

/// Read every line of `path`.
pub fn read_lines(path: &Path) -> EnvistResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| EnvistError::FileNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Drop blank and comment lines and strip trailing comments.
///
/// A `#` starts a trailing comment only when it is outside quotes and
/// preceded by whitespace. Leading whitespace is removed; trailing
/// whitespace survives unless a comment was cut off.
pub fn filter_lines<I, S>(lines: I) -> Vec<SourceLine>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .enumerate()
        .filter_map(|(i, line)| {
            let text = strip_comment(line.as_ref().trim_start());
            if text.trim().is_empty() {
                None
            } else {
                Some(SourceLine {
                    number: i + 1,
                    text: text.to_string(),
                })
            }
        })
        .collect()
}

/// `line` up to its trailing comment, if it has one.
pub(crate) fn strip_comment(line: &str) -> &str {
    if line.starts_with('#') {
        return "";
    }

    let mut quotes = QuoteState::new();
    let mut prev_blank = false;
    for (i, c) in line.char_indices() {
        let structural = quotes.step(c);
        if structural && c == '#' && prev_blank {
            return line[..i].trim_end();
        }
        prev_blank = c.is_whitespace();
    }
    line
}
