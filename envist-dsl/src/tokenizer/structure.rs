//! Raw string → structural tokens

use super::scanner::{is_bracketed, remove_quotes, smart_split, strip_enclosing, strip_quote_chars};
use super::token::Token;
use envist_core::CastError;

// ============================================================================
// LISTS
// ============================================================================

/// Decompose a raw value into list elements.
///
/// Tried in order:
/// 1. a well-formed JSON array (native JSON leaf types survive);
/// 2. `[[...],[...]]` nested bracket groups, decomposed recursively;
/// 3. a comma-separated run of `{...}` objects, each JSON-parsed or kept as
///    the raw string;
/// 4. a flat list with optional enclosing `[`/`]`, quote-stripped elements.
pub fn to_list(value: &str) -> Vec<Token> {
    let value = value.trim();

    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(value) {
        return items.into_iter().map(Token::from_json).collect();
    }

    if value.starts_with("[[") && value.ends_with("]]") {
        return nested_groups(value);
    }

    if value.contains('{') && value.contains('}') {
        return object_sequence(value);
    }

    flat_items(strip_enclosing(value, '[', ']').unwrap_or(value))
}

fn flat_items(inner: &str) -> Vec<Token> {
    smart_split(inner, ',')
        .into_iter()
        .map(|item| Token::scalar(remove_quotes(item)))
        .collect()
}

fn nested_groups(value: &str) -> Vec<Token> {
    let groups = smart_split(value, ',');
    if groups.len() > 1 {
        // Several adjacent top-level groups: `[[1,2]],[[3,4]]`
        return groups.into_iter().map(nested_element).collect();
    }
    nested_list(value)
}

fn nested_list(value: &str) -> Vec<Token> {
    let inner = strip_enclosing(value, '[', ']').unwrap_or(value);
    smart_split(inner, ',').into_iter().map(nested_element).collect()
}

fn nested_element(item: &str) -> Token {
    if is_bracketed(item) {
        Token::Sequence(nested_list(item))
    } else {
        Token::scalar(remove_quotes(item))
    }
}

fn object_sequence(value: &str) -> Vec<Token> {
    let inner = strip_enclosing(value, '[', ']').unwrap_or(value);
    smart_split(inner, ',')
        .into_iter()
        .map(|object| match serde_json::from_str::<serde_json::Value>(object) {
            Ok(json) => Token::from_json(json),
            Err(_) => Token::scalar(object),
        })
        .collect()
}

// ============================================================================
// MAPPINGS
// ============================================================================

/// Decompose a raw value into key/value pairs.
///
/// A JSON object is used as-is. Otherwise one layer of `{`/`}` is stripped and
/// each top-level pair is split on its first `=` or, failing that, its first
/// `:`. `=` values that are bracketed lists are tokenized recursively; `:`
/// values are only quote-stripped. Fragments with neither separator are
/// skipped.
pub fn to_map(value: &str) -> Vec<(Token, Token)> {
    let value = value.trim();

    if let Ok(serde_json::Value::Object(obj)) = serde_json::from_str(value) {
        return obj
            .into_iter()
            .map(|(k, v)| (Token::Scalar(k), Token::from_json(v)))
            .collect();
    }

    let inner = strip_enclosing(value, '{', '}').unwrap_or(value);
    let mut pairs = Vec::new();

    for pair in smart_split(inner, ',') {
        if let Some((key, val)) = pair.split_once('=') {
            let key = Token::scalar(strip_quote_chars(key.trim()));
            let val = val.trim();
            let val = if is_bracketed(val) {
                Token::Sequence(to_list(val))
            } else {
                Token::scalar(remove_quotes(val))
            };
            pairs.push((key, val));
        } else if let Some((key, val)) = pair.split_once(':') {
            pairs.push((
                Token::scalar(strip_quote_chars(key.trim())),
                Token::scalar(strip_quote_chars(val.trim())),
            ));
        } else {
            tracing::debug!(fragment = pair, "skipping map fragment without separator");
        }
    }

    pairs
}

// ============================================================================
// CSV
// ============================================================================

/// Split a single CSV row; quoted fields may contain the delimiter.
pub fn to_csv(value: &str) -> Result<Vec<String>, CastError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(value.as_bytes());

    match reader.records().next() {
        None => Ok(Vec::new()),
        Some(Ok(record)) => Ok(record.iter().map(str::to_string).collect()),
        Some(Err(e)) => Err(CastError::InvalidCsv {
            reason: e.to_string(),
        }),
    }
}
