//! Recursive-descent parser for type annotations
//!
//! ```text
//! type    := simple | generic
//! generic := IDENT "<" args ">"
//! args    := type | type "," type
//! simple  := int | float | bool | str | list | array | dict | tuple
//!          | set | csv | comma_separated | json
//! ```

use envist_core::{CastError, CollectionKind, SimpleType, TypeNode};

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Parse a type annotation such as `dict<str, list<int>>`.
///
/// Bracket balance is checked over the whole annotation before any grammar
/// work, so `list<int`, `list<int>>` and `list<<int>` fail with
/// `InvalidSyntax` regardless of where the imbalance sits.
pub fn parse_type(annotation: &str) -> Result<TypeNode, CastError> {
    let text = annotation.trim();
    validate_brackets(text)?;
    parse_node(text, text)
}

fn parse_node(text: &str, full: &str) -> Result<TypeNode, CastError> {
    let text = text.trim();

    let Some(open) = text.find('<') else {
        if text.is_empty() {
            return Err(syntax(full, "missing type name"));
        }
        if text.contains('>') {
            return Err(syntax(full, "unexpected '>'"));
        }
        return Ok(TypeNode::simple(text.parse::<SimpleType>()?));
    };

    let base = text[..open].trim();
    if base.is_empty() {
        return Err(syntax(full, "missing base type before '<'"));
    }
    if !base.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(syntax(full, "base type must be an identifier"));
    }

    let close = matching_close(text, open).ok_or_else(|| syntax(full, "unclosed '<'"))?;
    if close != text.len() - 1 {
        return Err(syntax(full, "unexpected text after closing '>'"));
    }

    let inner = &text[open + 1..close];
    if inner.trim().is_empty() {
        return Err(syntax(full, "empty type arguments"));
    }

    let base = base.to_lowercase();
    let args = split_type_args(inner);

    if let Some(kind) = CollectionKind::from_name(&base) {
        expect_arity(&base, &args, 1, full)?;
        return Ok(TypeNode::collection(kind, parse_node(args[0], full)?));
    }

    if base == "dict" {
        expect_arity(&base, &args, 2, full)?;
        let key = parse_node(args[0], full)?;
        let value = parse_node(args[1], full)?;
        return Ok(TypeNode::mapping(key, value));
    }

    Err(CastError::UnsupportedNestedType { name: base })
}

fn expect_arity(base: &str, args: &[&str], expected: usize, full: &str) -> Result<(), CastError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CastError::WrongArity {
            base: base.to_string(),
            expected,
            found: args.len(),
            annotation: full.to_string(),
        })
    }
}

fn syntax(annotation: &str, reason: &str) -> CastError {
    CastError::InvalidSyntax {
        annotation: annotation.to_string(),
        reason: reason.to_string(),
    }
}

// ============================================================================
// BRACKET HELPERS
// ============================================================================

/// Reject any `<`/`>` imbalance: a `>` without an opener, or an unclosed `<`.
pub fn validate_brackets(annotation: &str) -> Result<(), CastError> {
    let mut depth: usize = 0;
    for c in annotation.chars() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| syntax(annotation, "unbalanced '>'"))?;
            }
            _ => {}
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(syntax(annotation, "unbalanced '<'"))
    }
}

/// Byte index of the `>` that closes the `<` at `open`, by depth counting.
pub fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth: usize = 0;
    for (i, c) in text[open..].char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split generic arguments on commas outside nested `<...>`.
///
/// Parts are trimmed; empty parts are dropped.
pub fn split_type_args(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, c) in args.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                let part = args[start..i].trim();
                if !part.is_empty() {
                    parts.push(part);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    let tail = args[start..].trim();
    if !tail.is_empty() {
        parts.push(tail);
    }

    parts
}

// ============================================================================
// TESTS
// ============================================================================
