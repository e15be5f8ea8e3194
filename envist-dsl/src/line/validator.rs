//! Line validator: raw line → (key, value, annotation)

use crate::grammar::matching_close;
use crate::tokenizer::remove_quotes;
use envist_core::{is_valid_key, ParseError};

/// One successfully split source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub key: String,
    pub raw_value: String,
    pub type_annotation: Option<String>,
}

impl ParsedLine {
    /// Whether the annotation (if any) is exactly `str`.
    pub fn is_str_typed(&self) -> bool {
        self.type_annotation
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("str"))
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Split a filtered line into key, raw value and optional type annotation.
///
/// Accepted shapes, tried in order:
/// - `KEY<TYPE>=VALUE` where `TYPE` may nest `<...>`;
/// - `KEY:TYPE=VALUE` where `TYPE` is a bare identifier;
/// - `KEY=VALUE`;
/// - a bare `KEY` with an empty value.
///
/// Values are trimmed unless the annotation is `str`, and one matching pair
/// of surrounding quotes is removed. A quoted `str` value keeps exactly the
/// text between its quotes. An empty value is rejected unless
/// `accept_empty` is set or a type annotation is present; annotated empties
/// are left for the coercion step to judge by type kind.
pub fn parse_line(line: &str, accept_empty: bool) -> Result<ParsedLine, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('=') {
        return Err(ParseError::MissingKey);
    }

    let Some(eq) = line.find('=') else {
        return parse_bare_key(trimmed, accept_empty);
    };

    let (key, annotation) = split_head(&line[..eq], trimmed)?;
    if !is_valid_key(key) {
        return Err(ParseError::InvalidKey {
            key: key.to_string(),
        });
    }

    let str_typed = annotation.is_some_and(|t| t.eq_ignore_ascii_case("str"));
    let tail = &line[eq + 1..];
    let value = if str_typed { tail } else { tail.trim() };

    if value.is_empty() && !accept_empty && annotation.is_none() {
        return Err(ParseError::EmptyValue {
            key: key.to_string(),
        });
    }

    Ok(ParsedLine {
        key: key.to_string(),
        raw_value: if str_typed {
            unquote_verbatim(value)
        } else {
            remove_quotes(value)
        }
        .to_string(),
        type_annotation: annotation.map(str::to_string),
    })
}

/// Text inside the quotes when the trimmed value is one quoted span,
/// otherwise the value untouched.
fn unquote_verbatim(value: &str) -> &str {
    let trimmed = value.trim();
    let inner = remove_quotes(trimmed);
    if inner.len() < trimmed.len() {
        inner
    } else {
        value
    }
}

/// Split the text before `=` into key and annotation.
fn split_head<'a>(head: &'a str, line: &str) -> Result<(&'a str, Option<&'a str>), ParseError> {
    if let Some(open) = head.find('<') {
        let key = head[..open].trim();
        let segment = head[open..].trim_end();

        let close = matching_close(segment, 0).ok_or_else(|| unbalanced(segment))?;
        if close != segment.len() - 1 {
            return Err(unbalanced(segment));
        }

        let annotation = segment[1..close].trim();
        if annotation.is_empty() {
            return Err(ParseError::InvalidFormat {
                line: line.to_string(),
            });
        }
        return Ok((key, Some(annotation)));
    }

    if let Some((key, ty)) = head.split_once(':') {
        let ty = ty.trim();
        if !ty.is_empty() && ty.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Ok((key.trim(), Some(ty)));
        }
    }

    Ok((head.trim(), None))
}

fn unbalanced(segment: &str) -> ParseError {
    ParseError::UnbalancedBrackets {
        annotation: segment.to_string(),
    }
}

fn parse_bare_key(trimmed: &str, accept_empty: bool) -> Result<ParsedLine, ParseError> {
    let token_like = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !token_like {
        return Err(ParseError::InvalidFormat {
            line: trimmed.to_string(),
        });
    }
    if !is_valid_key(trimmed) {
        return Err(ParseError::InvalidKey {
            key: trimmed.to_string(),
        });
    }
    if !accept_empty {
        return Err(ParseError::EmptyValue {
            key: trimmed.to_string(),
        });
    }

    Ok(ParsedLine {
        key: trimmed.to_string(),
        raw_value: String::new(),
        type_annotation: None,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(key: &str, value: &str, ty: Option<&str>) -> ParsedLine {
        ParsedLine {
            key: key.to_string(),
            raw_value: value.to_string(),
            type_annotation: ty.map(str::to_string),
        }
    }

    #[test]
    fn test_plain_pair() {
        assert_eq!(parse_line("KEY=value", false), Ok(parsed("KEY", "value", None)));
        assert_eq!(parse_line("  KEY =  value  ", false), Ok(parsed("KEY", "value", None)));
    }

    #[test]
    fn test_value_may_contain_equals() {
        assert_eq!(
            parse_line("URL=postgres://u:p@host/db?sslmode=require", false),
            Ok(parsed("URL", "postgres://u:p@host/db?sslmode=require", None))
        );
    }

    #[test]
    fn test_angle_annotation() {
        assert_eq!(parse_line("PORT<int>=8080", false), Ok(parsed("PORT", "8080", Some("int"))));
        assert_eq!(
            parse_line("PORT <int> = 8080", false),
            Ok(parsed("PORT", "8080", Some("int")))
        );
    }

    #[test]
    fn test_nested_annotation() {
        assert_eq!(
            parse_line("MATRIX<dict<str, list<int>>>=a=[1,2]", false),
            Ok(parsed("MATRIX", "a=[1,2]", Some("dict<str, list<int>>")))
        );
    }

    #[test]
    fn test_annotation_keeps_inner_spacing() {
        assert_eq!(
            parse_line("KEY< list < int > >=value", false),
            Ok(parsed("KEY", "value", Some("list < int >")))
        );
    }

    #[test]
    fn test_colon_annotation() {
        assert_eq!(parse_line("DEBUG:bool=true", false), Ok(parsed("DEBUG", "true", Some("bool"))));
    }

    #[test]
    fn test_colon_with_generic_is_not_an_annotation() {
        assert!(matches!(
            parse_line("KEY:list<int>=1", false),
            Err(ParseError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_unbalanced_annotation() {
        for line in ["KEY<list<int>=1", "KEY<list<int>>>=1", "KEY<int><str>=1"] {
            assert!(
                matches!(parse_line(line, false), Err(ParseError::UnbalancedBrackets { .. })),
                "{line}"
            );
        }
    }

    #[test]
    fn test_empty_annotation() {
        assert!(matches!(parse_line("KEY<>=1", false), Err(ParseError::InvalidFormat { .. })));
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(parse_line("=value", false), Err(ParseError::MissingKey));
        assert_eq!(parse_line("   ", true), Err(ParseError::MissingKey));
    }

    #[test]
    fn test_invalid_key() {
        assert!(matches!(parse_line("MY-KEY=1", false), Err(ParseError::InvalidKey { .. })));
        assert!(matches!(parse_line("1KEY=1", false), Err(ParseError::InvalidKey { .. })));
        assert!(matches!(parse_line("MY KEY=1", false), Err(ParseError::InvalidKey { .. })));
    }

    #[test]
    fn test_quote_stripping() {
        assert_eq!(parse_line(r#"A="quoted""#, false), Ok(parsed("A", "quoted", None)));
        assert_eq!(parse_line("A='single'", false), Ok(parsed("A", "single", None)));
        assert_eq!(parse_line(r#"A="mismatch'"#, false), Ok(parsed("A", r#""mismatch'"#, None)));
        assert_eq!(parse_line(r#"A="partial"#, false), Ok(parsed("A", r#""partial"#, None)));
    }

    #[test]
    fn test_quoted_empty_string_is_not_empty_value() {
        assert_eq!(parse_line(r#"A="""#, false), Ok(parsed("A", "", None)));
    }

    #[test]
    fn test_str_annotation_preserves_whitespace() {
        assert_eq!(
            parse_line("PADDED<str>=  two  spaces  ", false),
            Ok(parsed("PADDED", "  two  spaces  ", Some("str")))
        );
        assert_eq!(
            parse_line(r#"QUOTED<str>="  inner  ""#, false),
            Ok(parsed("QUOTED", "  inner  ", Some("str")))
        );
        assert_eq!(
            parse_line("OTHER<int>=  42  ", false),
            Ok(parsed("OTHER", "42", Some("int")))
        );
    }

    #[test]
    fn test_str_annotation_with_spaced_separator_strips_quotes() {
        assert_eq!(
            parse_line(r#"GREETING<str> = "hello""#, false),
            Ok(parsed("GREETING", "hello", Some("str")))
        );
        assert_eq!(
            parse_line(r#"KEY<str> = "  x  "  "#, false),
            Ok(parsed("KEY", "  x  ", Some("str")))
        );
        assert_eq!(
            parse_line("KEY:str = 'x'", false),
            Ok(parsed("KEY", "x", Some("str")))
        );
        assert_eq!(
            parse_line(r#"KEY<str> = "open"#, false),
            Ok(parsed("KEY", r#" "open"#, Some("str")))
        );
    }

    #[test]
    fn test_empty_value_policy() {
        assert_eq!(
            parse_line("EMPTY=", false),
            Err(ParseError::EmptyValue {
                key: "EMPTY".to_string()
            })
        );
        assert_eq!(parse_line("EMPTY=", true), Ok(parsed("EMPTY", "", None)));
    }

    #[test]
    fn test_annotated_empty_value_is_deferred() {
        assert_eq!(parse_line("EMPTY<int>=", false), Ok(parsed("EMPTY", "", Some("int"))));
        assert_eq!(
            parse_line("EMPTY_LIST<list<int>>=", false),
            Ok(parsed("EMPTY_LIST", "", Some("list<int>")))
        );
    }

    #[test]
    fn test_bare_key() {
        assert_eq!(parse_line("FLAG", true), Ok(parsed("FLAG", "", None)));
        assert!(matches!(parse_line("FLAG", false), Err(ParseError::EmptyValue { .. })));
        assert!(matches!(parse_line("not a pair", true), Err(ParseError::InvalidFormat { .. })));
        assert!(matches!(parse_line("my-flag", true), Err(ParseError::InvalidKey { .. })));
    }

    #[test]
    fn test_is_str_typed() {
        assert!(parse_line("A<STR>=x", false).unwrap().is_str_typed());
        assert!(!parse_line("A<int>=1", false).unwrap().is_str_typed());
    }
}
