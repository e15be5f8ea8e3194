//! Type coercion engine
//!
//! Walks a [`TypeNode`] and a [`Token`] together: leaves are coerced to
//! primitives, sequences and mappings are rebuilt around recursively coerced
//! children. Every public entry point reports failures as a single
//! [`CastError::Failed`] carrying the value, the attempted type and the cause.

pub mod leaf;

use crate::grammar::parse_type;
use crate::tokenizer::{is_bracketed, to_csv, to_list, to_map, Token};
use envist_core::{CastError, CollectionKind, SimpleType, TypeNode, Value, ValueMap};

// ============================================================================
// PUBLIC ENTRY POINTS
// ============================================================================

/// Parse `annotation` and cast a raw string with it.
///
/// Grammar errors are returned as-is; coercion failures are wrapped.
pub fn cast_str(raw: &str, annotation: &str) -> Result<Value, CastError> {
    let ty = parse_type(annotation)?;
    coerce_str(raw, &ty)
}

/// Parse `annotation` and re-cast an already-typed value with it.
pub fn cast_value(value: &Value, annotation: &str) -> Result<Value, CastError> {
    let ty = parse_type(annotation)?;
    coerce_value(value, &ty)
}

/// Cast a raw string.
///
/// An empty raw value becomes an empty container for container types and an
/// `EmptyValue` error for everything else. Only `str` treats a whitespace-only
/// value as non-empty.
pub fn coerce_str(raw: &str, ty: &TypeNode) -> Result<Value, CastError> {
    let blank = match ty {
        TypeNode::Simple {
            name: SimpleType::Str,
        } => raw.is_empty(),
        _ => raw.trim().is_empty(),
    };
    if blank && !ty.is_container() {
        return Err(CastError::failed(
            raw,
            ty.to_string(),
            CastError::EmptyValue {
                target: ty.to_string(),
            },
        ));
    }

    coerce(Token::scalar(raw), ty).map_err(|e| CastError::failed(raw, ty.to_string(), e))
}

/// Cast a value that already has a type, e.g. one stored by an earlier load.
pub fn coerce_value(value: &Value, ty: &TypeNode) -> Result<Value, CastError> {
    if let Value::Str(raw) = value {
        return coerce_str(raw, ty);
    }
    coerce(Token::from_value(value), ty)
        .map_err(|e| CastError::failed(value.to_string(), ty.to_string(), e))
}

// ============================================================================
// RECURSIVE WALK
// ============================================================================

/// Coerce one token against one type tree node.
///
/// Leaf failures come back already wrapped with the leaf's own text, so the
/// message names the element that failed rather than the whole value.
pub fn coerce(token: Token, ty: &TypeNode) -> Result<Value, CastError> {
    match ty {
        TypeNode::Simple { name } => coerce_simple(token, *name),
        TypeNode::Collection { kind, inner } => {
            let items = sequence_of(token)
                .into_iter()
                .map(|item| coerce(item, inner))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(wrap(*kind, items))
        }
        TypeNode::Mapping { key, value } => {
            let mut map = ValueMap::new();
            for (k, v) in mapping_of(token)? {
                map.insert(coerce(k, key)?, coerce(v, value)?);
            }
            Ok(Value::Map(map))
        }
    }
}

fn coerce_simple(token: Token, name: SimpleType) -> Result<Value, CastError> {
    let leaf_failed = |token: &Token, e| CastError::failed(leaf::text_of(token), name.as_str(), e);

    match name {
        SimpleType::Int => leaf::to_int(&token).map_err(|e| leaf_failed(&token, e)),
        SimpleType::Float => leaf::to_float(&token).map_err(|e| leaf_failed(&token, e)),
        SimpleType::Bool => Ok(leaf::to_bool(&token)),
        SimpleType::Str => Ok(leaf::to_str(&token)),
        SimpleType::List | SimpleType::Array => Ok(Value::List(plain(sequence_of(token)))),
        SimpleType::Tuple => Ok(Value::Tuple(plain(sequence_of(token)))),
        SimpleType::Set => Ok(Value::set(plain(sequence_of(token)))),
        SimpleType::Dict => Ok(Value::Map(
            mapping_of(token)?
                .into_iter()
                .map(|(k, v)| (k.into_value(), v.into_value()))
                .collect(),
        )),
        SimpleType::Csv | SimpleType::CommaSeparated => csv_of(token),
        SimpleType::Json => json_of(token),
    }
}

fn wrap(kind: CollectionKind, items: Vec<Value>) -> Value {
    match kind {
        CollectionKind::List => Value::List(items),
        CollectionKind::Tuple => Value::Tuple(items),
        CollectionKind::Set => Value::set(items),
    }
}

fn plain(items: Vec<Token>) -> Vec<Value> {
    items.into_iter().map(Token::into_value).collect()
}

// ============================================================================
// SHAPE ADAPTERS
// ============================================================================

/// Elements of a token viewed as a sequence. Raw strings are tokenized;
/// mappings contribute their keys; a lone literal is a one-element sequence.
fn sequence_of(token: Token) -> Vec<Token> {
    match token {
        Token::Scalar(s) => to_list(&s),
        Token::Sequence(items) => items,
        Token::Mapping(pairs) => pairs.into_iter().map(|(k, _)| k).collect(),
        literal @ Token::Literal(_) => vec![literal],
    }
}

/// Pairs of a token viewed as a mapping. A sequence (or a bracketed raw
/// string) qualifies only when every element is a two-element sequence.
fn mapping_of(token: Token) -> Result<Vec<(Token, Token)>, CastError> {
    match token {
        Token::Scalar(s) if is_bracketed(s.trim()) => mapping_of(Token::Sequence(to_list(&s))),
        Token::Scalar(s) => Ok(to_map(&s)),
        Token::Mapping(pairs) => Ok(pairs),
        Token::Sequence(items) => items.into_iter().map(pair_of).collect(),
        other => Err(leaf::shape("dict", &other)),
    }
}

fn pair_of(item: Token) -> Result<(Token, Token), CastError> {
    match item {
        Token::Sequence(pair) if pair.len() == 2 => {
            let mut it = pair.into_iter();
            match (it.next(), it.next()) {
                (Some(k), Some(v)) => Ok((k, v)),
                _ => Err(CastError::Shape {
                    expected: "key/value pair".to_string(),
                    found: "sequence".to_string(),
                }),
            }
        }
        other => Err(leaf::shape("key/value pair", &other)),
    }
}

fn csv_of(token: Token) -> Result<Value, CastError> {
    let fields = match token {
        Token::Scalar(s) => to_csv(&s)?,
        Token::Sequence(items) => items.iter().map(leaf::text_of).collect(),
        other => return Err(leaf::shape("csv row", &other)),
    };
    Ok(Value::List(fields.into_iter().map(Value::Str).collect()))
}

fn json_of(token: Token) -> Result<Value, CastError> {
    match token {
        Token::Scalar(s) => serde_json::from_str::<serde_json::Value>(&s)
            .map(Value::from_json)
            .map_err(|e| CastError::InvalidJson {
                reason: e.to_string(),
            }),
        structured => Ok(structured.into_value()),
    }
}

// ============================================================================
// TESTS
// ============================================================================
