//! Intermediate structural tokens

use envist_core::{Value, ValueMap};

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Structural decomposition of a raw value, before leaf coercion.
///
/// `Literal` carries leaves that already have a native type because they came
/// out of a JSON document (numbers, booleans, null) or out of a value that was
/// typed before it reached the coercion engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Scalar(String),
    Literal(Value),
    Sequence(Vec<Token>),
    Mapping(Vec<(Token, Token)>),
}

impl Token {
    pub fn scalar(s: impl Into<String>) -> Self {
        Token::Scalar(s.into())
    }

    /// Lift a parsed JSON document. Strings stay scalars so they can still be
    /// coerced; other leaves keep their JSON type.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::String(s) => Token::Scalar(s),
            serde_json::Value::Array(items) => {
                Token::Sequence(items.into_iter().map(Token::from_json).collect())
            }
            serde_json::Value::Object(obj) => Token::Mapping(
                obj.into_iter()
                    .map(|(k, v)| (Token::Scalar(k), Token::from_json(v)))
                    .collect(),
            ),
            other => Token::Literal(Value::from_json(other)),
        }
    }

    /// Decompose an already-typed value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Str(s) => Token::Scalar(s.clone()),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
                Token::Sequence(items.iter().map(Token::from_value).collect())
            }
            Value::Map(map) => Token::Mapping(
                map.iter()
                    .map(|(k, v)| (Token::from_value(k), Token::from_value(v)))
                    .collect(),
            ),
            leaf => Token::Literal(leaf.clone()),
        }
    }

    /// Reassemble without coercion: scalars stay strings.
    pub fn into_value(self) -> Value {
        match self {
            Token::Scalar(s) => Value::Str(s),
            Token::Literal(v) => v,
            Token::Sequence(items) => Value::List(items.into_iter().map(Token::into_value).collect()),
            Token::Mapping(pairs) => Value::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into_value(), v.into_value()))
                    .collect::<ValueMap>(),
            ),
        }
    }

    /// Short shape name used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Token::Scalar(_) => "scalar",
            Token::Literal(v) => v.type_name(),
            Token::Sequence(_) => "sequence",
            Token::Mapping(_) => "mapping",
        }
    }
}
