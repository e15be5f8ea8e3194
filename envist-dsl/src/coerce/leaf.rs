//! Primitive leaf coercion: int, float, bool, str

use crate::tokenizer::Token;
use envist_core::{CastError, Value};

/// Lower-cased strings that coerce to `true`. Everything else is `false`.
pub const TRUTHY: [&str; 4] = ["true", "1", "yes", "on"];

/// 2^63: floats in `-I64_BOUND..I64_BOUND` truncate to an `i64` exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

pub fn to_int(token: &Token) -> Result<Value, CastError> {
    match token {
        Token::Scalar(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| CastError::InvalidInt { value: s.clone() }),
        Token::Literal(Value::Int(i)) => Ok(Value::Int(*i)),
        Token::Literal(Value::Float(f)) => {
            let truncated = f.trunc();
            if (-I64_BOUND..I64_BOUND).contains(&truncated) {
                Ok(Value::Int(truncated as i64))
            } else {
                Err(CastError::InvalidInt {
                    value: f.to_string(),
                })
            }
        }
        Token::Literal(Value::Bool(b)) => Ok(Value::Int(i64::from(*b))),
        other => Err(shape("int", other)),
    }
}

pub fn to_float(token: &Token) -> Result<Value, CastError> {
    match token {
        Token::Scalar(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| CastError::InvalidFloat { value: s.clone() }),
        Token::Literal(Value::Float(f)) => Ok(Value::Float(*f)),
        Token::Literal(Value::Int(i)) => Ok(Value::Float(*i as f64)),
        Token::Literal(Value::Bool(b)) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        other => Err(shape("float", other)),
    }
}

/// Never fails: unmatched strings are `false`.
pub fn to_bool(token: &Token) -> Value {
    let truthy = match token {
        Token::Scalar(s) => {
            let lowered = s.trim().to_lowercase();
            TRUTHY.contains(&lowered.as_str())
        }
        Token::Literal(v) => v.is_truthy(),
        Token::Sequence(items) => !items.is_empty(),
        Token::Mapping(pairs) => !pairs.is_empty(),
    };
    Value::Bool(truthy)
}

/// Scalars pass through verbatim; anything structured is rendered in its
/// env-string form.
pub fn to_str(token: &Token) -> Value {
    match token {
        Token::Scalar(s) => Value::Str(s.clone()),
        other => Value::Str(text_of(other)),
    }
}

/// Text shown in cast error messages.
pub fn text_of(token: &Token) -> String {
    match token {
        Token::Scalar(s) => s.clone(),
        Token::Literal(v) => v.to_string(),
        structured => structured.clone().into_value().to_string(),
    }
}

pub(crate) fn shape(expected: &str, found: &Token) -> CastError {
    CastError::Shape {
        expected: expected.to_string(),
        found: found.shape().to_string(),
    }
}
