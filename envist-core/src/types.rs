//! Type tree produced from a type annotation

use crate::CastError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Leaf type names accepted in an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleType {
    Int,
    Float,
    Bool,
    Str,
    List,
    Array,
    Dict,
    Tuple,
    Set,
    Csv,
    CommaSeparated,
    Json,
}

impl SimpleType {
    pub const ALL: [SimpleType; 12] = [
        SimpleType::Int,
        SimpleType::Float,
        SimpleType::Bool,
        SimpleType::Str,
        SimpleType::List,
        SimpleType::Array,
        SimpleType::Dict,
        SimpleType::Tuple,
        SimpleType::Set,
        SimpleType::Csv,
        SimpleType::CommaSeparated,
        SimpleType::Json,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SimpleType::Int => "int",
            SimpleType::Float => "float",
            SimpleType::Bool => "bool",
            SimpleType::Str => "str",
            SimpleType::List => "list",
            SimpleType::Array => "array",
            SimpleType::Dict => "dict",
            SimpleType::Tuple => "tuple",
            SimpleType::Set => "set",
            SimpleType::Csv => "csv",
            SimpleType::CommaSeparated => "comma_separated",
            SimpleType::Json => "json",
        }
    }

    /// Whether an empty raw value means "empty container" for this type.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            SimpleType::List
                | SimpleType::Array
                | SimpleType::Dict
                | SimpleType::Tuple
                | SimpleType::Set
                | SimpleType::Csv
                | SimpleType::CommaSeparated
        )
    }
}

impl FromStr for SimpleType {
    type Err = CastError;

    /// Case-insensitive lookup of a leaf type name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        SimpleType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lowered)
            .ok_or(CastError::UnsupportedType { name: lowered })
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-argument generic containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    List,
    Set,
    Tuple,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::List => "list",
            CollectionKind::Set => "set",
            CollectionKind::Tuple => "tuple",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "list" => Some(CollectionKind::List),
            "set" => Some(CollectionKind::Set),
            "tuple" => Some(CollectionKind::Tuple),
            _ => None,
        }
    }
}

/// Parsed type annotation.
///
/// `Collection` always carries one child and `Mapping` always carries two;
/// the shape is enforced by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeNode {
    Simple { name: SimpleType },
    Collection { kind: CollectionKind, inner: Box<TypeNode> },
    Mapping { key: Box<TypeNode>, value: Box<TypeNode> },
}

impl TypeNode {
    pub fn simple(name: SimpleType) -> Self {
        TypeNode::Simple { name }
    }

    pub fn collection(kind: CollectionKind, inner: TypeNode) -> Self {
        TypeNode::Collection {
            kind,
            inner: Box::new(inner),
        }
    }

    pub fn mapping(key: TypeNode, value: TypeNode) -> Self {
        TypeNode::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Lowercase base name: `int`, `list`, `dict`, ...
    pub fn base_name(&self) -> &'static str {
        match self {
            TypeNode::Simple { name } => name.as_str(),
            TypeNode::Collection { kind, .. } => kind.as_str(),
            TypeNode::Mapping { .. } => "dict",
        }
    }

    /// Whether an empty raw value should become an empty container.
    pub fn is_container(&self) -> bool {
        match self {
            TypeNode::Simple { name } => name.is_container(),
            TypeNode::Collection { .. } | TypeNode::Mapping { .. } => true,
        }
    }

    /// Nesting depth; a simple type has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            TypeNode::Simple { .. } => 1,
            TypeNode::Collection { inner, .. } => 1 + inner.depth(),
            TypeNode::Mapping { key, value } => 1 + key.depth().max(value.depth()),
        }
    }
}

/// Canonical annotation text, e.g. `dict<str, list<int>>`.
impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Simple { name } => write!(f, "{}", name),
            TypeNode::Collection { kind, inner } => write!(f, "{}<{}>", kind.as_str(), inner),
            TypeNode::Mapping { key, value } => write!(f, "dict<{}, {}>", key, value),
        }
    }
}
