//! Runtime value model
//!
//! A single tagged variant replaces a per-type class hierarchy: the
//! [`TypeDescriptor`](crate::TypeDescriptor) decides how a value is
//! marshalled, the variant only carries the data.

use serde::{Deserialize, Serialize};

use crate::types::SemanticKind;

/// A typed variable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Bool(bool),
    Int(i64),
    Real(f32),
    Str(String),
}

impl VarValue {
    /// Representation class of this value.
    pub fn kind(&self) -> SemanticKind {
        match self {
            VarValue::Bool(_) => SemanticKind::Bool,
            VarValue::Int(_) => SemanticKind::Integer,
            VarValue::Real(_) => SemanticKind::Float,
            VarValue::Str(_) => SemanticKind::String,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            VarValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f32> {
        match self {
            VarValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            VarValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for VarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarValue::Bool(b) => write!(f, "{}", b),
            VarValue::Int(v) => write!(f, "{}", v),
            VarValue::Real(v) => write!(f, "{}", v),
            VarValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for VarValue {
    fn from(v: bool) -> Self {
        VarValue::Bool(v)
    }
}

impl From<i64> for VarValue {
    fn from(v: i64) -> Self {
        VarValue::Int(v)
    }
}

impl From<i32> for VarValue {
    fn from(v: i32) -> Self {
        VarValue::Int(v as i64)
    }
}

impl From<u32> for VarValue {
    fn from(v: u32) -> Self {
        VarValue::Int(v as i64)
    }
}

impl From<f32> for VarValue {
    fn from(v: f32) -> Self {
        VarValue::Real(v)
    }
}

impl From<&str> for VarValue {
    fn from(v: &str) -> Self {
        VarValue::Str(v.to_string())
    }
}

impl From<String> for VarValue {
    fn from(v: String) -> Self {
        VarValue::Str(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(VarValue::Bool(true).kind(), SemanticKind::Bool);
        assert_eq!(VarValue::Int(7).kind(), SemanticKind::Integer);
        assert_eq!(VarValue::Real(1.5).kind(), SemanticKind::Float);
        assert_eq!(VarValue::from("x").kind(), SemanticKind::String);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(VarValue::Int(42).as_int(), Some(42));
        assert_eq!(VarValue::Int(42).as_bool(), None);
        assert_eq!(VarValue::from("abc").as_str(), Some("abc"));
    }
}
