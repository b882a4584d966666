// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! LSL value types.

use std::fmt;

/// The value types of the language, plus `Void` for functions that return nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LslType {
    Integer,
    Float,
    String,
    Key,
    Vector,
    Rotation,
    List,
    Void,
}

impl LslType {
    pub const VALUE_TYPES: [LslType; 7] = [
        LslType::Integer,
        LslType::Float,
        LslType::String,
        LslType::Key,
        LslType::Vector,
        LslType::Rotation,
        LslType::List,
    ];

    /// Parse a source-level type keyword. `quaternion` is accepted as an alias for `rotation`.
    pub fn from_name(name: &str) -> Option<LslType> {
        match name {
            "integer" => Some(LslType::Integer),
            "float" => Some(LslType::Float),
            "string" => Some(LslType::String),
            "key" => Some(LslType::Key),
            "vector" => Some(LslType::Vector),
            "rotation" | "quaternion" => Some(LslType::Rotation),
            "list" => Some(LslType::List),
            "void" => Some(LslType::Void),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LslType::Integer => "integer",
            LslType::Float => "float",
            LslType::String => "string",
            LslType::Key => "key",
            LslType::Vector => "vector",
            LslType::Rotation => "rotation",
            LslType::List => "list",
            LslType::Void => "void",
        }
    }

    /// Capitalized name, used when building host identifiers.
    pub fn title(self) -> &'static str {
        match self {
            LslType::Integer => "Integer",
            LslType::Float => "Float",
            LslType::String => "String",
            LslType::Key => "Key",
            LslType::Vector => "Vector",
            LslType::Rotation => "Rotation",
            LslType::List => "List",
            LslType::Void => "Void",
        }
    }

    pub fn is_void(self) -> bool {
        self == LslType::Void
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, LslType::Integer | LslType::Float)
    }

    /// String and key share a representation and convert implicitly.
    pub fn is_string_like(self) -> bool {
        matches!(self, LslType::String | LslType::Key)
    }
}

impl fmt::Display for LslType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for ty in LslType::VALUE_TYPES {
            assert_eq!(LslType::from_name(ty.name()), Some(ty));
        }
        assert_eq!(LslType::from_name("quaternion"), Some(LslType::Rotation));
        assert_eq!(LslType::from_name("bool"), None);
    }

    #[test]
    fn classification() {
        assert!(LslType::Float.is_numeric());
        assert!(!LslType::Vector.is_numeric());
        assert!(LslType::Key.is_string_like());
        assert!(LslType::Void.is_void());
        assert_eq!(LslType::Rotation.to_string(), "rotation");
    }
}
