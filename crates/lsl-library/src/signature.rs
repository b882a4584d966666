// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Library signature records.

use std::fmt;

use lsl_ast::LslType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryParam {
    pub name: String,
    pub ty: LslType,
    /// Accepts any number of trailing arguments. A `Void` variadic accepts
    /// arguments of any type.
    #[serde(default)]
    pub variadic: bool,
}

impl LibraryParam {
    pub fn new(name: &str, ty: LslType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            variadic: false,
        }
    }

    pub fn variadic(name: &str, ty: LslType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            variadic: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryFunction {
    pub name: String,
    #[serde(default = "void")]
    pub return_type: LslType,
    #[serde(default)]
    pub params: Vec<LibraryParam>,
    /// Dispatched through the runtime's generic `modInvoke` entry points.
    #[serde(default)]
    pub mod_invoke: bool,
    #[serde(default)]
    pub deprecated: bool,
}

fn void() -> LslType {
    LslType::Void
}

impl LibraryFunction {
    pub fn new(name: &str, return_type: LslType, params: Vec<LibraryParam>) -> Self {
        Self {
            name: name.to_string(),
            return_type,
            params,
            mod_invoke: false,
            deprecated: false,
        }
    }

    pub fn mod_invoke(mut self) -> Self {
        self.mod_invoke = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn is_variadic(&self) -> bool {
        self.params.last().is_some_and(|p| p.variadic)
    }

    /// Number of parameters that must always be supplied.
    pub fn fixed_param_count(&self) -> usize {
        if self.is_variadic() {
            self.params.len() - 1
        } else {
            self.params.len()
        }
    }

    /// Declared type of the parameter that receives argument `index`.
    pub fn param_type_at(&self, index: usize) -> Option<LslType> {
        match self.params.get(index) {
            Some(p) => Some(p.ty),
            None => self.params.last().filter(|p| p.variadic).map(|p| p.ty),
        }
    }
}

impl fmt::Display for LibraryFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.return_type.is_void() {
            write!(f, "{} ", self.return_type)?;
        }
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if p.variadic {
                write!(f, "params ")?;
            }
            write!(f, "{} {}", p.ty, p.name)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConstant {
    pub name: String,
    pub ty: LslType,
    /// Value in source form: `3.14159265`, `"text"`, `<0.0, 0.0, 0.0>`.
    pub value: String,
    /// Emit the value instead of the name when generating code.
    #[serde(default)]
    pub expand: bool,
    #[serde(default)]
    pub deprecated: bool,
}

impl LibraryConstant {
    pub fn new(name: &str, ty: LslType, value: &str) -> Self {
        Self {
            name: name.to_string(),
            ty,
            value: value.to_string(),
            expand: false,
            deprecated: false,
        }
    }

    pub fn expand(mut self) -> Self {
        self.expand = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEvent {
    pub name: String,
    #[serde(default)]
    pub params: Vec<LibraryParam>,
    #[serde(default)]
    pub deprecated: bool,
}

impl LibraryEvent {
    pub fn new(name: &str, params: Vec<LibraryParam>) -> Self {
        Self {
            name: name.to_string(),
            params,
            deprecated: false,
        }
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variadic_parameter_types() {
        let f = LibraryFunction::new(
            "modSendCommand",
            LslType::String,
            vec![
                LibraryParam::new("module", LslType::String),
                LibraryParam::variadic("args", LslType::Void),
            ],
        );
        assert!(f.is_variadic());
        assert_eq!(f.fixed_param_count(), 1);
        assert_eq!(f.param_type_at(0), Some(LslType::String));
        assert_eq!(f.param_type_at(5), Some(LslType::Void));
    }

    #[test]
    fn display_signature() {
        let f = LibraryFunction::new(
            "llSay",
            LslType::Void,
            vec![
                LibraryParam::new("channel", LslType::Integer),
                LibraryParam::new("msg", LslType::String),
            ],
        );
        assert_eq!(f.to_string(), "llSay(integer channel, string msg)");
        assert_eq!(f.param_type_at(2), None);
    }
}
