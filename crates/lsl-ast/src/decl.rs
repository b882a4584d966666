// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declarations: globals, functions, states and the script root.

use crate::expr::Expr;
use crate::stmt::Block;
use crate::types::LslType;
use crate::Span;

/// A global or local variable declaration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarDecl {
    pub name: String,
    pub ty: LslType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub init: Option<Expr>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    pub name: String,
    pub ty: LslType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

/// A user-defined function. `return_type` is `Void` when omitted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionDecl {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default = "void"))]
    pub return_type: LslType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: Vec<Param>,
    pub body: Block,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

#[cfg(feature = "serde")]
fn void() -> LslType {
    LslType::Void
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventHandler {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: Vec<Param>,
    pub body: Block,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateDecl {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub handlers: Vec<EventHandler>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

/// The root of a parsed script.
///
/// The default state is kept apart from named states. A front end that sees a
/// second `default` block, or a `state default`, should put it in `states` so
/// the validator can report it.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Script {
    #[cfg_attr(feature = "serde", serde(default))]
    pub globals: Vec<VarDecl>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub functions: Vec<FunctionDecl>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_state: Option<StateDecl>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub states: Vec<StateDecl>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}
