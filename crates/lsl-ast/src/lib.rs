// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parse tree types for LSL scripts.
//!
//! These are the trees an external front end hands to the validator. They are
//! plain owned data: no resolution results, no parent links. The validator
//! builds its own annotated arena from them.

pub mod span;
pub mod types;
pub mod ops;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod build;

pub use span::{Span, LineMap};
pub use types::LslType;
pub use ops::{BinaryOp, Component, PostfixOp, PrefixOp};
pub use expr::{Expr, ExprKind};
pub use stmt::{Block, ElseIf, Stmt, StmtKind};
pub use decl::{EventHandler, FunctionDecl, Param, Script, StateDecl, VarDecl};

/// Name of the state every script must declare.
pub const DEFAULT_STATE: &str = "default";
