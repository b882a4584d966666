// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Semantic validation for LSL scripts.
//!
//! [`Validator`] takes a parse tree from `lsl-ast`, resolves every name
//! against the script and a [`lsl_library::LibraryDataProvider`], type checks
//! it, and classifies unreachable code as statements are appended to their
//! scopes. The result is an annotated [`SyntaxTree`] arena that the code
//! generator consumes. Diagnostics go to a [`ValidationListener`].

pub mod dead_code;
pub mod error;
mod expressions;
pub mod listener;
pub mod operators;
pub mod prepass;
pub mod scope;
pub mod tree;
mod validator;

pub use error::{InternalError, ValidationError, ValidationErrorKind, ValidationWarning, WarningKind};
pub use expressions::normalize_string;
pub use listener::{ValidationListener, ValidationReport};
pub use tree::{
    Binding, CallTarget, CodeScope, ConstantJump, DeadCodeSegment, DeadCodeType, ElseIfBranch, EventNode,
    Expression, ExpressionKind, FunctionNode, Node, NodeId, NodeKind, ScopeKind, ScriptNode, StateNode,
    Statement, StatementInfo, StatementKind, SyntaxTree, VarDecl, VarScope,
};
pub use validator::{ValidatedScript, Validator, ValidatorOptions};
