// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement nodes of the input tree.

use crate::decl::VarDecl;
use crate::expr::Expr;
use crate::Span;

/// A braced statement list.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub stmts: Vec<Stmt>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Self { stmts, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stmt {
    pub kind: StmtKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

/// `else if (cond) body`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElseIf {
    pub cond: Expr,
    pub body: Box<Stmt>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

/// The kind of statement.
///
/// Branch and loop bodies are statements: a `Block` body is a braced scope,
/// anything else is a braceless single-statement scope.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StmtKind {
    /// `;`
    Empty,
    Expr(Expr),
    Local(VarDecl),
    Return(Option<Expr>),
    Jump {
        label: String,
    },
    Label {
        name: String,
    },
    StateChange {
        target: String,
    },
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        #[cfg_attr(feature = "serde", serde(default))]
        else_ifs: Vec<ElseIf>,
        #[cfg_attr(feature = "serde", serde(default))]
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        #[cfg_attr(feature = "serde", serde(default))]
        init: Vec<Expr>,
        #[cfg_attr(feature = "serde", serde(default))]
        cond: Option<Expr>,
        #[cfg_attr(feature = "serde", serde(default))]
        step: Vec<Expr>,
        body: Box<Stmt>,
    },
    Block(Block),
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, StmtKind::Block(_))
    }
}
