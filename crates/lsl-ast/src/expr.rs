// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression nodes of the input tree.

use crate::ops::{BinaryOp, Component, PostfixOp, PrefixOp};
use crate::types::LslType;
use crate::Span;

/// An expression as produced by the front end.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub span: Span,
}

/// The kind of expression.
///
/// Literals keep their source text so the code generator can reproduce them
/// exactly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExprKind {
    /// Decimal integer literal
    Integer(String),
    /// Hexadecimal integer literal, `0x` prefix included
    Hex(String),
    /// Float literal
    Float(String),
    /// String literal, surrounding quotes included
    String(String),
    /// `<x, y, z>`
    Vector {
        x: Box<Expr>,
        y: Box<Expr>,
        z: Box<Expr>,
    },
    /// `<x, y, z, s>`
    Rotation {
        x: Box<Expr>,
        y: Box<Expr>,
        z: Box<Expr>,
        s: Box<Expr>,
    },
    /// `[a, b, ...]`
    List(Vec<Expr>),
    /// Variable or library constant reference
    Ident(String),
    /// `v.x`
    Component {
        object: Box<Expr>,
        component: Component,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Prefix {
        op: PrefixOp,
        operand: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Cast {
        ty: LslType,
        operand: Box<Expr>,
    },
    Paren(Box<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut e = self;
        while let ExprKind::Paren(inner) = &e.kind {
            e = inner;
        }
        e
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Integer(_) | ExprKind::Hex(_) | ExprKind::Float(_) | ExprKind::String(_)
        )
    }
}
