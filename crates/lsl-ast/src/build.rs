// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Shorthand constructors for building trees by hand.
//!
//! Nodes get an empty span unless one is attached with `at`.

use crate::decl::{EventHandler, FunctionDecl, Param, Script, StateDecl, VarDecl};
use crate::expr::{Expr, ExprKind};
use crate::ops::{BinaryOp, Component, PostfixOp, PrefixOp};
use crate::stmt::{Block, ElseIf, Stmt, StmtKind};
use crate::types::LslType;
use crate::{Span, DEFAULT_STATE};

impl Expr {
    pub fn at(mut self, start: usize, end: usize) -> Self {
        self.span = Span::new(start, end);
        self
    }
}

impl Stmt {
    pub fn at(mut self, start: usize, end: usize) -> Self {
        self.span = Span::new(start, end);
        self
    }
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::default())
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Span::default())
}

// =========================================================================
// Expressions
// =========================================================================

pub fn int(value: i64) -> Expr {
    expr(ExprKind::Integer(value.to_string()))
}

pub fn hex(text: &str) -> Expr {
    expr(ExprKind::Hex(text.to_string()))
}

/// Float literal from its source text, e.g. `"1.5"` or `"2."`.
pub fn float(text: &str) -> Expr {
    expr(ExprKind::Float(text.to_string()))
}

/// String literal; `text` is the unquoted body as it appears in source.
pub fn string(text: &str) -> Expr {
    expr(ExprKind::String(format!("\"{text}\"")))
}

pub fn ident(name: &str) -> Expr {
    expr(ExprKind::Ident(name.to_string()))
}

pub fn vector(x: Expr, y: Expr, z: Expr) -> Expr {
    expr(ExprKind::Vector {
        x: Box::new(x),
        y: Box::new(y),
        z: Box::new(z),
    })
}

pub fn rotation(x: Expr, y: Expr, z: Expr, s: Expr) -> Expr {
    expr(ExprKind::Rotation {
        x: Box::new(x),
        y: Box::new(y),
        z: Box::new(z),
        s: Box::new(s),
    })
}

pub fn list(items: Vec<Expr>) -> Expr {
    expr(ExprKind::List(items))
}

pub fn component(object: Expr, component: Component) -> Expr {
    expr(ExprKind::Component {
        object: Box::new(object),
        component,
    })
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call {
        name: name.to_string(),
        args,
    })
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn assign(target: &str, value: Expr) -> Expr {
    binary(BinaryOp::Assign, ident(target), value)
}

pub fn prefix(op: PrefixOp, operand: Expr) -> Expr {
    expr(ExprKind::Prefix {
        op,
        operand: Box::new(operand),
    })
}

pub fn postfix(op: PostfixOp, operand: Expr) -> Expr {
    expr(ExprKind::Postfix {
        op,
        operand: Box::new(operand),
    })
}

pub fn cast(ty: LslType, operand: Expr) -> Expr {
    expr(ExprKind::Cast {
        ty,
        operand: Box::new(operand),
    })
}

pub fn paren(inner: Expr) -> Expr {
    expr(ExprKind::Paren(Box::new(inner)))
}

// =========================================================================
// Statements
// =========================================================================

pub fn empty() -> Stmt {
    stmt(StmtKind::Empty)
}

pub fn expr_stmt(e: Expr) -> Stmt {
    let span = e.span;
    Stmt::new(StmtKind::Expr(e), span)
}

pub fn local(ty: LslType, name: &str, init: Option<Expr>) -> Stmt {
    stmt(StmtKind::Local(var(ty, name, init)))
}

pub fn ret(value: Expr) -> Stmt {
    stmt(StmtKind::Return(Some(value)))
}

pub fn ret_void() -> Stmt {
    stmt(StmtKind::Return(None))
}

pub fn jump(label: &str) -> Stmt {
    stmt(StmtKind::Jump {
        label: label.to_string(),
    })
}

pub fn label(name: &str) -> Stmt {
    stmt(StmtKind::Label {
        name: name.to_string(),
    })
}

pub fn state_change(target: &str) -> Stmt {
    stmt(StmtKind::StateChange {
        target: target.to_string(),
    })
}

pub fn if_(cond: Expr, then_branch: Stmt) -> Stmt {
    stmt(StmtKind::If {
        cond,
        then_branch: Box::new(then_branch),
        else_ifs: Vec::new(),
        else_branch: None,
    })
}

pub fn if_else(cond: Expr, then_branch: Stmt, else_branch: Stmt) -> Stmt {
    if_chain(cond, then_branch, Vec::new(), Some(else_branch))
}

/// `if (cond) then else if (c1) b1 ... else tail`
pub fn if_chain(cond: Expr, then_branch: Stmt, else_ifs: Vec<(Expr, Stmt)>, else_branch: Option<Stmt>) -> Stmt {
    stmt(StmtKind::If {
        cond,
        then_branch: Box::new(then_branch),
        else_ifs: else_ifs
            .into_iter()
            .map(|(cond, body)| ElseIf {
                cond,
                body: Box::new(body),
                span: Span::default(),
            })
            .collect(),
        else_branch: else_branch.map(Box::new),
    })
}

pub fn while_(cond: Expr, body: Stmt) -> Stmt {
    stmt(StmtKind::While {
        cond,
        body: Box::new(body),
    })
}

pub fn do_while(body: Stmt, cond: Expr) -> Stmt {
    stmt(StmtKind::DoWhile {
        body: Box::new(body),
        cond,
    })
}

pub fn for_(init: Vec<Expr>, cond: Option<Expr>, step: Vec<Expr>, body: Stmt) -> Stmt {
    stmt(StmtKind::For {
        init,
        cond,
        step,
        body: Box::new(body),
    })
}

pub fn block(stmts: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Block(Block::new(stmts, Span::default())))
}

// =========================================================================
// Declarations
// =========================================================================

pub fn var(ty: LslType, name: &str, init: Option<Expr>) -> VarDecl {
    VarDecl {
        name: name.to_string(),
        ty,
        init,
        span: Span::default(),
    }
}

pub fn param(ty: LslType, name: &str) -> Param {
    Param {
        name: name.to_string(),
        ty,
        span: Span::default(),
    }
}

pub fn function(return_type: LslType, name: &str, params: Vec<Param>, body: Vec<Stmt>) -> FunctionDecl {
    FunctionDecl {
        name: name.to_string(),
        return_type,
        params,
        body: Block::new(body, Span::default()),
        span: Span::default(),
    }
}

pub fn event(name: &str, params: Vec<Param>, body: Vec<Stmt>) -> EventHandler {
    EventHandler {
        name: name.to_string(),
        params,
        body: Block::new(body, Span::default()),
        span: Span::default(),
    }
}

pub fn state(name: &str, handlers: Vec<EventHandler>) -> StateDecl {
    StateDecl {
        name: name.to_string(),
        handlers,
        span: Span::default(),
    }
}

/// A script whose default state runs `body` in `state_entry`.
pub fn script_with_entry(body: Vec<Stmt>) -> Script {
    Script {
        default_state: Some(state(DEFAULT_STATE, vec![event("state_entry", vec![], body)])),
        ..Script::default()
    }
}
