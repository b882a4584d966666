// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Label pre-pass.
//!
//! Jumps may target labels that appear later in the body, so every label is
//! registered before any statement is resolved. Scope ids are handed out in
//! exactly the order the resolution pass enters scopes, which lets a label's
//! scope id and statement index be fixed here and trusted later.

use std::collections::{HashMap, VecDeque};

use lsl_ast::{Block, Stmt, StmtKind};

use crate::error::{ValidationError, ValidationErrorKind};
use crate::listener::Pending;
use crate::tree::{NodeId, NodeKind, Statement, StatementInfo, StatementKind, SyntaxTree};

/// Labels of one function or event body.
#[derive(Debug, Default)]
pub struct LabelTable {
    /// First definition of each name.
    defined: HashMap<String, NodeId>,
    /// Every label statement in traversal order, redefinitions included.
    in_order: VecDeque<NodeId>,
}

impl LabelTable {
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.defined.get(name).copied()
    }

    /// The pre-allocated node for the next label the resolution pass meets.
    pub fn next_in_order(&mut self) -> Option<NodeId> {
        self.in_order.pop_front()
    }

    pub fn len(&self) -> usize {
        self.defined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defined.is_empty()
    }
}

/// Pre-allocate every label statement in `body`.
pub(crate) fn collect_labels(
    tree: &mut SyntaxTree,
    body: &Block,
    pending: &mut Vec<Pending>,
) -> LabelTable {
    let mut collector = LabelCollector {
        tree,
        pending,
        table: LabelTable::default(),
        next_scope_id: 0,
    };
    collector.visit_scope(&body.stmts);
    tracing::trace!(labels = collector.table.len(), "label pre-pass");
    collector.table
}

struct LabelCollector<'a> {
    tree: &'a mut SyntaxTree,
    pending: &'a mut Vec<Pending>,
    table: LabelTable,
    next_scope_id: u32,
}

impl LabelCollector<'_> {
    fn visit_scope(&mut self, stmts: &[Stmt]) {
        self.next_scope_id += 1;
        let scope_id = self.next_scope_id;
        for (index, stmt) in stmts.iter().enumerate() {
            self.visit_stmt(stmt, scope_id, index);
        }
    }

    fn visit_body(&mut self, body: &Stmt) {
        match &body.kind {
            StmtKind::Block(block) => self.visit_scope(&block.stmts),
            _ => self.visit_scope(std::slice::from_ref(body)),
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt, scope_id: u32, index: usize) {
        match &stmt.kind {
            StmtKind::Label { name } => self.define(name, stmt, scope_id, index),
            StmtKind::If {
                then_branch,
                else_ifs,
                else_branch,
                ..
            } => {
                self.visit_body(then_branch);
                for branch in else_ifs {
                    self.visit_body(&branch.body);
                }
                if let Some(else_branch) = else_branch {
                    self.visit_body(else_branch);
                }
            }
            StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::For { body, .. } => self.visit_body(body),
            StmtKind::Block(block) => self.visit_scope(&block.stmts),
            StmtKind::Empty
            | StmtKind::Expr(_)
            | StmtKind::Local(_)
            | StmtKind::Return(_)
            | StmtKind::Jump { .. }
            | StmtKind::StateChange { .. } => {}
        }
    }

    fn define(&mut self, name: &str, stmt: &Stmt, scope_id: u32, index: usize) {
        let id = self.tree.alloc(
            NodeKind::Stmt(Statement {
                kind: StatementKind::Label {
                    name: name.to_string(),
                    jumps: Vec::new(),
                },
                info: StatementInfo {
                    index,
                    scope_id,
                    ..StatementInfo::default()
                },
            }),
            stmt.span,
        );
        match self.table.defined.get(name) {
            Some(&previous) => {
                let previous = self.tree.span(previous);
                self.tree.mark_error(id);
                self.pending.push(Pending::Error(ValidationError::new(
                    ValidationErrorKind::LabelRedefined {
                        name: name.to_string(),
                        previous,
                    },
                    stmt.span,
                )));
            }
            None => {
                self.table.defined.insert(name.to_string(), id);
            }
        }
        self.table.in_order.push_back(id);
    }
}
