// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Online dead-code classification.
//!
//! Each code scope owns a [`ScopeAnalyzer`]. Statements are fed to it in
//! order as they are built, and each one is classified exactly once, at the
//! moment it is added, against the constant jumps and return path seen so far.

use lsl_ast::Span;

use crate::error::InternalError;
use crate::tree::{ConstantJump, DeadCodeSegment, DeadCodeType, NodeId, StatementKind, SyntaxTree};

/// What the analyzer needs to know about a statement.
#[derive(Debug, Clone, Default)]
pub struct StatementFacts {
    pub has_return_path: bool,
    /// The jump this statement always performs, if any.
    pub constant_jump: Option<ConstantJump>,
}

/// The analysis of a closed scope.
#[derive(Debug, Clone, Default)]
pub struct ScopeSummary {
    pub statements: Vec<NodeId>,
    pub dead_segments: Vec<DeadCodeSegment>,
    pub constant_jumps: Vec<ConstantJump>,
    pub has_return_path: bool,
    pub return_path: Option<NodeId>,
}

#[derive(Debug)]
pub struct ScopeAnalyzer {
    scope_id: u32,
    single_statement: bool,
    statements: Vec<NodeId>,
    inside_dead: bool,
    in_jump_over: bool,
    jump_over_end: usize,
    has_return_path: bool,
    return_path: Option<NodeId>,
    open_segments: Vec<DeadCodeSegment>,
    closed_segments: Vec<DeadCodeSegment>,
    constant_jumps: Vec<ConstantJump>,
}

impl ScopeAnalyzer {
    pub fn new(scope_id: u32, single_statement: bool) -> Self {
        Self {
            scope_id,
            single_statement,
            statements: Vec::new(),
            inside_dead: false,
            in_jump_over: false,
            jump_over_end: 0,
            has_return_path: false,
            return_path: None,
            open_segments: Vec::new(),
            closed_segments: Vec::new(),
            constant_jumps: Vec::new(),
        }
    }

    /// Index the next added statement will get.
    pub fn next_index(&self) -> usize {
        self.statements.len()
    }

    pub fn scope_id(&self) -> u32 {
        self.scope_id
    }

    /// Append a statement and classify it.
    pub fn add(
        &mut self,
        tree: &mut SyntaxTree,
        id: NodeId,
        facts: StatementFacts,
    ) -> Result<DeadCodeType, InternalError> {
        let index = self.statements.len();
        if let Some(&prev) = self.statements.last() {
            tree.stmt_mut(prev)
                .ok_or(InternalError::UnexpectedNode(prev, "statement"))?
                .info
                .is_last = false;
        }
        self.statements.push(id);
        let span = tree.span(id);

        if self.after_return_only() && reached_by_live_jump(tree, id) {
            tracing::trace!(label = ?id, "label revives code after return path");
            self.has_return_path = false;
            self.return_path = None;
            if self.inside_dead {
                self.inside_dead = false;
                if let Some(segment) = self.open_segments.pop() {
                    self.closed_segments.push(segment);
                }
            }
        }

        if !self.inside_dead {
            if let Some(reason) = self.check_jumps(index) {
                self.open_segment(reason, span);
            }
        }

        if !self.in_jump_over && !self.single_statement {
            if !self.has_return_path && facts.has_return_path {
                self.has_return_path = true;
                self.return_path = Some(id);
            } else if self.has_return_path && !self.inside_dead {
                self.open_segment(DeadCodeType::AfterReturnPath, span);
            }
        } else {
            self.has_return_path = facts.has_return_path;
            self.return_path = facts.has_return_path.then_some(id);
        }

        let dead = if self.in_jump_over && index >= self.jump_over_end {
            self.in_jump_over = false;
            self.inside_dead = false;
            if let Some(segment) = self.open_segments.pop() {
                self.closed_segments.push(segment);
            }
            DeadCodeType::None
        } else if self.in_jump_over {
            DeadCodeType::JumpOverCode
        } else if self.inside_dead {
            self.open_segments
                .last()
                .map(|s| s.reason)
                .unwrap_or(DeadCodeType::AfterReturnPath)
        } else {
            DeadCodeType::None
        };

        if dead.is_dead() {
            if let Some(segment) = self.open_segments.last_mut() {
                segment.statements.push(id);
                segment.span = segment.span.to(span);
            }
        }

        let stmt = tree
            .stmt_mut(id)
            .ok_or(InternalError::UnexpectedNode(id, "statement"))?;
        stmt.info.index = index;
        stmt.info.is_last = true;
        stmt.info.scope_id = self.scope_id;
        stmt.info.dead = dead;
        stmt.info.has_return_path = facts.has_return_path;
        stmt.info.return_path = facts.has_return_path.then_some(id);

        if !dead.is_dead() {
            if let Some(jump) = facts.constant_jump {
                if let StatementKind::Jump { constant, .. } = &mut stmt.kind {
                    *constant = true;
                }
                self.constant_jumps.push(jump);
            }
        }

        Ok(dead)
    }

    /// Whether the only thing making the next statement dead is an earlier
    /// return path.
    fn after_return_only(&self) -> bool {
        if !self.has_return_path || self.in_jump_over || self.single_statement {
            return false;
        }
        !self.inside_dead
            || self
                .open_segments
                .last()
                .is_some_and(|s| s.reason == DeadCodeType::AfterReturnPath)
    }

    /// The first registered jump that makes statement `index` unreachable.
    fn check_jumps(&mut self, index: usize) -> Option<DeadCodeType> {
        let scope_id = self.scope_id;
        let (reason, end) = self.constant_jumps.iter().find_map(|jump| {
            if jump.target_scope != scope_id {
                Some((DeadCodeType::AfterJumpOutOfScope, None))
            } else if jump.jump_index < index && index < jump.target_index {
                Some((DeadCodeType::JumpOverCode, Some(jump.target_index)))
            } else if jump.jump_index < index && jump.target_index <= jump.jump_index {
                Some((DeadCodeType::AfterJumpLoopForever, None))
            } else {
                None
            }
        })?;
        if let Some(end) = end {
            self.in_jump_over = true;
            self.jump_over_end = end;
        }
        Some(reason)
    }

    fn open_segment(&mut self, reason: DeadCodeType, span: Span) {
        self.inside_dead = true;
        self.open_segments.push(DeadCodeSegment {
            reason,
            statements: Vec::new(),
            span,
        });
    }

    /// Close the scope, flushing any open dead segments.
    pub fn finish(mut self) -> ScopeSummary {
        while let Some(segment) = self.open_segments.pop() {
            self.closed_segments.push(segment);
        }
        self.closed_segments.retain(|s| !s.statements.is_empty());
        self.closed_segments.sort_by_key(|s| s.span.start);
        ScopeSummary {
            statements: self.statements,
            dead_segments: self.closed_segments,
            constant_jumps: self.constant_jumps,
            has_return_path: self.has_return_path,
            return_path: self.return_path,
        }
    }
}

/// Whether `label` is the target of a jump that can run. Every jump in the
/// label's list was built before the label was added, so all of them sit
/// above it; a jump counts when neither it nor an enclosing statement is dead.
fn reached_by_live_jump(tree: &SyntaxTree, label: NodeId) -> bool {
    let Some(StatementKind::Label { jumps, .. }) = tree.stmt(label).map(|s| &s.kind) else {
        return false;
    };
    jumps.iter().any(|&jump| {
        std::iter::once(jump)
            .chain(tree.walk_ancestors(jump))
            .filter_map(|node| tree.stmt(node))
            .all(|stmt| !stmt.info.dead.is_dead())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeKind, Statement, StatementInfo};

    struct Harness {
        tree: SyntaxTree,
        analyzer: ScopeAnalyzer,
        pos: usize,
    }

    impl Harness {
        fn new(scope_id: u32) -> Self {
            Self {
                tree: SyntaxTree::new(),
                analyzer: ScopeAnalyzer::new(scope_id, false),
                pos: 0,
            }
        }

        fn stmt(&mut self, kind: StatementKind) -> NodeId {
            self.pos += 10;
            self.tree.alloc(
                NodeKind::Stmt(Statement {
                    kind,
                    info: StatementInfo::default(),
                }),
                Span::new(self.pos, self.pos + 5),
            )
        }

        fn plain(&mut self) -> DeadCodeType {
            let id = self.stmt(StatementKind::Empty);
            self.analyzer.add(&mut self.tree, id, StatementFacts::default()).unwrap()
        }

        fn ret(&mut self) -> DeadCodeType {
            let id = self.stmt(StatementKind::Return(None));
            let facts = StatementFacts {
                has_return_path: true,
                constant_jump: None,
            };
            self.analyzer.add(&mut self.tree, id, facts).unwrap()
        }

        fn jump(&mut self, target_scope: u32, target_index: usize) -> (NodeId, DeadCodeType) {
            let id = self.stmt(StatementKind::Jump {
                label: "L".into(),
                target: None,
                constant: false,
            });
            let facts = StatementFacts {
                has_return_path: false,
                constant_jump: Some(ConstantJump {
                    jump: id,
                    jump_index: self.analyzer.next_index(),
                    label: NodeId(0),
                    target_scope,
                    target_index,
                }),
            };
            let dead = self.analyzer.add(&mut self.tree, id, facts).unwrap();
            (id, dead)
        }

        fn label(&mut self) -> DeadCodeType {
            self.label_reached_by(vec![])
        }

        fn label_reached_by(&mut self, jumps: Vec<NodeId>) -> DeadCodeType {
            let id = self.stmt(StatementKind::Label { name: "L".into(), jumps });
            self.analyzer.add(&mut self.tree, id, StatementFacts::default()).unwrap()
        }

        /// A jump that may not run, such as one under an `if`.
        fn maybe_jump(&mut self) -> NodeId {
            let id = self.stmt(StatementKind::Jump {
                label: "L".into(),
                target: None,
                constant: false,
            });
            self.analyzer.add(&mut self.tree, id, StatementFacts::default()).unwrap();
            id
        }
    }

    #[test]
    fn jump_over_ends_at_label() {
        let mut h = Harness::new(1);
        let (jump, dead) = h.jump(1, 2);
        assert_eq!(dead, DeadCodeType::None);
        assert_eq!(h.plain(), DeadCodeType::JumpOverCode);
        assert_eq!(h.label(), DeadCodeType::None);
        assert_eq!(h.plain(), DeadCodeType::None);
        assert!(matches!(
            h.tree.stmt(jump).map(|s| &s.kind),
            Some(StatementKind::Jump { constant: true, .. })
        ));
        let summary = h.analyzer.finish();
        assert_eq!(summary.dead_segments.len(), 1);
        assert_eq!(summary.dead_segments[0].reason, DeadCodeType::JumpOverCode);
        assert_eq!(summary.dead_segments[0].statements.len(), 1);
    }

    #[test]
    fn code_after_return_is_dead() {
        let mut h = Harness::new(1);
        assert_eq!(h.ret(), DeadCodeType::None);
        assert_eq!(h.plain(), DeadCodeType::AfterReturnPath);
        assert_eq!(h.plain(), DeadCodeType::AfterReturnPath);
        let summary = h.analyzer.finish();
        assert!(summary.has_return_path);
        assert_eq!(summary.dead_segments.len(), 1);
        assert_eq!(summary.dead_segments[0].statements.len(), 2);
        assert_eq!(summary.dead_segments[0].span, Span::new(20, 35));
    }

    #[test]
    fn backward_jump_loops_forever() {
        let mut h = Harness::new(1);
        assert_eq!(h.label(), DeadCodeType::None);
        assert_eq!(h.plain(), DeadCodeType::None);
        h.jump(1, 0);
        assert_eq!(h.plain(), DeadCodeType::AfterJumpLoopForever);
        assert_eq!(h.label(), DeadCodeType::AfterJumpLoopForever);
    }

    #[test]
    fn jump_out_of_scope_kills_the_rest() {
        let mut h = Harness::new(2);
        h.plain();
        h.jump(1, 5);
        assert_eq!(h.plain(), DeadCodeType::AfterJumpOutOfScope);
        assert_eq!(h.ret(), DeadCodeType::AfterJumpOutOfScope);
    }

    #[test]
    fn return_inside_jump_over_does_not_stick() {
        // jump L; return; @L; stmt;
        let mut h = Harness::new(1);
        h.jump(1, 2);
        assert_eq!(h.ret(), DeadCodeType::JumpOverCode);
        assert_eq!(h.label(), DeadCodeType::None);
        assert_eq!(h.plain(), DeadCodeType::None);
        let summary = h.analyzer.finish();
        assert!(!summary.has_return_path);
    }

    #[test]
    fn return_at_jump_target_boundary() {
        // jump L; stmt; @L; return; stmt;
        let mut h = Harness::new(1);
        h.jump(1, 2);
        assert_eq!(h.plain(), DeadCodeType::JumpOverCode);
        assert_eq!(h.label(), DeadCodeType::None);
        assert_eq!(h.ret(), DeadCodeType::None);
        assert_eq!(h.plain(), DeadCodeType::AfterReturnPath);
        let summary = h.analyzer.finish();
        assert_eq!(summary.dead_segments.len(), 2);
        assert_eq!(summary.dead_segments[0].reason, DeadCodeType::JumpOverCode);
        assert_eq!(summary.dead_segments[1].reason, DeadCodeType::AfterReturnPath);
    }

    #[test]
    fn dead_jump_is_not_registered() {
        // return; jump L; @L;
        let mut h = Harness::new(1);
        h.ret();
        let (jump, dead) = h.jump(1, 2);
        assert_eq!(dead, DeadCodeType::AfterReturnPath);
        assert_eq!(h.label(), DeadCodeType::AfterReturnPath);
        assert!(matches!(
            h.tree.stmt(jump).map(|s| &s.kind),
            Some(StatementKind::Jump { constant: false, .. })
        ));
        assert!(h.analyzer.finish().constant_jumps.is_empty());
    }

    #[test]
    fn label_reached_from_above_revives_after_return() {
        // if (c) jump L; return; stmt; @L; stmt;
        let mut h = Harness::new(1);
        let jump = h.maybe_jump();
        h.ret();
        assert_eq!(h.plain(), DeadCodeType::AfterReturnPath);
        assert_eq!(h.label_reached_by(vec![jump]), DeadCodeType::None);
        assert_eq!(h.plain(), DeadCodeType::None);
        let summary = h.analyzer.finish();
        assert!(!summary.has_return_path);
        assert_eq!(summary.dead_segments.len(), 1);
        assert_eq!(summary.dead_segments[0].statements.len(), 1);
    }

    #[test]
    fn revived_scope_can_return_again() {
        // if (c) jump L; return; @L; return; stmt;
        let mut h = Harness::new(1);
        let jump = h.maybe_jump();
        h.ret();
        assert_eq!(h.label_reached_by(vec![jump]), DeadCodeType::None);
        assert_eq!(h.ret(), DeadCodeType::None);
        assert_eq!(h.plain(), DeadCodeType::AfterReturnPath);
        assert!(h.analyzer.finish().has_return_path);
    }

    #[test]
    fn label_reached_only_by_dead_jump_stays_dead() {
        // return; jump L; @L; stmt;
        let mut h = Harness::new(1);
        h.ret();
        let (jump, _) = h.jump(1, 2);
        assert_eq!(h.label_reached_by(vec![jump]), DeadCodeType::AfterReturnPath);
        assert_eq!(h.plain(), DeadCodeType::AfterReturnPath);
    }

    #[test]
    fn last_statement_flag_moves() {
        let mut h = Harness::new(1);
        h.plain();
        h.plain();
        let summary = h.analyzer.finish();
        let first = h.tree.stmt(summary.statements[0]).unwrap();
        let second = h.tree.stmt(summary.statements[1]).unwrap();
        assert!(!first.info.is_last);
        assert!(second.info.is_last);
        assert_eq!(second.info.index, 1);
        assert_eq!(second.info.scope_id, 1);
    }

    #[test]
    fn single_statement_scope_reports_return_path() {
        let mut tree = SyntaxTree::new();
        let mut analyzer = ScopeAnalyzer::new(3, true);
        let id = tree.alloc(
            NodeKind::Stmt(Statement {
                kind: StatementKind::Return(None),
                info: StatementInfo::default(),
            }),
            Span::new(0, 7),
        );
        let facts = StatementFacts {
            has_return_path: true,
            constant_jump: None,
        };
        assert_eq!(analyzer.add(&mut tree, id, facts).unwrap(), DeadCodeType::None);
        let summary = analyzer.finish();
        assert!(summary.has_return_path);
        assert_eq!(summary.return_path, Some(id));
        assert!(summary.dead_segments.is_empty());
    }

    #[test]
    fn non_statement_node_is_an_internal_error() {
        let mut tree = SyntaxTree::new();
        let bogus = tree.alloc_error(Span::default());
        let mut analyzer = ScopeAnalyzer::new(1, false);
        assert_eq!(
            analyzer.add(&mut tree, bogus, StatementFacts::default()),
            Err(InternalError::UnexpectedNode(bogus, "statement"))
        );
    }
}
