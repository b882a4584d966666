// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The annotated syntax tree.
//!
//! Nodes live in one arena and refer to each other by [`NodeId`]. Parent
//! links are arena indices, so the tree has no ownership cycles and can be
//! walked upward without borrowing trouble.

use lsl_ast::{BinaryOp, Component, LslType, PostfixOp, PrefixOp, Span};
use lsl_library::LibraryConstant;

/// Index of a node in a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub has_errors: bool,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Script(ScriptNode),
    GlobalVar(VarDecl),
    Function(FunctionNode),
    Param(VarDecl),
    State(StateNode),
    EventHandler(EventNode),
    Scope(CodeScope),
    Stmt(Statement),
    Expr(Expression),
    /// Placeholder for something that could not be built.
    Error,
}

// =========================================================================
// Declarations
// =========================================================================

#[derive(Debug, Clone, Default)]
pub struct ScriptNode {
    pub globals: Vec<NodeId>,
    pub functions: Vec<NodeId>,
    pub default_state: Option<NodeId>,
    pub states: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarScope {
    Global,
    Local,
    Parameter,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: String,
    pub ty: LslType,
    pub scope: VarScope,
    pub init: Option<NodeId>,
    /// Every expression that reads or writes this variable.
    pub references: Vec<NodeId>,
    /// Scope id of the declaring block; 0 for globals.
    pub declared_in_scope: u32,
}

#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub name: String,
    pub return_type: LslType,
    pub params: Vec<NodeId>,
    /// Filled in once the body is resolved.
    pub body: Option<NodeId>,
    /// Call sites.
    pub references: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct StateNode {
    pub name: String,
    pub is_default: bool,
    pub handlers: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct EventNode {
    pub name: String,
    pub params: Vec<NodeId>,
    pub body: NodeId,
}

// =========================================================================
// Code scopes and statements
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    FunctionBody,
    EventBody,
    IfBranch,
    ElseIfBranch,
    ElseBranch,
    WhileBody,
    DoWhileBody,
    ForBody,
    AnonymousBlock,
}

impl ScopeKind {
    pub fn is_loop_body(self) -> bool {
        matches!(
            self,
            ScopeKind::WhileBody | ScopeKind::DoWhileBody | ScopeKind::ForBody
        )
    }
}

/// Why a statement can never execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadCodeType {
    #[default]
    None,
    AfterJumpOutOfScope,
    AfterJumpLoopForever,
    JumpOverCode,
    AfterReturnPath,
}

impl DeadCodeType {
    pub fn is_dead(self) -> bool {
        self != DeadCodeType::None
    }

    pub fn describe(self) -> &'static str {
        match self {
            DeadCodeType::None => "live code",
            DeadCodeType::AfterJumpOutOfScope => "code after a jump out of its scope",
            DeadCodeType::AfterJumpLoopForever => "code after a jump that loops forever",
            DeadCodeType::JumpOverCode => "code that is always jumped over",
            DeadCodeType::AfterReturnPath => "code after a return path",
        }
    }
}

/// A jump whose target is known statically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantJump {
    /// The jump statement, or the control statement standing in for it.
    pub jump: NodeId,
    pub jump_index: usize,
    pub label: NodeId,
    pub target_scope: u32,
    pub target_index: usize,
}

/// A run of consecutive dead statements in one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadCodeSegment {
    pub reason: DeadCodeType,
    pub statements: Vec<NodeId>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CodeScope {
    pub scope_id: u32,
    pub kind: ScopeKind,
    /// A braceless body holding exactly one statement.
    pub single_statement: bool,
    pub statements: Vec<NodeId>,
    pub dead_segments: Vec<DeadCodeSegment>,
    pub constant_jumps: Vec<ConstantJump>,
    pub has_return_path: bool,
    pub return_path: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatementInfo {
    pub index: usize,
    pub is_last: bool,
    pub scope_id: u32,
    pub dead: DeadCodeType,
    pub has_return_path: bool,
    pub return_path: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub info: StatementInfo,
}

#[derive(Debug, Clone)]
pub struct ElseIfBranch {
    pub cond: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    Expr(NodeId),
    LocalVar(VarDecl),
    Return(Option<NodeId>),
    Jump {
        label: String,
        target: Option<NodeId>,
        constant: bool,
    },
    Label {
        name: String,
        jumps: Vec<NodeId>,
    },
    StateChange {
        target: String,
        state: Option<NodeId>,
    },
    Control {
        cond: NodeId,
        then_scope: NodeId,
        else_ifs: Vec<ElseIfBranch>,
        else_scope: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        cond: NodeId,
    },
    For {
        init: Vec<NodeId>,
        cond: Option<NodeId>,
        step: Vec<NodeId>,
        body: NodeId,
    },
    Block(NodeId),
    Empty,
}

// =========================================================================
// Expressions
// =========================================================================

/// What a variable reference is bound to.
#[derive(Debug, Clone)]
pub enum Binding {
    Global(NodeId),
    /// The local declaration statement.
    Local(NodeId),
    Param(NodeId),
    LibraryConstant(LibraryConstant),
}

#[derive(Debug, Clone)]
pub enum CallTarget {
    User(NodeId),
    Library {
        mod_invoke: bool,
        /// Parameter types of the selected overload.
        params: Vec<LslType>,
    },
}

#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub ty: LslType,
    /// Built only from literals and library constants.
    pub constant: bool,
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Integer(String),
    Hex(String),
    Float(String),
    /// Quoted, with raw control characters replaced by escapes.
    String(String),
    Vector {
        x: NodeId,
        y: NodeId,
        z: NodeId,
    },
    Rotation {
        x: NodeId,
        y: NodeId,
        z: NodeId,
        s: NodeId,
    },
    List(Vec<NodeId>),
    Variable {
        name: String,
        binding: Binding,
    },
    Component {
        object: NodeId,
        component: Component,
    },
    Call {
        name: String,
        args: Vec<NodeId>,
        target: CallTarget,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    Prefix {
        op: PrefixOp,
        operand: NodeId,
    },
    Postfix {
        op: PostfixOp,
        operand: NodeId,
    },
    Cast {
        ty: LslType,
        operand: NodeId,
    },
    Paren(NodeId),
}

// =========================================================================
// The arena
// =========================================================================

#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node and adopt its children. The node inherits the error
    /// flag of any child.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
            has_errors: false,
        });
        self.adopt_children(id);
        id
    }

    /// Allocate an erroneous placeholder.
    pub fn alloc_error(&mut self, span: Span) -> NodeId {
        let id = self.alloc(NodeKind::Error, span);
        self.nodes[id.0 as usize].has_errors = true;
        id
    }

    /// Replace the kind of a pre-allocated node and adopt its children.
    pub fn fill(&mut self, id: NodeId, kind: NodeKind) -> bool {
        match self.node_mut(id) {
            Some(node) => node.kind = kind,
            None => return false,
        }
        self.adopt_children(id);
        true
    }

    fn adopt_children(&mut self, id: NodeId) {
        let mut any_errors = false;
        for child in self.children(id) {
            if let Some(node) = self.node_mut(child) {
                node.parent = Some(id);
                any_errors |= node.has_errors;
            }
        }
        if any_errors {
            self.mark_error(id);
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).map(|n| n.span).unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn has_errors(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.has_errors)
    }

    pub fn is_error(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Error))
    }

    /// Flag a node and all of its ancestors as erroneous.
    pub fn mark_error(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.node_mut(cur) {
                Some(node) => {
                    node.has_errors = true;
                    current = node.parent;
                }
                None => break,
            }
        }
    }

    /// Ancestors of `id`, nearest first.
    pub fn walk_ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    pub fn expr(&self, id: NodeId) -> Option<&Expression> {
        match self.kind(id)? {
            NodeKind::Expr(e) => Some(e),
            _ => None,
        }
    }

    /// Type of an expression node; `Void` for error placeholders.
    pub fn expr_type(&self, id: NodeId) -> LslType {
        self.expr(id).map(|e| e.ty).unwrap_or(LslType::Void)
    }

    pub fn stmt(&self, id: NodeId) -> Option<&Statement> {
        match self.kind(id)? {
            NodeKind::Stmt(s) => Some(s),
            _ => None,
        }
    }

    pub fn stmt_mut(&mut self, id: NodeId) -> Option<&mut Statement> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Stmt(s) => Some(s),
            _ => None,
        }
    }

    pub fn scope(&self, id: NodeId) -> Option<&CodeScope> {
        match self.kind(id)? {
            NodeKind::Scope(s) => Some(s),
            _ => None,
        }
    }

    pub fn function(&self, id: NodeId) -> Option<&FunctionNode> {
        match self.kind(id)? {
            NodeKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn function_mut(&mut self, id: NodeId) -> Option<&mut FunctionNode> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Function(f) => Some(f),
            _ => None,
        }
    }

    /// The variable declared by a global, parameter or local declaration node.
    pub fn var_decl(&self, id: NodeId) -> Option<&VarDecl> {
        match self.kind(id)? {
            NodeKind::GlobalVar(v) | NodeKind::Param(v) => Some(v),
            NodeKind::Stmt(Statement {
                kind: StatementKind::LocalVar(v),
                ..
            }) => Some(v),
            _ => None,
        }
    }

    pub fn var_decl_mut(&mut self, id: NodeId) -> Option<&mut VarDecl> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::GlobalVar(v) | NodeKind::Param(v) => Some(v),
            NodeKind::Stmt(Statement {
                kind: StatementKind::LocalVar(v),
                ..
            }) => Some(v),
            _ => None,
        }
    }

    /// True when `id` is a local declaration that was classified as dead.
    pub fn is_dead_declaration(&self, id: NodeId) -> bool {
        self.stmt(id)
            .is_some_and(|s| matches!(s.kind, StatementKind::LocalVar(_)) && s.info.dead.is_dead())
    }

    /// Every child of a node, in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(kind) = self.kind(id) else {
            return Vec::new();
        };
        match kind {
            NodeKind::Script(s) => s
                .globals
                .iter()
                .chain(&s.functions)
                .chain(s.default_state.iter())
                .chain(&s.states)
                .copied()
                .collect(),
            NodeKind::GlobalVar(v) | NodeKind::Param(v) => v.init.into_iter().collect(),
            NodeKind::Function(f) => f.params.iter().copied().chain(f.body).collect(),
            NodeKind::State(s) => s.handlers.clone(),
            NodeKind::EventHandler(e) => {
                e.params.iter().copied().chain(std::iter::once(e.body)).collect()
            }
            NodeKind::Scope(s) => s.statements.clone(),
            NodeKind::Stmt(s) => match &s.kind {
                StatementKind::Expr(e) => vec![*e],
                StatementKind::LocalVar(v) => v.init.into_iter().collect(),
                StatementKind::Return(e) => e.iter().copied().collect(),
                StatementKind::Jump { .. }
                | StatementKind::Label { .. }
                | StatementKind::StateChange { .. }
                | StatementKind::Empty => Vec::new(),
                StatementKind::Control {
                    cond,
                    then_scope,
                    else_ifs,
                    else_scope,
                } => {
                    let mut out = vec![*cond, *then_scope];
                    for branch in else_ifs {
                        out.push(branch.cond);
                        out.push(branch.body);
                    }
                    out.extend(else_scope);
                    out
                }
                StatementKind::While { cond, body } => vec![*cond, *body],
                StatementKind::DoWhile { body, cond } => vec![*body, *cond],
                StatementKind::For {
                    init,
                    cond,
                    step,
                    body,
                } => init
                    .iter()
                    .chain(cond.iter())
                    .chain(step)
                    .chain(std::iter::once(body))
                    .copied()
                    .collect(),
                StatementKind::Block(scope) => vec![*scope],
            },
            NodeKind::Expr(e) => match &e.kind {
                ExpressionKind::Integer(_)
                | ExpressionKind::Hex(_)
                | ExpressionKind::Float(_)
                | ExpressionKind::String(_)
                | ExpressionKind::Variable { .. } => Vec::new(),
                ExpressionKind::Vector { x, y, z } => vec![*x, *y, *z],
                ExpressionKind::Rotation { x, y, z, s } => vec![*x, *y, *z, *s],
                ExpressionKind::List(items) => items.clone(),
                ExpressionKind::Component { object, .. } => vec![*object],
                ExpressionKind::Call { args, .. } => args.clone(),
                ExpressionKind::Binary { left, right, .. } => vec![*left, *right],
                ExpressionKind::Prefix { operand, .. }
                | ExpressionKind::Postfix { operand, .. }
                | ExpressionKind::Cast { operand, .. }
                | ExpressionKind::Paren(operand) => vec![*operand],
            },
            NodeKind::Error => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(tree: &mut SyntaxTree, text: &str, start: usize) -> NodeId {
        tree.alloc(
            NodeKind::Expr(Expression {
                kind: ExpressionKind::Integer(text.to_string()),
                ty: LslType::Integer,
                constant: true,
            }),
            Span::new(start, start + text.len()),
        )
    }

    #[test]
    fn alloc_adopts_children() {
        let mut tree = SyntaxTree::new();
        let l = int(&mut tree, "1", 0);
        let r = int(&mut tree, "2", 4);
        let sum = tree.alloc(
            NodeKind::Expr(Expression {
                kind: ExpressionKind::Binary {
                    op: BinaryOp::Add,
                    left: l,
                    right: r,
                },
                ty: LslType::Integer,
                constant: true,
            }),
            Span::new(0, 5),
        );
        assert_eq!(tree.parent(l), Some(sum));
        assert_eq!(tree.parent(r), Some(sum));
        assert_eq!(tree.children(sum), vec![l, r]);
        assert!(!tree.has_errors(sum));
    }

    #[test]
    fn error_flag_propagates_to_parent() {
        let mut tree = SyntaxTree::new();
        let bad = tree.alloc_error(Span::new(0, 1));
        let stmt = tree.alloc(
            NodeKind::Stmt(Statement {
                kind: StatementKind::Expr(bad),
                info: StatementInfo::default(),
            }),
            Span::new(0, 2),
        );
        assert!(tree.is_error(bad));
        assert!(tree.has_errors(stmt));
        assert_eq!(tree.expr_type(bad), LslType::Void);
    }

    #[test]
    fn mark_error_walks_ancestors() {
        let mut tree = SyntaxTree::new();
        let e = int(&mut tree, "1", 0);
        let stmt = tree.alloc(
            NodeKind::Stmt(Statement {
                kind: StatementKind::Expr(e),
                info: StatementInfo::default(),
            }),
            Span::new(0, 2),
        );
        let block = tree.alloc(
            NodeKind::Stmt(Statement {
                kind: StatementKind::Return(None),
                info: StatementInfo::default(),
            }),
            Span::new(3, 10),
        );
        tree.mark_error(e);
        assert!(tree.has_errors(stmt));
        assert!(!tree.has_errors(block));
        assert_eq!(tree.walk_ancestors(e).collect::<Vec<_>>(), vec![stmt]);
    }

    #[test]
    fn fill_completes_preallocated_node() {
        let mut tree = SyntaxTree::new();
        let f = tree.alloc(
            NodeKind::Function(FunctionNode {
                name: "f".into(),
                return_type: LslType::Void,
                params: vec![],
                body: None,
                references: vec![],
            }),
            Span::new(0, 10),
        );
        let body = tree.alloc(
            NodeKind::Scope(CodeScope {
                scope_id: 1,
                kind: ScopeKind::FunctionBody,
                single_statement: false,
                statements: vec![],
                dead_segments: vec![],
                constant_jumps: vec![],
                has_return_path: false,
                return_path: None,
            }),
            Span::new(4, 10),
        );
        let mut func = tree.function(f).cloned().unwrap();
        func.body = Some(body);
        assert!(tree.fill(f, NodeKind::Function(func)));
        assert_eq!(tree.parent(body), Some(f));
        assert!(!tree.fill(NodeId(99), NodeKind::Error));
    }

    #[test]
    fn typed_lookups_reject_wrong_shapes() {
        let mut tree = SyntaxTree::new();
        let e = int(&mut tree, "7", 0);
        assert!(tree.stmt(e).is_none());
        assert!(tree.scope(e).is_none());
        assert!(tree.var_decl(e).is_none());
        assert!(tree.expr(NodeId(42)).is_none());
    }
}
